use srcgen_core::members::{Field, Initializer, Method, StaticInitializer};
use srcgen_core::model::DeclarationKind;
use srcgen_core::type_def::TypeDefinition;
use srcgen_core::types::TypeKey;
use srcgen_core::unit::PackageDeclaration;
use srcgen_core::{CodeModel, ModelError, Modifiers, Owner, Primitive, TypeRegistry};

#[test]
fn test_registered_member_points_back_to_owner() {
    let registry = TypeRegistry::new();
    let mut model = CodeModel::new();
    let class = model.type_definition(TypeDefinition::class("Account"));
    let balance = model.field(Field::new("balance", registry.primitive(Primitive::Long)));

    assert_eq!(model.owner(balance), None);
    model.register_at_owner(balance, Owner::Type(class)).unwrap();
    model.register_at_owner(balance, Owner::Type(class)).unwrap();
    model.add(class, balance).unwrap();

    assert_eq!(model.owner(balance), Some(Owner::Type(class)));
    let fields: Vec<_> = model.fields(class).map(|(id, _)| id).collect();
    assert_eq!(fields, vec![balance]);
}

#[test]
fn test_reparenting_fails_explicitly() {
    let registry = TypeRegistry::new();
    let mut model = CodeModel::new();
    let first = model.type_definition(TypeDefinition::class("First"));
    let second = model.type_definition(TypeDefinition::class("Second"));
    let run = model.method(Method::new("run", registry.primitive(Primitive::Void)));
    model.add(first, run).unwrap();

    let err = model.add(second, run).unwrap_err();
    match err {
        ModelError::OwnershipConflict {
            declaration,
            current,
            requested,
        } => {
            assert_eq!(declaration, "method `run`");
            assert_eq!(current, "class `First`");
            assert_eq!(requested, "class `Second`");
        }
        other => panic!("expected an ownership conflict, got {other:?}"),
    }
    assert!(model.methods(second).next().is_none());
}

#[test]
fn test_copied_type_definition_declares_an_empty_type() {
    let registry = TypeRegistry::new();
    let mut model = CodeModel::new();
    let unit = model.compilation_unit();
    let original = model.type_definition(TypeDefinition::class("A"));
    model.add_to_unit(unit, original).unwrap();
    let x = model
        .add_field(original, Field::new("x", registry.primitive(Primitive::Int)))
        .unwrap();
    let original_descriptor = model.defined_type(original).unwrap();

    let copy = model
        .declaration(original)
        .unwrap()
        .as_type()
        .unwrap()
        .clone();
    let copied = model.type_definition(copy);
    model.add_to_unit(unit, copied).unwrap();

    assert!(model.declaration(copied).unwrap().as_type().unwrap().members().is_empty());
    assert!(model.fields(copied).next().is_none());
    assert_eq!(model.owner(x), Some(Owner::Type(original)));

    assert_eq!(
        model.defined_type(copied).unwrap().key(),
        TypeKey::Defined(copied)
    );
    assert!(!model.defined_type(copied).unwrap().same_type(&original_descriptor));
}

#[test]
fn test_nested_type_moving_to_unit_is_a_conflict() {
    let mut model = CodeModel::new();
    let unit = model.compilation_unit();
    let outer = model.type_definition(TypeDefinition::class("Outer"));
    let inner = model.add_nested(outer, TypeDefinition::class("Inner")).unwrap();
    assert!(matches!(
        model.add_to_unit(unit, inner),
        Err(ModelError::OwnershipConflict { .. })
    ));
}

#[test]
fn test_cycle_through_three_levels() {
    let mut model = CodeModel::new();
    let a = model.type_definition(TypeDefinition::class("A"));
    let b = model.add_nested(a, TypeDefinition::class("B")).unwrap();
    let c = model.add_nested(b, TypeDefinition::class("C")).unwrap();

    assert!(matches!(
        model.add(c, a),
        Err(ModelError::CyclicOwnership { .. })
    ));
    assert_eq!(model.owner(a), None);
    assert!(model.nested_classes(c).next().is_none());
}

#[test]
fn test_initializers_only_in_classes() {
    let mut model = CodeModel::new();
    let class = model.type_definition(TypeDefinition::class("Cache"));
    let iface = model.type_definition(TypeDefinition::interface("Store"));
    let init = model.initializer(Initializer::new().body_line("warm();"));
    let static_init = model.static_initializer(StaticInitializer::new());

    assert!(matches!(
        model.add(iface, init),
        Err(ModelError::IllegalOwner { .. })
    ));
    model.add_all(class, &[init, static_init]).unwrap();
    let statics: Vec<bool> = model.initializers(class).map(|(_, _, s)| s).collect();
    assert_eq!(statics, vec![false, true]);
    assert_eq!(
        model.declaration(static_init).unwrap().kind().modifiers(),
        Modifiers::STATIC
    );
}

#[test]
fn test_member_cannot_be_added_to_non_type() {
    let registry = TypeRegistry::new();
    let mut model = CodeModel::new();
    let field = model.field(Field::new("a", registry.primitive(Primitive::Int)));
    let other = model.field(Field::new("b", registry.primitive(Primitive::Int)));
    assert!(model.add(field, other).is_err());
    assert_eq!(model.owner(other), None);
}

#[test]
fn test_package_slot_only_accepts_packages() {
    let mut model = CodeModel::new();
    let unit = model.compilation_unit();
    let class = model.type_definition(TypeDefinition::class("NotAPackage"));
    assert!(matches!(
        model.set_package_definition(unit, class),
        Err(ModelError::IllegalOwner { .. })
    ));

    let package = model.declare(PackageDeclaration::new("org.sample"));
    model.set_package_definition(unit, package).unwrap();
    model.set_package_definition(unit, package).unwrap();
    assert_eq!(model.package_name(unit), Some("org.sample"));
    assert_eq!(model.all_members(unit).unwrap(), vec![package]);
}

#[test]
fn test_packages_cannot_be_shared_between_units() {
    let mut model = CodeModel::new();
    let first = model.compilation_unit();
    let second = model.compilation_unit();
    let package = model.set_package(first, "shared").unwrap();
    assert!(matches!(
        model.set_package_definition(second, package),
        Err(ModelError::OwnershipConflict { .. })
    ));
    assert_eq!(model.package_name(second), None);
}

#[test]
fn test_every_unit_member_is_owned_by_the_unit() {
    let registry = TypeRegistry::new();
    let mut model = CodeModel::new();
    let unit = model.compilation_unit();
    model.set_package(unit, "com.example").unwrap();
    model
        .import_types(
            unit,
            &registry,
            [&srcgen_core::ExternalType::class("java.util.ArrayList")],
        )
        .unwrap();
    let class = model.type_definition(TypeDefinition::class("Main"));
    model.add_to_unit(unit, class).unwrap();

    for id in model.all_members(unit).unwrap() {
        assert_eq!(model.owner(id), Some(Owner::Unit(unit)));
        assert_eq!(model.enclosing_unit(id), Some(unit));
    }
    assert!(matches!(
        model.declaration(class).unwrap().kind(),
        DeclarationKind::Type(_)
    ));
}
