use srcgen_core::members::{Constructor, Field, Method};
use srcgen_core::type_def::TypeDefinition;
use srcgen_core::{CodeModel, ConstructKind, ModelError, Modifiers, Primitive, TypeRegistry};

const ALL_KINDS: [ConstructKind; 13] = [
    ConstructKind::Field,
    ConstructKind::Method,
    ConstructKind::Constructor,
    ConstructKind::Initializer,
    ConstructKind::StaticInitializer,
    ConstructKind::Class,
    ConstructKind::Interface,
    ConstructKind::NestedClass,
    ConstructKind::NestedInterface,
    ConstructKind::InterfaceField,
    ConstructKind::InterfaceMethod,
    ConstructKind::InterfaceMemberClass,
    ConstructKind::InterfaceMemberInterface,
];

#[test]
fn test_legality_matches_mask_for_single_visibility() {
    let visibilities = [
        Modifiers::DEFAULT,
        Modifiers::PUBLIC,
        Modifiers::PROTECTED,
        Modifiers::PRIVATE,
    ];
    let qualifiers = [
        Modifiers::STATIC,
        Modifiers::FINAL,
        Modifiers::ABSTRACT,
        Modifiers::TRANSIENT,
        Modifiers::VOLATILE,
        Modifiers::SYNCHRONIZED,
        Modifiers::NATIVE,
    ];

    for kind in ALL_KINDS {
        let mask = kind.valid_modifiers();
        for visibility in visibilities {
            for combo in 0u32..(1 << qualifiers.len()) {
                let mut m = visibility;
                for (i, q) in qualifiers.iter().enumerate() {
                    if combo & (1 << i) != 0 {
                        m = m.add_modifier(*q);
                    }
                }
                let expected = (m.bits() & !mask.bits()) == 0;
                assert_eq!(
                    kind.is_valid_modifier(m),
                    expected,
                    "{kind} with `{m}`"
                );
                assert_eq!(kind.check(m).is_ok(), expected);
            }
        }
    }
}

#[test]
fn test_two_visibilities_are_never_legal() {
    for kind in ALL_KINDS {
        assert!(!kind.is_valid_modifier(Modifiers::PUBLIC | Modifiers::PROTECTED));
    }
}

#[test]
fn test_invalid_modifier_names_bits_and_construct() {
    let err = ConstructKind::Field
        .check(Modifiers::PRIVATE | Modifiers::ABSTRACT | Modifiers::NATIVE)
        .unwrap_err();
    assert_eq!(
        err,
        ModelError::InvalidModifier {
            offending: "abstract native".to_string(),
            construct: "field".to_string(),
        }
    );
    assert_eq!(
        err.to_string(),
        "Invalid Modifier: `abstract native` is not allowed on field"
    );
}

#[test]
fn test_constructors_validate_at_construction() {
    let registry = TypeRegistry::new();
    let int = registry.primitive(Primitive::Int);
    assert!(Field::new("x", int.clone())
        .with_modifiers(Modifiers::VOLATILE | Modifiers::TRANSIENT)
        .is_ok());
    assert!(Method::new("m", int)
        .with_modifiers(Modifiers::TRANSIENT)
        .is_err());
    assert!(Constructor::new().with_modifiers(Modifiers::FINAL).is_err());
    assert!(TypeDefinition::interface("I")
        .with_modifiers(Modifiers::FINAL)
        .is_err());
}

#[test]
fn test_interface_members_use_interface_masks() {
    let registry = TypeRegistry::new();
    let int = registry.primitive(Primitive::Int);
    let mut model = CodeModel::new();
    let iface = model.type_definition(TypeDefinition::interface("Api"));

    let synchronized = model.method(
        Method::new("run", int.clone())
            .with_modifiers(Modifiers::SYNCHRONIZED)
            .unwrap(),
    );
    let err = model.add(iface, synchronized).unwrap_err();
    assert_eq!(
        err,
        ModelError::InvalidModifier {
            offending: "synchronized".to_string(),
            construct: "interface method".to_string(),
        }
    );
    assert_eq!(model.owner(synchronized), None);

    let transient = model.field(Field::new("x", int).with_modifiers(Modifiers::TRANSIENT).unwrap());
    assert!(model.add(iface, transient).is_err());
    assert!(model.fields(iface).next().is_none());
}

#[test]
fn test_set_modifiers_respects_owner_context() {
    let registry = TypeRegistry::new();
    let mut model = CodeModel::new();
    let iface = model.type_definition(TypeDefinition::interface("Api"));
    let method = model
        .add_method(iface, Method::new("run", registry.primitive(Primitive::Void)))
        .unwrap();

    assert!(model.set_modifiers(method, Modifiers::PUBLIC | Modifiers::ABSTRACT).is_ok());
    assert!(model.set_modifiers(method, Modifiers::STATIC).is_err());
    assert_eq!(
        model.declaration(method).unwrap().kind().modifiers(),
        Modifiers::PUBLIC | Modifiers::ABSTRACT
    );
}

#[test]
fn test_types_inside_interfaces_cannot_be_hidden() {
    let mut model = CodeModel::new();
    let api = model.type_definition(TypeDefinition::interface("Api"));

    let private = model.type_definition(
        TypeDefinition::class("Helper")
            .with_modifiers(Modifiers::PRIVATE | Modifiers::STATIC)
            .unwrap(),
    );
    let err = model.add(api, private).unwrap_err();
    assert_eq!(
        err,
        ModelError::InvalidModifier {
            offending: "private".to_string(),
            construct: "class in an interface".to_string(),
        }
    );
    assert_eq!(model.owner(private), None);

    let protected = model.type_definition(
        TypeDefinition::interface("Listener")
            .with_modifiers(Modifiers::PROTECTED)
            .unwrap(),
    );
    assert!(model.add(api, protected).is_err());

    let public = model
        .add_nested(
            api,
            TypeDefinition::class("Builder")
                .with_modifiers(Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL)
                .unwrap(),
        )
        .unwrap();
    assert_eq!(model.nested_classes(api).map(|(id, _)| id).collect::<Vec<_>>(), vec![public]);

    let outer = model.type_definition(TypeDefinition::class("Outer"));
    assert!(model.add(outer, private).is_ok());
}
