use srcgen_core::catalog::TypeCatalog;
use srcgen_core::members::Field;
use srcgen_core::type_def::TypeDefinition;
use srcgen_core::{Assembler, CodeModel, ModelError, Modifiers, TypeRegistry};

const CATALOG: &str = r#"
types:
  - qualified_name: java.util.List
    kind: interface
  - qualified_name: java.util.ArrayList
    kind: class
    superclass:
      qualified_name: java.util.AbstractList
      kind: class
members:
  - declaring_type:
      qualified_name: java.util.Collections
      kind: class
    name: emptyList
    kind: method
    modifiers: PUBLIC | STATIC
  - declaring_type:
      qualified_name: java.util.Collections
      kind: class
    name: toString
    kind: method
    modifiers: PUBLIC
"#;

#[test]
fn test_catalog_drives_imports() {
    let catalog = TypeCatalog::from_yaml(CATALOG).unwrap();
    let registry = TypeRegistry::new();
    let mut model = CodeModel::new();
    let unit = model.compilation_unit();

    model
        .import_types(unit, &registry, catalog.types.iter())
        .unwrap();
    model
        .import_static(unit, &registry, catalog.static_members())
        .unwrap();

    let err = model
        .import_static(unit, &registry, catalog.members.iter())
        .unwrap_err();
    assert!(matches!(err, ModelError::IllegalImport { .. }));
    assert_eq!(model.unit(unit).unwrap().static_imports().len(), 1);

    let holder = model.type_definition(TypeDefinition::class("Holder"));
    model.add_to_unit(unit, holder).unwrap();
    let list = registry.wrap(catalog.find_type("java.util.List").unwrap()).unwrap();
    model
        .add_field(
            holder,
            Field::new("items", list)
                .with_modifiers(Modifiers::PRIVATE)
                .unwrap()
                .initialized_with("emptyList()"),
        )
        .unwrap();

    let text = model
        .generate_source_code(unit, &Assembler::new())
        .unwrap();
    assert_eq!(
        text,
        "import java.util.List;\nimport java.util.ArrayList;\n\nimport static java.util.Collections.emptyList;\n\n\nclass Holder {\n\tprivate List items = emptyList();\n}\n"
    );
}

#[test]
fn test_catalog_yaml_round_trip() {
    let catalog = TypeCatalog::from_yaml(CATALOG).unwrap();
    let yaml = catalog.to_yaml().unwrap();
    assert_eq!(TypeCatalog::from_yaml(&yaml).unwrap(), catalog);
}

#[test]
fn test_malformed_catalog() {
    let err = TypeCatalog::from_yaml("types: [{ kind: class }]").unwrap_err();
    assert!(matches!(err, ModelError::Catalog(_)));
}
