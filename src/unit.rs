//! Compilation units and their unit-level declarations: the package
//! statement, imports and static imports.

use crate::assembler::Assembler;
use crate::error::ModelError;
use crate::model::{CodeModel, DeclId, DeclarationKind, Owner, UnitId};
use crate::types::{ExternalMember, ExternalType, TypeDescriptor, TypeRegistry};
use log::debug;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDeclaration {
    name: String,
}

impl PackageDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        PackageDeclaration { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// `import a.b.C;`
#[derive(Debug, Clone)]
pub struct ImportDeclaration {
    target: Arc<TypeDescriptor>,
}

impl ImportDeclaration {
    /// # Errors
    /// Returns `InvalidClass` for primitive types, which cannot be imported.
    pub fn new(target: Arc<TypeDescriptor>) -> Result<Self, ModelError> {
        if target.is_primitive() {
            return Err(ModelError::InvalidClass {
                type_name: target.to_string(),
                expected: "an importable type".to_string(),
            });
        }
        Ok(ImportDeclaration { target })
    }

    #[must_use]
    pub fn target(&self) -> &Arc<TypeDescriptor> {
        &self.target
    }
}

/// `import static a.b.C.member;`
#[derive(Debug, Clone)]
pub struct StaticImportDeclaration {
    target: Arc<TypeDescriptor>,
    member: String,
}

impl StaticImportDeclaration {
    /// # Errors
    /// Returns `InvalidClass` for primitive types.
    pub fn new(target: Arc<TypeDescriptor>, member: impl Into<String>) -> Result<Self, ModelError> {
        if target.is_primitive() {
            return Err(ModelError::InvalidClass {
                type_name: target.to_string(),
                expected: "a type with static members".to_string(),
            });
        }
        Ok(StaticImportDeclaration {
            target,
            member: member.into(),
        })
    }

    #[must_use]
    pub fn target(&self) -> &Arc<TypeDescriptor> {
        &self.target
    }

    #[must_use]
    pub fn member(&self) -> &str {
        &self.member
    }
}

/// The declarations held by one source file. Each collection keeps
/// insertion order and holds a declaration at most once.
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    package: Option<DeclId>,
    imports: Vec<DeclId>,
    static_imports: Vec<DeclId>,
    types: Vec<DeclId>,
}

impl CompilationUnit {
    #[must_use]
    pub fn package(&self) -> Option<DeclId> {
        self.package
    }

    #[must_use]
    pub fn imports(&self) -> &[DeclId] {
        &self.imports
    }

    #[must_use]
    pub fn static_imports(&self) -> &[DeclId] {
        &self.static_imports
    }

    #[must_use]
    pub fn types(&self) -> &[DeclId] {
        &self.types
    }

    /// Puts `id` in the package slot, returning the declaration it replaced.
    pub(crate) fn replace_package(&mut self, id: DeclId) -> Option<DeclId> {
        self.package.replace(id).filter(|previous| *previous != id)
    }

    pub(crate) fn push_import(&mut self, id: DeclId) {
        push_unique(&mut self.imports, id);
    }

    pub(crate) fn push_static_import(&mut self, id: DeclId) {
        push_unique(&mut self.static_imports, id);
    }

    pub(crate) fn push_type(&mut self, id: DeclId) {
        push_unique(&mut self.types, id);
    }
}

fn push_unique(ids: &mut Vec<DeclId>, id: DeclId) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

impl CodeModel {
    /// Installs `package` as the package declaration of `unit`. A previous
    /// package declaration is detached.
    ///
    /// # Errors
    /// See [`CodeModel::register_at_owner`].
    pub fn set_package_definition(&mut self, unit: UnitId, package: DeclId) -> Result<(), ModelError> {
        if !matches!(self.declaration(package)?.kind(), DeclarationKind::Package(_)) {
            return Err(ModelError::IllegalOwner {
                declaration: self.describe(package),
                owner: "the package slot".to_string(),
            });
        }
        self.register_at_owner(package, Owner::Unit(unit))
    }

    /// Creates a package declaration named `name` and installs it.
    ///
    /// # Errors
    /// Returns `UnknownDeclaration` if `unit` does not belong to this model.
    pub fn set_package(&mut self, unit: UnitId, name: impl Into<String>) -> Result<DeclId, ModelError> {
        self.unit(unit)?;
        let package = self.declare(PackageDeclaration::new(name));
        self.set_package_definition(unit, package)?;
        Ok(package)
    }

    #[must_use]
    pub fn package_name(&self, unit: UnitId) -> Option<&str> {
        let package = self.unit(unit).ok()?.package?;
        match self.get(package)?.kind() {
            DeclarationKind::Package(p) => Some(p.name()),
            _ => None,
        }
    }

    /// Registers an import, static import or top-level type at `unit`.
    ///
    /// # Errors
    /// See [`CodeModel::register_at_owner`].
    pub fn add_to_unit(&mut self, unit: UnitId, declaration: DeclId) -> Result<(), ModelError> {
        self.register_at_owner(declaration, Owner::Unit(unit))
    }

    /// Creates an import declaration for `target` and adds it to `unit`.
    /// A type that is already imported is not imported twice; the existing
    /// declaration is returned instead.
    ///
    /// # Errors
    /// Returns `InvalidClass` for primitive targets.
    pub fn import(&mut self, unit: UnitId, target: Arc<TypeDescriptor>) -> Result<DeclId, ModelError> {
        if let Some(existing) = self.find_import(unit, &target)? {
            return Ok(existing);
        }
        let import = self.declare(ImportDeclaration::new(target)?);
        self.add_to_unit(unit, import)?;
        Ok(import)
    }

    /// Wraps each external reference through `registry` and imports it.
    /// Every reference is checked first; if any fails, the unit is left
    /// unchanged.
    ///
    /// # Errors
    /// Returns `InvalidClass` if a reference is a primitive or cannot be
    /// wrapped.
    pub fn import_types<'a, I>(
        &mut self,
        unit: UnitId,
        registry: &TypeRegistry,
        references: I,
    ) -> Result<Vec<DeclId>, ModelError>
    where
        I: IntoIterator<Item = &'a ExternalType>,
    {
        self.unit(unit)?;
        let targets = references
            .into_iter()
            .map(|reference| {
                let descriptor = registry.wrap(reference)?;
                ImportDeclaration::new(Arc::clone(&descriptor))?;
                Ok(descriptor)
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        targets
            .into_iter()
            .map(|target| self.import(unit, target))
            .collect()
    }

    /// Adds one `import static` per member. Every member must be static; if
    /// any is not, nothing is added.
    ///
    /// # Errors
    /// Returns `IllegalImport` naming the first non-static member.
    pub fn import_static<'a, I>(
        &mut self,
        unit: UnitId,
        registry: &TypeRegistry,
        members: I,
    ) -> Result<Vec<DeclId>, ModelError>
    where
        I: IntoIterator<Item = &'a ExternalMember>,
    {
        self.unit(unit)?;
        let members: Vec<&ExternalMember> = members.into_iter().collect();
        if let Some(member) = members.iter().find(|m| !m.is_static()) {
            return Err(ModelError::IllegalImport {
                member: member.qualified_name(),
            });
        }

        let mut resolved = Vec::with_capacity(members.len());
        for member in &members {
            let target = registry.wrap(&member.declaring_type)?;
            resolved.push(StaticImportDeclaration::new(target, member.name.clone())?);
        }

        let mut imported = Vec::with_capacity(resolved.len());
        for declaration in resolved {
            if let Some(existing) =
                self.find_static_import(unit, declaration.target(), declaration.member())?
            {
                imported.push(existing);
                continue;
            }
            debug!(
                "adding static import {}.{}",
                declaration.target(),
                declaration.member()
            );
            let id = self.declare(declaration);
            self.add_to_unit(unit, id)?;
            imported.push(id);
        }
        Ok(imported)
    }

    /// Package, static imports, imports and top-level types, in that order.
    ///
    /// # Errors
    /// Returns `UnknownDeclaration` if `unit` does not belong to this model.
    pub fn all_members(&self, unit: UnitId) -> Result<Vec<DeclId>, ModelError> {
        let unit = self.unit(unit)?;
        Ok(unit
            .package
            .iter()
            .chain(&unit.static_imports)
            .chain(&unit.imports)
            .chain(&unit.types)
            .copied()
            .collect())
    }

    /// The top-level types of `unit` in insertion order.
    ///
    /// # Errors
    /// Returns `UnknownDeclaration` if `unit` does not belong to this model.
    pub fn body_members(&self, unit: UnitId) -> Result<Vec<DeclId>, ModelError> {
        Ok(self.unit(unit)?.types.clone())
    }

    /// Renders `unit` to source text.
    ///
    /// # Errors
    /// Propagates errors from [`Assembler::generate`].
    pub fn generate_source_code(
        &self,
        unit: UnitId,
        assembler: &Assembler,
    ) -> Result<String, ModelError> {
        assembler.generate(self, unit)
    }

    fn find_import(
        &self,
        unit: UnitId,
        target: &TypeDescriptor,
    ) -> Result<Option<DeclId>, ModelError> {
        Ok(self.unit(unit)?.imports.iter().copied().find(|&id| {
            matches!(
                self.get(id).map(|d| d.kind()),
                Some(DeclarationKind::Import(i)) if i.target().same_type(target)
            )
        }))
    }

    fn find_static_import(
        &self,
        unit: UnitId,
        target: &TypeDescriptor,
        member: &str,
    ) -> Result<Option<DeclId>, ModelError> {
        Ok(self.unit(unit)?.static_imports.iter().copied().find(|&id| {
            matches!(
                self.get(id).map(|d| d.kind()),
                Some(DeclarationKind::StaticImport(i))
                    if i.target().same_type(target) && i.member() == member
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::Modifiers;
    use crate::type_def::TypeDefinition;
    use crate::types::Primitive;

    #[test]
    fn test_second_package_replaces_first() {
        let mut model = CodeModel::new();
        let unit = model.compilation_unit();
        let first = model.set_package(unit, "com.old").unwrap();
        let second = model.set_package(unit, "com.new").unwrap();

        assert_eq!(model.unit(unit).unwrap().package(), Some(second));
        assert_eq!(model.package_name(unit), Some("com.new"));
        assert_eq!(model.owner(first), None);
        assert_eq!(model.owner(second), Some(Owner::Unit(unit)));
    }

    #[test]
    fn test_import_types_deduplicates() {
        let registry = TypeRegistry::new();
        let mut model = CodeModel::new();
        let unit = model.compilation_unit();
        let list = ExternalType::interface("java.util.List");
        let map = ExternalType::interface("java.util.Map");

        let ids = model
            .import_types(unit, &registry, [&list, &map, &list])
            .unwrap();
        assert_eq!(ids[0], ids[2]);
        assert_eq!(model.unit(unit).unwrap().imports().len(), 2);
    }

    #[test]
    fn test_import_types_batch_is_atomic() {
        let registry = TypeRegistry::new();
        let mut model = CodeModel::new();
        let unit = model.compilation_unit();
        let list = ExternalType::interface("java.util.List");
        let int = ExternalType::primitive(Primitive::Int);

        let err = model
            .import_types(unit, &registry, [&list, &int])
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidClass { .. }));
        assert!(model.unit(unit).unwrap().imports().is_empty());
        assert!(model.all_members(unit).unwrap().is_empty());

        let ids = model.import_types(unit, &registry, [&list]).unwrap();
        assert_eq!(model.unit(unit).unwrap().imports(), ids.as_slice());
    }

    #[test]
    fn test_static_import_batch_is_atomic() {
        let registry = TypeRegistry::new();
        let mut model = CodeModel::new();
        let unit = model.compilation_unit();
        let math = ExternalType::class("java.lang.Math");
        let max = ExternalMember::method(math.clone(), "max", Modifiers::PUBLIC | Modifiers::STATIC);
        let to_string = ExternalMember::method(math, "toString", Modifiers::PUBLIC);

        let err = model
            .import_static(unit, &registry, [&max, &to_string])
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::IllegalImport {
                member: "java.lang.Math.toString".to_string()
            }
        );
        assert!(model.unit(unit).unwrap().static_imports().is_empty());
        assert!(registry.is_empty());

        model.import_static(unit, &registry, [&max]).unwrap();
        assert_eq!(model.unit(unit).unwrap().static_imports().len(), 1);
    }

    #[test]
    fn test_all_members_section_order() {
        let registry = TypeRegistry::new();
        let mut model = CodeModel::new();
        let unit = model.compilation_unit();
        let class = model.type_definition(TypeDefinition::class("Foo"));
        model.add_to_unit(unit, class).unwrap();
        let imports = model
            .import_types(unit, &registry, [&ExternalType::class("a.A")])
            .unwrap();
        let statics = model
            .import_static(
                unit,
                &registry,
                [&ExternalMember::field(ExternalType::class("c.C"), "d", Modifiers::STATIC)],
            )
            .unwrap();
        let package = model.set_package(unit, "com.example").unwrap();

        assert_eq!(
            model.all_members(unit).unwrap(),
            vec![package, statics[0], imports[0], class]
        );
        assert_eq!(model.body_members(unit).unwrap(), vec![class]);
    }

    #[test]
    fn test_top_level_type_rejects_private() {
        let mut model = CodeModel::new();
        let unit = model.compilation_unit();
        let class = model.type_definition(
            TypeDefinition::class("Hidden")
                .with_modifiers(Modifiers::PRIVATE)
                .unwrap(),
        );
        let err = model.add_to_unit(unit, class).unwrap_err();
        assert!(matches!(err, ModelError::InvalidModifier { .. }));
        assert!(model.unit(unit).unwrap().types().is_empty());
    }

    #[test]
    fn test_types_cannot_move_between_units() {
        let mut model = CodeModel::new();
        let first = model.compilation_unit();
        let second = model.compilation_unit();
        let class = model.type_definition(TypeDefinition::class("Shared"));
        model.add_to_unit(first, class).unwrap();
        assert!(matches!(
            model.add_to_unit(second, class),
            Err(ModelError::OwnershipConflict { .. })
        ));
    }
}
