//! Class and interface declarations, and the `CodeModel` operations that
//! build and query them.

use crate::error::ModelError;
use crate::members::{Constructor, Field, Initializer, Method};
use crate::model::{CodeModel, DeclId, DeclarationKind, Owner, Registration};
use crate::modifiers::{ConstructKind, Modifiers};
use crate::types::{DefinedType, TypeDescriptor};
use std::fmt::Display;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
}

impl TypeKind {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
        }
    }
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Where a type definition sits, which decides its legal modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    TopLevel,
    InClass,
    InInterface,
}

#[derive(Debug, Clone)]
pub struct TypeDefinition {
    kind: TypeKind,
    name: String,
    modifiers: Modifiers,
    superclass: Option<Arc<TypeDescriptor>>,
    super_interfaces: Vec<Arc<TypeDescriptor>>,
    members: Vec<DeclId>,
    descriptor: OnceLock<Arc<TypeDescriptor>>,
}

impl TypeDefinition {
    fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        TypeDefinition {
            kind,
            name: name.into(),
            modifiers: Modifiers::DEFAULT,
            superclass: None,
            super_interfaces: Vec::new(),
            members: Vec::new(),
            descriptor: OnceLock::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Class, name)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Interface, name)
    }

    /// Sets the modifiers, checked against the nested form of this kind; the
    /// stricter top-level rules are applied when the type is added to a unit.
    ///
    /// # Errors
    /// Returns `InvalidModifier` if `modifiers` is not legal on a type.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Result<Self, ModelError> {
        self.construct_kind(Placement::InClass).check(modifiers)?;
        self.modifiers = modifiers;
        Ok(self)
    }

    /// Builder form of [`CodeModel::extend_class`].
    ///
    /// # Errors
    /// Returns `InvalidClass` when called on an interface or with a
    /// superclass that is not a plain class.
    pub fn extends(mut self, superclass: Arc<TypeDescriptor>) -> Result<Self, ModelError> {
        self.set_superclass(superclass)?;
        Ok(self)
    }

    /// Builder form of [`CodeModel::add_super_interface`].
    #[must_use]
    pub fn implements(mut self, interface: Arc<TypeDescriptor>) -> Self {
        self.push_super_interface(interface);
        self
    }

    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[must_use]
    pub fn superclass(&self) -> Option<&Arc<TypeDescriptor>> {
        self.superclass.as_ref()
    }

    #[must_use]
    pub fn super_interfaces(&self) -> &[Arc<TypeDescriptor>] {
        &self.super_interfaces
    }

    /// Member identities in insertion order.
    #[must_use]
    pub fn members(&self) -> &[DeclId] {
        &self.members
    }

    pub(crate) fn construct_kind(&self, placement: Placement) -> ConstructKind {
        match (self.kind, placement) {
            (TypeKind::Class, Placement::TopLevel) => ConstructKind::Class,
            (TypeKind::Interface, Placement::TopLevel) => ConstructKind::Interface,
            (TypeKind::Class, Placement::InClass) => ConstructKind::NestedClass,
            (TypeKind::Interface, Placement::InClass) => ConstructKind::NestedInterface,
            (TypeKind::Class, Placement::InInterface) => ConstructKind::InterfaceMemberClass,
            (TypeKind::Interface, Placement::InInterface) => {
                ConstructKind::InterfaceMemberInterface
            }
        }
    }

    pub(crate) fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Drops the members and descriptor of a definition copied out of a
    /// model, so that declaring it again yields a new, empty type.
    pub(crate) fn clear_identity(&mut self) {
        self.members.clear();
        self.descriptor = OnceLock::new();
    }

    fn set_superclass(&mut self, superclass: Arc<TypeDescriptor>) -> Result<(), ModelError> {
        if self.kind != TypeKind::Class {
            return Err(ModelError::InvalidClass {
                type_name: self.name.clone(),
                expected: "a class that can extend another class".to_string(),
            });
        }
        if !superclass.is_class() {
            return Err(ModelError::InvalidClass {
                type_name: superclass.to_string(),
                expected: "a superclass".to_string(),
            });
        }
        self.superclass = Some(superclass);
        Ok(())
    }

    fn push_super_interface(&mut self, interface: Arc<TypeDescriptor>) -> bool {
        if self.super_interfaces.iter().any(|i| i.same_type(&interface)) {
            return false;
        }
        self.super_interfaces.push(interface);
        true
    }

    pub(crate) fn push_member(&mut self, id: DeclId) {
        if !self.members.contains(&id) {
            self.members.push(id);
        }
    }
}

impl CodeModel {
    /// Appends `interface` to the super-interfaces of `ty` unless an equal
    /// type is already listed. Returns whether it was added.
    ///
    /// # Errors
    /// Returns an error if `ty` is not a type definition of this model.
    pub fn add_super_interface(
        &mut self,
        ty: DeclId,
        interface: Arc<TypeDescriptor>,
    ) -> Result<bool, ModelError> {
        Ok(self.type_def_mut(ty)?.push_super_interface(interface))
    }

    /// Sets the superclass of the class `ty`, replacing any previous one.
    ///
    /// # Errors
    /// Returns `InvalidClass` if `ty` is an interface or `superclass` is not a
    /// plain class.
    pub fn extend_class(
        &mut self,
        ty: DeclId,
        superclass: Arc<TypeDescriptor>,
    ) -> Result<(), ModelError> {
        self.type_def_mut(ty)?.set_superclass(superclass)
    }

    /// Registers `member` at the type `ty`.
    ///
    /// # Errors
    /// See [`CodeModel::register_at_owner`].
    pub fn add(&mut self, ty: DeclId, member: DeclId) -> Result<(), ModelError> {
        self.type_def(ty)?;
        self.register_at_owner(member, Owner::Type(ty))
    }

    /// Registers every member at `ty`, or none of them if any check fails.
    ///
    /// # Errors
    /// The first error any member would raise in [`CodeModel::register_at_owner`].
    pub fn add_all(&mut self, ty: DeclId, members: &[DeclId]) -> Result<(), ModelError> {
        self.type_def(ty)?;
        let owner = Owner::Type(ty);
        let mut pending = Vec::with_capacity(members.len());
        for &member in members {
            if self.check_registration(member, owner)? == Registration::Pending
                && !pending.contains(&member)
            {
                pending.push(member);
            }
        }
        for member in pending {
            self.commit_registration(member, owner)?;
        }
        Ok(())
    }

    /// Creates a field and registers it at `ty` in one step.
    ///
    /// # Errors
    /// See [`CodeModel::add`]; on error the field stays detached.
    pub fn add_field(&mut self, ty: DeclId, field: Field) -> Result<DeclId, ModelError> {
        let id = self.field(field);
        self.add(ty, id)?;
        Ok(id)
    }

    /// Creates a method and registers it at `ty` in one step.
    ///
    /// # Errors
    /// See [`CodeModel::add`]; on error the method stays detached.
    pub fn add_method(&mut self, ty: DeclId, method: Method) -> Result<DeclId, ModelError> {
        let id = self.method(method);
        self.add(ty, id)?;
        Ok(id)
    }

    /// Creates a constructor and registers it at `ty` in one step.
    ///
    /// # Errors
    /// See [`CodeModel::add`]; on error the constructor stays detached.
    pub fn add_constructor(
        &mut self,
        ty: DeclId,
        constructor: Constructor,
    ) -> Result<DeclId, ModelError> {
        let id = self.constructor(constructor);
        self.add(ty, id)?;
        Ok(id)
    }

    /// Creates a nested type and registers it at `ty` in one step.
    ///
    /// # Errors
    /// See [`CodeModel::add`]; on error the nested type stays detached.
    pub fn add_nested(
        &mut self,
        ty: DeclId,
        nested: TypeDefinition,
    ) -> Result<DeclId, ModelError> {
        let id = self.type_definition(nested);
        self.add(ty, id)?;
        Ok(id)
    }

    /// Fields of `ty` in insertion order. Each call returns a new iterator.
    pub fn fields(&self, ty: DeclId) -> impl Iterator<Item = (DeclId, &Field)> + '_ {
        self.members_of(ty).filter_map(|(id, kind)| match kind {
            DeclarationKind::Field(f) => Some((id, f)),
            _ => None,
        })
    }

    pub fn methods(&self, ty: DeclId) -> impl Iterator<Item = (DeclId, &Method)> + '_ {
        self.members_of(ty).filter_map(|(id, kind)| match kind {
            DeclarationKind::Method(m) => Some((id, m)),
            _ => None,
        })
    }

    pub fn constructors(&self, ty: DeclId) -> impl Iterator<Item = (DeclId, &Constructor)> + '_ {
        self.members_of(ty).filter_map(|(id, kind)| match kind {
            DeclarationKind::Constructor(c) => Some((id, c)),
            _ => None,
        })
    }

    /// Instance and static initializers, paired with whether they are static.
    pub fn initializers(
        &self,
        ty: DeclId,
    ) -> impl Iterator<Item = (DeclId, &Initializer, bool)> + '_ {
        self.members_of(ty).filter_map(|(id, kind)| match kind {
            DeclarationKind::Initializer(i) => Some((id, i, false)),
            DeclarationKind::StaticInitializer(i) => Some((id, i, true)),
            _ => None,
        })
    }

    pub fn nested_classes(
        &self,
        ty: DeclId,
    ) -> impl Iterator<Item = (DeclId, &TypeDefinition)> + '_ {
        self.nested_of_kind(ty, TypeKind::Class)
    }

    pub fn nested_interfaces(
        &self,
        ty: DeclId,
    ) -> impl Iterator<Item = (DeclId, &TypeDefinition)> + '_ {
        self.nested_of_kind(ty, TypeKind::Interface)
    }

    /// 0 for detached or top-level declarations, otherwise one more than the
    /// owning type.
    #[must_use]
    pub fn nesting_level(&self, id: DeclId) -> usize {
        self.ancestors(id).count() - 1
    }

    /// The memoized descriptor that refers to the type definition `ty`.
    ///
    /// # Errors
    /// Returns an error if `ty` is not a type definition of this model.
    pub fn defined_type(&self, ty: DeclId) -> Result<Arc<TypeDescriptor>, ModelError> {
        let type_def = self.type_def(ty)?;
        Ok(Arc::clone(type_def.descriptor.get_or_init(|| {
            Arc::new(TypeDescriptor::Defined(DefinedType {
                decl: ty,
                name: type_def.name.clone(),
                kind: type_def.kind,
            }))
        })))
    }

    /// Fully qualified source name of a defined type, including its package
    /// and enclosing types.
    ///
    /// # Errors
    /// Returns an error if `ty` is not a type definition of this model.
    pub fn qualified_name(&self, ty: DeclId) -> Result<String, ModelError> {
        let mut segments = Vec::new();
        for ancestor in self.ancestors(ty) {
            segments.push(self.type_def(ancestor)?.name.clone());
        }
        if let Some(package) = self
            .enclosing_unit(ty)
            .and_then(|unit| self.package_name(unit))
        {
            segments.push(package.to_string());
        }
        segments.reverse();
        Ok(segments.join("."))
    }

    fn members_of(&self, ty: DeclId) -> impl Iterator<Item = (DeclId, &DeclarationKind)> + '_ {
        let members = self
            .get(ty)
            .and_then(|d| d.as_type())
            .map_or(&[][..], |t| t.members());
        members
            .iter()
            .filter_map(move |&id| self.get(id).map(|d| (id, &d.kind)))
    }

    fn nested_of_kind(
        &self,
        ty: DeclId,
        kind: TypeKind,
    ) -> impl Iterator<Item = (DeclId, &TypeDefinition)> + '_ {
        self.members_of(ty).filter_map(move |(id, decl)| match decl {
            DeclarationKind::Type(t) if t.kind == kind => Some((id, t)),
            _ => None,
        })
    }
}
