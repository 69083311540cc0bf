//! The arena that owns every declaration and compilation unit, and the
//! registration protocol that attaches declarations to their owners.
//!
//! Declarations are created detached and identified by a [`DeclId`]. Calling
//! [`CodeModel::register_at_owner`] dispatches on the owner and on the kind of
//! declaration to pick the collection it belongs in, records the owner
//! back-reference, and refuses re-parenting, cycles and illegal modifiers.

use crate::error::ModelError;
use crate::members::{Comments, Constructor, Field, Initializer, Method, StaticInitializer};
use crate::modifiers::{ConstructKind, Modifiers};
use crate::type_def::{Placement, TypeDefinition, TypeKind};
use crate::unit::{
    CompilationUnit, ImportDeclaration, PackageDeclaration, StaticImportDeclaration,
};
use log::{debug, warn};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

impl Display for DeclId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unit #{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Unit(UnitId),
    Type(DeclId),
}

impl From<UnitId> for Owner {
    fn from(unit: UnitId) -> Self {
        Owner::Unit(unit)
    }
}

#[derive(Debug, Clone)]
pub enum DeclarationKind {
    Field(Field),
    Method(Method),
    Constructor(Constructor),
    Initializer(Initializer),
    StaticInitializer(StaticInitializer),
    Type(TypeDefinition),
    Package(PackageDeclaration),
    Import(ImportDeclaration),
    StaticImport(StaticImportDeclaration),
}

impl DeclarationKind {
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        match self {
            DeclarationKind::Field(f) => f.modifiers(),
            DeclarationKind::Method(m) => m.modifiers(),
            DeclarationKind::Constructor(c) => c.modifiers(),
            DeclarationKind::StaticInitializer(_) => Modifiers::STATIC,
            DeclarationKind::Type(t) => t.modifiers(),
            DeclarationKind::Initializer(_)
            | DeclarationKind::Package(_)
            | DeclarationKind::Import(_)
            | DeclarationKind::StaticImport(_) => Modifiers::DEFAULT,
        }
    }

    /// The construct kind whose legality mask applies when this declaration is
    /// held by an owner of kind `owner` (`None` while detached). Returns `None`
    /// for combinations the owner cannot hold.
    fn construct_kind(&self, owner: Option<OwnerKind>) -> Option<ConstructKind> {
        use ConstructKind as K;
        match (self, owner) {
            (DeclarationKind::Field(_), None | Some(OwnerKind::Class)) => Some(K::Field),
            (DeclarationKind::Field(_), Some(OwnerKind::Interface)) => Some(K::InterfaceField),
            (DeclarationKind::Method(_), None | Some(OwnerKind::Class)) => Some(K::Method),
            (DeclarationKind::Method(_), Some(OwnerKind::Interface)) => Some(K::InterfaceMethod),
            (DeclarationKind::Constructor(_), None | Some(OwnerKind::Class)) => {
                Some(K::Constructor)
            }
            (DeclarationKind::Initializer(_), None | Some(OwnerKind::Class)) => {
                Some(K::Initializer)
            }
            (DeclarationKind::StaticInitializer(_), None | Some(OwnerKind::Class)) => {
                Some(K::StaticInitializer)
            }
            (DeclarationKind::Type(t), None | Some(OwnerKind::Class)) => {
                Some(t.construct_kind(Placement::InClass))
            }
            (DeclarationKind::Type(t), Some(OwnerKind::Interface)) => {
                Some(t.construct_kind(Placement::InInterface))
            }
            (DeclarationKind::Type(t), Some(OwnerKind::Unit)) => {
                Some(t.construct_kind(Placement::TopLevel))
            }
            _ => None,
        }
    }

    fn accepts_owner(&self, owner: OwnerKind) -> bool {
        match self {
            DeclarationKind::Package(_)
            | DeclarationKind::Import(_)
            | DeclarationKind::StaticImport(_) => owner == OwnerKind::Unit,
            _ => self.construct_kind(Some(owner)).is_some(),
        }
    }
}

impl From<Field> for DeclarationKind {
    fn from(field: Field) -> Self {
        DeclarationKind::Field(field)
    }
}

impl From<Method> for DeclarationKind {
    fn from(method: Method) -> Self {
        DeclarationKind::Method(method)
    }
}

impl From<Constructor> for DeclarationKind {
    fn from(constructor: Constructor) -> Self {
        DeclarationKind::Constructor(constructor)
    }
}

impl From<TypeDefinition> for DeclarationKind {
    fn from(type_def: TypeDefinition) -> Self {
        DeclarationKind::Type(type_def)
    }
}

impl From<PackageDeclaration> for DeclarationKind {
    fn from(package: PackageDeclaration) -> Self {
        DeclarationKind::Package(package)
    }
}

impl From<ImportDeclaration> for DeclarationKind {
    fn from(import: ImportDeclaration) -> Self {
        DeclarationKind::Import(import)
    }
}

impl From<StaticImportDeclaration> for DeclarationKind {
    fn from(import: StaticImportDeclaration) -> Self {
        DeclarationKind::StaticImport(import)
    }
}

/// A declaration together with its owner back-reference and comments.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub(crate) kind: DeclarationKind,
    pub(crate) owner: Option<Owner>,
    pub(crate) comments: Comments,
}

impl Declaration {
    #[must_use]
    pub fn kind(&self) -> &DeclarationKind {
        &self.kind
    }

    #[must_use]
    pub fn owner(&self) -> Option<Owner> {
        self.owner
    }

    #[must_use]
    pub fn comments(&self) -> &Comments {
        &self.comments
    }

    #[must_use]
    pub fn as_type(&self) -> Option<&TypeDefinition> {
        match &self.kind {
            DeclarationKind::Type(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OwnerKind {
    Unit,
    Class,
    Interface,
}

/// Which collection of a compilation unit receives a declaration.
#[derive(Debug, Clone, Copy)]
enum UnitSlot {
    Package,
    Import,
    StaticImport,
    Body,
}

/// Outcome of the checking half of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Registration {
    AlreadyRegistered,
    Pending,
}

/// Arena of declarations and compilation units.
#[derive(Debug, Default, Clone)]
pub struct CodeModel {
    declarations: Vec<Declaration>,
    units: Vec<CompilationUnit>,
}

impl CodeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached declaration to the arena. A type definition always
    /// starts without members, even when it was cloned from a declared one.
    pub fn declare(&mut self, kind: impl Into<DeclarationKind>) -> DeclId {
        let id = DeclId(self.declarations.len());
        let mut kind = kind.into();
        if let DeclarationKind::Type(type_def) = &mut kind {
            type_def.clear_identity();
        }
        self.declarations.push(Declaration {
            kind,
            owner: None,
            comments: Comments::default(),
        });
        id
    }

    pub fn field(&mut self, field: Field) -> DeclId {
        self.declare(field)
    }

    pub fn method(&mut self, method: Method) -> DeclId {
        self.declare(method)
    }

    pub fn constructor(&mut self, constructor: Constructor) -> DeclId {
        self.declare(constructor)
    }

    pub fn initializer(&mut self, initializer: Initializer) -> DeclId {
        self.declare(DeclarationKind::Initializer(initializer))
    }

    pub fn static_initializer(&mut self, initializer: StaticInitializer) -> DeclId {
        self.declare(DeclarationKind::StaticInitializer(initializer))
    }

    pub fn type_definition(&mut self, type_def: TypeDefinition) -> DeclId {
        self.declare(type_def)
    }

    /// Creates an empty compilation unit.
    pub fn compilation_unit(&mut self) -> UnitId {
        let id = UnitId(self.units.len());
        self.units.push(CompilationUnit::default());
        id
    }

    #[must_use]
    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.declarations.get(id.0)
    }

    /// # Errors
    /// Returns `UnknownDeclaration` if `id` does not belong to this model.
    pub fn declaration(&self, id: DeclId) -> Result<&Declaration, ModelError> {
        self.get(id)
            .ok_or_else(|| ModelError::UnknownDeclaration(id.to_string()))
    }

    pub(crate) fn declaration_mut(&mut self, id: DeclId) -> Result<&mut Declaration, ModelError> {
        self.declarations
            .get_mut(id.0)
            .ok_or_else(|| ModelError::UnknownDeclaration(id.to_string()))
    }

    /// # Errors
    /// Returns `UnknownDeclaration` if `id` does not belong to this model.
    pub fn unit(&self, id: UnitId) -> Result<&CompilationUnit, ModelError> {
        self.units
            .get(id.0)
            .ok_or_else(|| ModelError::UnknownDeclaration(id.to_string()))
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Result<&mut CompilationUnit, ModelError> {
        self.units
            .get_mut(id.0)
            .ok_or_else(|| ModelError::UnknownDeclaration(id.to_string()))
    }

    #[must_use]
    pub fn owner(&self, id: DeclId) -> Option<Owner> {
        self.get(id).and_then(|d| d.owner)
    }

    /// # Errors
    /// Returns `UnknownDeclaration` if `id` does not belong to this model.
    pub fn set_doc_comment(&mut self, id: DeclId, text: impl Into<String>) -> Result<(), ModelError> {
        self.declaration_mut(id)?.comments.doc = Some(text.into());
        Ok(())
    }

    /// # Errors
    /// Returns `UnknownDeclaration` if `id` does not belong to this model.
    pub fn set_block_comment(
        &mut self,
        id: DeclId,
        text: impl Into<String>,
    ) -> Result<(), ModelError> {
        self.declaration_mut(id)?.comments.block = Some(text.into());
        Ok(())
    }

    /// # Errors
    /// Returns `UnknownDeclaration` if `id` does not belong to this model.
    pub fn add_line_comment(
        &mut self,
        id: DeclId,
        text: impl Into<String>,
    ) -> Result<(), ModelError> {
        self.declaration_mut(id)?.comments.lines.push(text.into());
        Ok(())
    }

    /// Replaces the modifier set of a declaration after checking it against
    /// the declaration kind and its current owner. Nothing changes on error.
    ///
    /// # Errors
    /// Returns `InvalidModifier` if the set is not legal in that position.
    pub fn set_modifiers(&mut self, id: DeclId, modifiers: Modifiers) -> Result<(), ModelError> {
        let owner_kind = match self.owner(id) {
            Some(owner) => Some(self.owner_kind(owner)?),
            None => None,
        };
        let declaration = self.declaration(id)?;
        match declaration.kind.construct_kind(owner_kind) {
            Some(kind) => kind.check(modifiers)?,
            None if modifiers.is_empty() => {}
            None => {
                return Err(ModelError::InvalidModifier {
                    offending: modifiers.to_string(),
                    construct: self.describe(id),
                })
            }
        }

        match &mut self.declaration_mut(id)?.kind {
            DeclarationKind::Field(f) => f.set_modifiers(modifiers),
            DeclarationKind::Method(m) => m.set_modifiers(modifiers),
            DeclarationKind::Constructor(c) => c.set_modifiers(modifiers),
            DeclarationKind::Type(t) => t.set_modifiers(modifiers),
            _ => {}
        }
        Ok(())
    }

    /// Attaches `id` to `owner`, letting the owner decide which of its
    /// collections receives it.
    ///
    /// Registering a declaration again at the same owner is a no-op.
    ///
    /// # Errors
    /// * `OwnershipConflict` if the declaration already has another owner.
    /// * `IllegalOwner` if the owner cannot hold this kind of declaration.
    /// * `CyclicOwnership` if a type would become its own ancestor.
    /// * `InvalidModifier` if the modifiers are not legal in that position.
    pub fn register_at_owner(
        &mut self,
        id: DeclId,
        owner: impl Into<Owner>,
    ) -> Result<(), ModelError> {
        let owner = owner.into();
        if self.check_registration(id, owner)? == Registration::AlreadyRegistered {
            return Ok(());
        }
        self.commit_registration(id, owner)
    }

    /// Records the owner back-reference of `id` without touching any
    /// collection of the owner.
    pub(crate) fn set_owner(&mut self, id: DeclId, owner: Owner) -> Result<(), ModelError> {
        let current = self.declaration(id)?.owner;
        match current {
            Some(existing) if existing != owner => Err(self.ownership_conflict(id, existing, owner)),
            _ => {
                self.declaration_mut(id)?.owner = Some(owner);
                Ok(())
            }
        }
    }

    /// Runs every check of `register_at_owner` without mutating anything.
    pub(crate) fn check_registration(
        &self,
        id: DeclId,
        owner: Owner,
    ) -> Result<Registration, ModelError> {
        let declaration = self.declaration(id)?;
        let owner_kind = self.owner_kind(owner)?;

        if let Some(existing) = declaration.owner {
            if existing == owner {
                return Ok(Registration::AlreadyRegistered);
            }
            return Err(self.ownership_conflict(id, existing, owner));
        }

        if !declaration.kind.accepts_owner(owner_kind) {
            return Err(ModelError::IllegalOwner {
                declaration: self.describe(id),
                owner: self.describe_owner(owner),
            });
        }

        if let Owner::Type(parent) = owner {
            if self.ancestors(parent).any(|ancestor| ancestor == id) {
                return Err(ModelError::CyclicOwnership {
                    declaration: self.describe(id),
                    owner: self.describe_owner(owner),
                });
            }
        }

        if let Some(kind) = declaration.kind.construct_kind(Some(owner_kind)) {
            kind.check(declaration.kind.modifiers())?;
        }
        Ok(Registration::Pending)
    }

    /// Second half of a registration; assumes `check_registration` passed.
    pub(crate) fn commit_registration(&mut self, id: DeclId, owner: Owner) -> Result<(), ModelError> {
        debug!("registering {} at {}", self.describe(id), self.describe_owner(owner));
        match owner {
            Owner::Type(parent) => {
                self.set_owner(id, owner)?;
                self.type_def_mut(parent)?.push_member(id);
            }
            Owner::Unit(unit) => {
                let slot = match &self.declaration(id)?.kind {
                    DeclarationKind::Package(_) => UnitSlot::Package,
                    DeclarationKind::Import(_) => UnitSlot::Import,
                    DeclarationKind::StaticImport(_) => UnitSlot::StaticImport,
                    _ => UnitSlot::Body,
                };
                let target = self.unit_mut(unit)?;
                let replaced = match slot {
                    UnitSlot::Package => target.replace_package(id),
                    UnitSlot::Import => {
                        target.push_import(id);
                        None
                    }
                    UnitSlot::StaticImport => {
                        target.push_static_import(id);
                        None
                    }
                    UnitSlot::Body => {
                        target.push_type(id);
                        None
                    }
                };
                self.set_owner(id, owner)?;
                if let Some(previous) = replaced {
                    warn!("{} replaces {}", self.describe(id), self.describe(previous));
                    self.declaration_mut(previous)?.owner = None;
                }
            }
        }
        Ok(())
    }

    /// `id` itself followed by its owners up to the first non-type owner.
    pub(crate) fn ancestors(&self, id: DeclId) -> impl Iterator<Item = DeclId> + '_ {
        std::iter::successors(Some(id), move |current| match self.owner(*current) {
            Some(Owner::Type(parent)) => Some(parent),
            _ => None,
        })
    }

    /// The compilation unit a declaration ultimately belongs to, if any.
    #[must_use]
    pub fn enclosing_unit(&self, id: DeclId) -> Option<UnitId> {
        let outermost = self.ancestors(id).last()?;
        match self.owner(outermost) {
            Some(Owner::Unit(unit)) => Some(unit),
            _ => None,
        }
    }

    pub(crate) fn type_def(&self, id: DeclId) -> Result<&TypeDefinition, ModelError> {
        self.declaration(id)?
            .as_type()
            .ok_or_else(|| ModelError::IllegalOwner {
                declaration: self.describe(id),
                owner: "a member position that requires a type".to_string(),
            })
    }

    pub(crate) fn type_def_mut(&mut self, id: DeclId) -> Result<&mut TypeDefinition, ModelError> {
        let description = self.describe(id);
        match &mut self.declaration_mut(id)?.kind {
            DeclarationKind::Type(t) => Ok(t),
            _ => Err(ModelError::IllegalOwner {
                declaration: description,
                owner: "a member position that requires a type".to_string(),
            }),
        }
    }

    fn owner_kind(&self, owner: Owner) -> Result<OwnerKind, ModelError> {
        match owner {
            Owner::Unit(unit) => self.unit(unit).map(|_| OwnerKind::Unit),
            Owner::Type(id) => match &self.declaration(id)?.kind {
                DeclarationKind::Type(t) if t.kind() == TypeKind::Class => Ok(OwnerKind::Class),
                DeclarationKind::Type(_) => Ok(OwnerKind::Interface),
                _ => Err(ModelError::IllegalOwner {
                    declaration: "a member".to_string(),
                    owner: self.describe(id),
                }),
            },
        }
    }

    fn ownership_conflict(&self, id: DeclId, current: Owner, requested: Owner) -> ModelError {
        ModelError::OwnershipConflict {
            declaration: self.describe(id),
            current: self.describe_owner(current),
            requested: self.describe_owner(requested),
        }
    }

    /// Human readable name of a declaration, for diagnostics.
    #[must_use]
    pub fn describe(&self, id: DeclId) -> String {
        let Some(declaration) = self.get(id) else {
            return id.to_string();
        };
        match &declaration.kind {
            DeclarationKind::Field(f) => format!("field `{}`", f.name()),
            DeclarationKind::Method(m) => format!("method `{}`", m.name()),
            DeclarationKind::Constructor(_) => format!("constructor {id}"),
            DeclarationKind::Initializer(_) => format!("initializer {id}"),
            DeclarationKind::StaticInitializer(_) => format!("static initializer {id}"),
            DeclarationKind::Type(t) => format!("{} `{}`", t.kind(), t.name()),
            DeclarationKind::Package(p) => format!("package `{}`", p.name()),
            DeclarationKind::Import(i) => format!("import of `{}`", i.target()),
            DeclarationKind::StaticImport(i) => {
                format!("static import of `{}.{}`", i.target(), i.member())
            }
        }
    }

    fn describe_owner(&self, owner: Owner) -> String {
        match owner {
            Owner::Unit(unit) => unit.to_string(),
            Owner::Type(id) => self.describe(id),
        }
    }
}
