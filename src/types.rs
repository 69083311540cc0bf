//! Type descriptors and the registry that canonicalizes wrapped external types.
//!
//! A descriptor names a type wherever the model needs one: a field type, a
//! method return type, a superclass or an import target. Descriptors are
//! shared as `Arc<TypeDescriptor>`; for external types the [`TypeRegistry`]
//! hands out exactly one instance per qualified name and kind, so
//! `Arc::ptr_eq` can be used as identity.

use crate::error::ModelError;
use crate::model::DeclId;
use crate::modifiers::Modifiers;
use crate::type_def::TypeKind;
use crate::utils;
use log::{debug, trace};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub const ALL: [Primitive; 9] = [
        Primitive::Void,
        Primitive::Boolean,
        Primitive::Byte,
        Primitive::Char,
        Primitive::Short,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
    ];

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Primitive::Void => "void",
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Primitive::ALL.into_iter().find(|p| p.keyword() == keyword)
    }
}

impl Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// What an external type reference denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalKind {
    Primitive,
    Class,
    Interface,
    Annotation,
    Enum,
}

impl ExternalKind {
    #[must_use]
    pub fn is_interface_like(self) -> bool {
        matches!(self, ExternalKind::Interface | ExternalKind::Annotation)
    }
}

/// An opaque reference to a type that exists outside the model, such as
/// `java.util.List`. Nested types use `$` in their binary name
/// (`java.util.Map$Entry`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalType {
    pub qualified_name: String,
    pub kind: ExternalKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<Box<ExternalType>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<ExternalType>,
}

impl ExternalType {
    pub fn new(qualified_name: impl Into<String>, kind: ExternalKind) -> Self {
        ExternalType {
            qualified_name: qualified_name.into(),
            kind,
            superclass: None,
            interfaces: Vec::new(),
        }
    }

    pub fn class(qualified_name: impl Into<String>) -> Self {
        Self::new(qualified_name, ExternalKind::Class)
    }

    pub fn interface(qualified_name: impl Into<String>) -> Self {
        Self::new(qualified_name, ExternalKind::Interface)
    }

    pub fn annotation(qualified_name: impl Into<String>) -> Self {
        Self::new(qualified_name, ExternalKind::Annotation)
    }

    pub fn enumeration(qualified_name: impl Into<String>) -> Self {
        Self::new(qualified_name, ExternalKind::Enum)
    }

    #[must_use]
    pub fn primitive(primitive: Primitive) -> Self {
        Self::new(primitive.keyword(), ExternalKind::Primitive)
    }

    #[must_use]
    pub fn extends(mut self, superclass: ExternalType) -> Self {
        self.superclass = Some(Box::new(superclass));
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: ExternalType) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// The name used in source text, with nested-type separators turned into dots.
    #[must_use]
    pub fn source_name(&self) -> String {
        utils::source_name(&self.qualified_name)
    }

    #[must_use]
    pub fn simple_name(&self) -> String {
        utils::simple_name(&self.qualified_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalMemberKind {
    Field,
    Method,
}

/// An opaque reference to a field or method of an external type, used as the
/// input of static imports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalMember {
    pub declaring_type: ExternalType,
    pub name: String,
    pub kind: ExternalMemberKind,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl ExternalMember {
    pub fn field(declaring_type: ExternalType, name: impl Into<String>, modifiers: Modifiers) -> Self {
        ExternalMember {
            declaring_type,
            name: name.into(),
            kind: ExternalMemberKind::Field,
            modifiers,
        }
    }

    pub fn method(declaring_type: ExternalType, name: impl Into<String>, modifiers: Modifiers) -> Self {
        ExternalMember {
            declaring_type,
            name: name.into(),
            kind: ExternalMemberKind::Method,
            modifiers,
        }
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type.source_name(), self.name)
    }
}

/// A wrapped external type together with its lazily wrapped superclass.
#[derive(Debug)]
pub struct ExternalDescriptor {
    external: ExternalType,
    superclass: OnceLock<Option<Arc<TypeDescriptor>>>,
}

impl ExternalDescriptor {
    fn new(external: ExternalType) -> Self {
        ExternalDescriptor {
            external,
            superclass: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn external(&self) -> &ExternalType {
        &self.external
    }

    /// The memoized superclass descriptor, if it has been computed already.
    #[must_use]
    pub fn cached_superclass(&self) -> Option<&Option<Arc<TypeDescriptor>>> {
        self.superclass.get()
    }
}

/// A reference to a class or interface declared inside a `CodeModel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedType {
    pub decl: DeclId,
    pub name: String,
    pub kind: TypeKind,
}

#[derive(Debug)]
pub enum TypeDescriptor {
    Primitive(Primitive),
    ExternalClass(ExternalDescriptor),
    ExternalInterface(ExternalDescriptor),
    Defined(DefinedType),
}

/// Identity of a descriptor, independent of which `Arc` holds it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Primitive(Primitive),
    External(String, ExternalKind),
    Defined(DeclId),
}

impl TypeDescriptor {
    #[must_use]
    pub fn key(&self) -> TypeKey {
        match self {
            TypeDescriptor::Primitive(p) => TypeKey::Primitive(*p),
            TypeDescriptor::ExternalClass(d) | TypeDescriptor::ExternalInterface(d) => {
                TypeKey::External(d.external.qualified_name.clone(), d.external.kind)
            }
            TypeDescriptor::Defined(d) => TypeKey::Defined(d.decl),
        }
    }

    #[must_use]
    pub fn same_type(&self, other: &TypeDescriptor) -> bool {
        self.key() == other.key()
    }

    /// The name written wherever the type is used (field types, signatures,
    /// `extends` clauses).
    #[must_use]
    pub fn simple_name(&self) -> String {
        match self {
            TypeDescriptor::Primitive(p) => p.keyword().to_string(),
            TypeDescriptor::ExternalClass(d) | TypeDescriptor::ExternalInterface(d) => {
                d.external.simple_name()
            }
            TypeDescriptor::Defined(d) => d.name.clone(),
        }
    }

    #[must_use]
    pub fn external(&self) -> Option<&ExternalType> {
        match self {
            TypeDescriptor::ExternalClass(d) | TypeDescriptor::ExternalInterface(d) => {
                Some(&d.external)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeDescriptor::Primitive(_))
    }

    #[must_use]
    pub fn is_interface(&self) -> bool {
        match self {
            TypeDescriptor::ExternalInterface(_) => true,
            TypeDescriptor::Defined(d) => d.kind == TypeKind::Interface,
            _ => false,
        }
    }

    /// True for plain classes: not primitives, interfaces, annotations or enums.
    #[must_use]
    pub fn is_class(&self) -> bool {
        match self {
            TypeDescriptor::ExternalClass(d) => d.external.kind == ExternalKind::Class,
            TypeDescriptor::Defined(d) => d.kind == TypeKind::Class,
            _ => false,
        }
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeDescriptor::ExternalClass(d) | TypeDescriptor::ExternalInterface(d) => {
                write!(f, "{}", d.external.source_name())
            }
            _ => write!(f, "{}", self.simple_name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WrapContext {
    Any,
    Class,
    Interface,
}

impl WrapContext {
    fn admits(self, kind: ExternalKind) -> bool {
        match self {
            WrapContext::Any => true,
            WrapContext::Class => kind == ExternalKind::Class,
            WrapContext::Interface => kind.is_interface_like(),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            WrapContext::Any => "a type",
            WrapContext::Class => "a class",
            WrapContext::Interface => "an interface",
        }
    }
}

/// Anything the registry can turn into a canonical descriptor.
pub trait Wrap {
    fn wrap_in(self, registry: &TypeRegistry) -> Result<Arc<TypeDescriptor>, ModelError>;
}

impl Wrap for &ExternalType {
    fn wrap_in(self, registry: &TypeRegistry) -> Result<Arc<TypeDescriptor>, ModelError> {
        registry.wrap_external(self, WrapContext::Any)
    }
}

impl Wrap for Primitive {
    fn wrap_in(self, registry: &TypeRegistry) -> Result<Arc<TypeDescriptor>, ModelError> {
        Ok(registry.primitive(self))
    }
}

impl Wrap for Arc<TypeDescriptor> {
    fn wrap_in(self, registry: &TypeRegistry) -> Result<Arc<TypeDescriptor>, ModelError> {
        match self.key() {
            TypeKey::Defined(_) => Ok(self),
            TypeKey::Primitive(p) => Ok(registry.primitive(p)),
            TypeKey::External(name, kind) => {
                let mut externals = registry.externals.write();
                Ok(Arc::clone(externals.entry((name, kind)).or_insert(self)))
            }
        }
    }
}

impl Wrap for &Arc<TypeDescriptor> {
    fn wrap_in(self, registry: &TypeRegistry) -> Result<Arc<TypeDescriptor>, ModelError> {
        Arc::clone(self).wrap_in(registry)
    }
}

/// Canonicalization cache for wrapped types.
///
/// External types are keyed by qualified name and kind, so a lookup can only
/// return a descriptor of the kind that was asked for. Primitives live in a
/// table of their own.
///
/// The registry is an ordinary value: create one per generation run (or per
/// test) and pass it to the operations that need it. It is internally
/// synchronized and can be shared between threads.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    externals: RwLock<HashMap<(String, ExternalKind), Arc<TypeDescriptor>>>,
    primitives: RwLock<HashMap<Primitive, Arc<TypeDescriptor>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical descriptor for `target`.
    ///
    /// # Errors
    /// Returns `InvalidClass` when an external primitive reference names an
    /// unknown primitive, or a reference type is named like a primitive.
    pub fn wrap(&self, target: impl Wrap) -> Result<Arc<TypeDescriptor>, ModelError> {
        target.wrap_in(self)
    }

    /// Wraps `external` for a context that only accepts plain classes.
    ///
    /// # Errors
    /// Returns `InvalidClass` for interfaces, annotations, enums and primitives.
    pub fn wrap_class(&self, external: &ExternalType) -> Result<Arc<TypeDescriptor>, ModelError> {
        self.wrap_external(external, WrapContext::Class)
    }

    /// Wraps `external` for a context that only accepts interfaces.
    ///
    /// # Errors
    /// Returns `InvalidClass` for anything that is not an interface or annotation.
    pub fn wrap_interface(
        &self,
        external: &ExternalType,
    ) -> Result<Arc<TypeDescriptor>, ModelError> {
        self.wrap_external(external, WrapContext::Interface)
    }

    #[must_use]
    pub fn primitive(&self, primitive: Primitive) -> Arc<TypeDescriptor> {
        if let Some(found) = self.primitives.read().get(&primitive) {
            return Arc::clone(found);
        }
        let mut primitives = self.primitives.write();
        Arc::clone(
            primitives
                .entry(primitive)
                .or_insert_with(|| Arc::new(TypeDescriptor::Primitive(primitive))),
        )
    }

    /// The superclass of an external class descriptor, wrapped on first
    /// access and memoized in the descriptor itself.
    ///
    /// # Errors
    /// Returns `InvalidClass` if the recorded superclass is not a plain class.
    pub fn superclass_of(
        &self,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<TypeDescriptor>>, ModelError> {
        let TypeDescriptor::ExternalClass(class) = descriptor else {
            return Ok(None);
        };
        if let Some(cached) = class.superclass.get() {
            return Ok(cached.clone());
        }
        let computed = class
            .external
            .superclass
            .as_deref()
            .map(|superclass| self.wrap_class(superclass))
            .transpose()?;
        Ok(class.superclass.get_or_init(|| computed).clone())
    }

    /// Wraps every interface an external type declares, in declaration order.
    ///
    /// # Errors
    /// Returns `InvalidClass` if a recorded interface is not interface-like.
    pub fn interfaces_of(
        &self,
        descriptor: &TypeDescriptor,
    ) -> Result<Vec<Arc<TypeDescriptor>>, ModelError> {
        match descriptor.external() {
            Some(external) => external
                .interfaces
                .iter()
                .map(|interface| self.wrap_interface(interface))
                .collect(),
            None => Ok(Vec::new()),
        }
    }

    /// True if an external type of any kind with this name has been wrapped.
    #[must_use]
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.externals
            .read()
            .keys()
            .any(|(name, _)| name == qualified_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.externals.read().len() + self.primitives.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn wrap_external(
        &self,
        external: &ExternalType,
        context: WrapContext,
    ) -> Result<Arc<TypeDescriptor>, ModelError> {
        if !context.admits(external.kind) {
            return Err(ModelError::InvalidClass {
                type_name: external.source_name(),
                expected: context.expected().to_string(),
            });
        }

        if external.kind != ExternalKind::Primitive
            && Primitive::from_keyword(&external.qualified_name).is_some()
        {
            return Err(ModelError::InvalidClass {
                type_name: external.qualified_name.clone(),
                expected: "a reference type".to_string(),
            });
        }

        let key = (external.qualified_name.clone(), external.kind);
        if let Some(found) = self.externals.read().get(&key) {
            trace!("type cache hit for {} {:?}", key.0, key.1);
            return Ok(Arc::clone(found));
        }

        let descriptor = match external.kind {
            ExternalKind::Primitive => {
                let primitive = Primitive::from_keyword(&external.qualified_name).ok_or_else(
                    || ModelError::InvalidClass {
                        type_name: external.qualified_name.clone(),
                        expected: "a primitive type".to_string(),
                    },
                )?;
                return Ok(self.primitive(primitive));
            }
            ExternalKind::Interface | ExternalKind::Annotation => {
                TypeDescriptor::ExternalInterface(ExternalDescriptor::new(external.clone()))
            }
            ExternalKind::Class | ExternalKind::Enum => {
                TypeDescriptor::ExternalClass(ExternalDescriptor::new(external.clone()))
            }
        };

        debug!("wrapping external type {}", external.qualified_name);
        let mut externals = self.externals.write();
        Ok(Arc::clone(
            externals.entry(key).or_insert_with(|| Arc::new(descriptor)),
        ))
    }
}
