//! Member declarations: fields, methods, constructors and initializer blocks.
//!
//! Members are plain values until they are handed to a `CodeModel`, which
//! gives them an identity and, once registered, an owner. Modifier sets are
//! validated against the member kind here; the owner-specific checks (for
//! example interface fields) happen at registration time.

use crate::error::ModelError;
use crate::modifiers::{ConstructKind, Modifiers};
use crate::types::TypeDescriptor;
use std::fmt::Display;
use std::sync::Arc;

/// Comments attached in front of a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    /// Rendered as a `/** ... */` block.
    pub doc: Option<String>,
    /// Rendered as a `/* ... */` block after the doc comment.
    pub block: Option<String>,
    /// Rendered as one `// ...` line per element.
    pub lines: Vec<String>,
}

impl Comments {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doc.is_none() && self.block.is_none() && self.lines.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: Arc<TypeDescriptor>,
    pub is_final: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Arc<TypeDescriptor>) -> Self {
        Parameter {
            name: name.into(),
            ty,
            is_final: false,
        }
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_final {
            write!(f, "final ")?;
        }
        write!(f, "{} {}", self.ty.simple_name(), self.name)
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    ty: Arc<TypeDescriptor>,
    modifiers: Modifiers,
    initializer: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Arc<TypeDescriptor>) -> Self {
        Field {
            name: name.into(),
            ty,
            modifiers: Modifiers::DEFAULT,
            initializer: None,
        }
    }

    /// # Errors
    /// Returns `InvalidModifier` if `modifiers` is not legal on a field.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Result<Self, ModelError> {
        ConstructKind::Field.check(modifiers)?;
        self.modifiers = modifiers;
        Ok(self)
    }

    /// Sets the expression written after `=`.
    #[must_use]
    pub fn initialized_with(mut self, expression: impl Into<String>) -> Self {
        self.initializer = Some(expression.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn ty(&self) -> &Arc<TypeDescriptor> {
        &self.ty
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[must_use]
    pub fn initializer(&self) -> Option<&str> {
        self.initializer.as_deref()
    }

    pub(crate) fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }
}

#[derive(Debug, Clone)]
pub struct Method {
    name: String,
    return_type: Arc<TypeDescriptor>,
    modifiers: Modifiers,
    parameters: Vec<Parameter>,
    throws: Vec<Arc<TypeDescriptor>>,
    body: Option<Vec<String>>,
}

impl Method {
    /// A method without a body. Abstract, native and interface methods are
    /// written with a trailing `;`, any other method with an empty block.
    pub fn new(name: impl Into<String>, return_type: Arc<TypeDescriptor>) -> Self {
        Method {
            name: name.into(),
            return_type,
            modifiers: Modifiers::DEFAULT,
            parameters: Vec::new(),
            throws: Vec::new(),
            body: None,
        }
    }

    /// # Errors
    /// Returns `InvalidModifier` if `modifiers` is not legal on a method.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Result<Self, ModelError> {
        ConstructKind::Method.check(modifiers)?;
        self.modifiers = modifiers;
        Ok(self)
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: Arc<TypeDescriptor>) -> Self {
        self.parameters.push(Parameter::new(name, ty));
        self
    }

    #[must_use]
    pub fn final_param(mut self, name: impl Into<String>, ty: Arc<TypeDescriptor>) -> Self {
        let mut parameter = Parameter::new(name, ty);
        parameter.is_final = true;
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn throws(mut self, exception: Arc<TypeDescriptor>) -> Self {
        self.throws.push(exception);
        self
    }

    /// Appends a statement line to the body, creating the body if needed.
    #[must_use]
    pub fn body_line(mut self, line: impl Into<String>) -> Self {
        self.body.get_or_insert_with(Vec::new).push(line.into());
        self
    }

    #[must_use]
    pub fn body<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body = Some(lines.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn return_type(&self) -> &Arc<TypeDescriptor> {
        &self.return_type
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[must_use]
    pub fn thrown(&self) -> &[Arc<TypeDescriptor>] {
        &self.throws
    }

    #[must_use]
    pub fn body_lines(&self) -> Option<&[String]> {
        self.body.as_deref()
    }

    pub(crate) fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }
}

/// A constructor; its name is taken from the owning type when rendered.
#[derive(Debug, Clone, Default)]
pub struct Constructor {
    modifiers: Modifiers,
    parameters: Vec<Parameter>,
    throws: Vec<Arc<TypeDescriptor>>,
    body: Vec<String>,
}

impl Constructor {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Returns `InvalidModifier` if `modifiers` is not legal on a constructor.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Result<Self, ModelError> {
        ConstructKind::Constructor.check(modifiers)?;
        self.modifiers = modifiers;
        Ok(self)
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: Arc<TypeDescriptor>) -> Self {
        self.parameters.push(Parameter::new(name, ty));
        self
    }

    #[must_use]
    pub fn throws(mut self, exception: Arc<TypeDescriptor>) -> Self {
        self.throws.push(exception);
        self
    }

    #[must_use]
    pub fn body_line(mut self, line: impl Into<String>) -> Self {
        self.body.push(line.into());
        self
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[must_use]
    pub fn thrown(&self) -> &[Arc<TypeDescriptor>] {
        &self.throws
    }

    #[must_use]
    pub fn body_lines(&self) -> &[String] {
        &self.body
    }

    pub(crate) fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }
}

/// An instance or static initializer block. Its modifier set is fixed: empty
/// for instance initializers, `static` for static ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Initializer {
    body: Vec<String>,
}

impl Initializer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn body_line(mut self, line: impl Into<String>) -> Self {
        self.body.push(line.into());
        self
    }

    #[must_use]
    pub fn body_lines(&self) -> &[String] {
        &self.body
    }
}

pub type StaticInitializer = Initializer;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Primitive, TypeRegistry};

    #[test]
    fn test_field_rejects_method_only_modifiers() {
        let registry = TypeRegistry::new();
        let field = Field::new("count", registry.primitive(Primitive::Int));
        let err = field.with_modifiers(Modifiers::SYNCHRONIZED).unwrap_err();
        assert!(matches!(err, ModelError::InvalidModifier { .. }));
    }

    #[test]
    fn test_method_builder() {
        let registry = TypeRegistry::new();
        let int = registry.primitive(Primitive::Int);
        let method = Method::new("add", int.clone())
            .with_modifiers(Modifiers::PUBLIC | Modifiers::STATIC)
            .unwrap()
            .param("a", int.clone())
            .final_param("b", int)
            .body_line("return a + b;");

        assert_eq!(method.parameters().len(), 2);
        assert_eq!(method.parameters()[1].to_string(), "final int b");
        assert_eq!(method.body_lines(), Some(&["return a + b;".to_string()][..]));
    }

    #[test]
    fn test_constructor_rejects_static() {
        let err = Constructor::new().with_modifiers(Modifiers::STATIC).unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidModifier {
                offending: "static".to_string(),
                construct: "constructor".to_string(),
            }
        );
    }
}
