//! Serialized lists of external type references.
//!
//! External types normally come from whatever produced the model's inputs.
//! A catalog lets callers describe them as JSON or YAML and feed them into a
//! [`TypeRegistry`] up front.

use crate::error::ModelError;
use crate::types::{ExternalMember, ExternalType, TypeDescriptor, TypeRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCatalog {
    #[serde(default)]
    pub types: Vec<ExternalType>,
    #[serde(default)]
    pub members: Vec<ExternalMember>,
}

impl TypeCatalog {
    /// # Errors
    /// Returns `ModelError::Catalog` if `source` is not a valid JSON catalog.
    pub fn from_json(source: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(source)?)
    }

    /// # Errors
    /// Returns `ModelError::Catalog` if `source` is not a valid YAML catalog.
    pub fn from_yaml(source: &str) -> Result<Self, ModelError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Serializes the catalog into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    #[must_use]
    pub fn find_type(&self, qualified_name: &str) -> Option<&ExternalType> {
        self.types.iter().find(|t| t.qualified_name == qualified_name)
    }

    /// Looks a member up by the qualified name of its declaring type.
    #[must_use]
    pub fn find_member(&self, type_name: &str, member: &str) -> Option<&ExternalMember> {
        self.members
            .iter()
            .find(|m| m.declaring_type.qualified_name == type_name && m.name == member)
    }

    /// Static members only, in catalog order.
    pub fn static_members(&self) -> impl Iterator<Item = &ExternalMember> {
        self.members.iter().filter(|m| m.is_static())
    }

    /// Wraps every listed type, in catalog order.
    ///
    /// # Errors
    /// Returns `InvalidClass` for malformed primitive entries.
    pub fn wrap_all(&self, registry: &TypeRegistry) -> Result<Vec<Arc<TypeDescriptor>>, ModelError> {
        self.types.iter().map(|t| registry.wrap(t)).collect()
    }
}
