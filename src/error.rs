use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid Modifier: `{offending}` is not allowed on {construct}")]
    #[diagnostic(
        code(model::invalid_modifier),
        help("Remove the offending modifier bits or use at most one visibility modifier.")
    )]
    InvalidModifier {
        /// The bits that fall outside the construct's legal mask.
        offending: String,
        construct: String,
    },

    #[error("Invalid Class: `{type_name}` cannot be used as {expected}")]
    #[diagnostic(
        code(model::invalid_class),
        help("Class contexts accept only plain classes; interface contexts accept only interfaces.")
    )]
    InvalidClass { type_name: String, expected: String },

    #[error("Illegal Import: `{member}` is not a static member")]
    #[diagnostic(
        code(model::illegal_import),
        help("Only members declared `static` can be imported with `import static`.")
    )]
    IllegalImport { member: String },

    #[error("Ownership Conflict: {declaration} is already owned by {current}")]
    #[diagnostic(
        code(model::ownership_conflict),
        help("A declaration can be registered at exactly one owner; create a new declaration instead.")
    )]
    OwnershipConflict {
        declaration: String,
        current: String,
        requested: String,
    },

    #[error("Cyclic Ownership: registering {declaration} at {owner} would make it its own ancestor")]
    #[diagnostic(code(model::cyclic_ownership))]
    CyclicOwnership { declaration: String, owner: String },

    #[error("Illegal Owner: {owner} cannot hold {declaration}")]
    #[diagnostic(
        code(model::illegal_owner),
        help("Members belong to types; packages and imports belong to compilation units.")
    )]
    IllegalOwner { declaration: String, owner: String },

    #[error("Unknown declaration {0}")]
    #[diagnostic(code(model::unknown_declaration))]
    UnknownDeclaration(String),

    #[error("Detached declaration: {0} has no owner")]
    #[diagnostic(
        code(model::detached_declaration),
        help("Register the declaration at a type before generating source for it.")
    )]
    DetachedDeclaration(String),

    #[error("Catalog error: {0}")]
    #[diagnostic(code(model::catalog))]
    Catalog(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Catalog(err.to_string())
    }
}

impl From<serde_yaml::Error> for ModelError {
    fn from(err: serde_yaml::Error) -> Self {
        ModelError::Catalog(err.to_string())
    }
}
