pub mod assembler;
pub mod catalog;
pub mod error;
pub mod members;
pub mod model;
pub mod modifiers;
pub mod type_def;
pub mod types;
pub mod unit;
pub mod utils;

pub use assembler::Assembler;
pub use error::ModelError;
pub use model::{CodeModel, DeclId, Owner, UnitId};
pub use modifiers::{ConstructKind, Modifiers};
pub use types::{ExternalMember, ExternalType, Primitive, TypeDescriptor, TypeRegistry};
