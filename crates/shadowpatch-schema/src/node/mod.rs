//! Type graph model: pure data describing source types, their settable
//! members and constructors. No merge behaviour lives here.

mod graph;
mod member;
mod type_def;
mod type_ref;

pub use graph::TypeGraph;
pub use member::{MemberAccess, MemberDef, MemberDescriptor};
pub use type_def::{ConstructorDef, ConstructorParam, TypeDef, TypeKind};
pub use type_ref::{LIST_PATH, MAP_PATH, NULLABLE_PATH, TypeRef, TypeRefParseError, TypeShape};

use thiserror::Error as ThisError;

///
/// NodeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum NodeError {
    #[error("type '{path}' is already defined")]
    DuplicateType { path: String },
}
