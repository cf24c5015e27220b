//! Build-time side of shadowpatch: the type graph model, the member
//! classifier, closure resolution and shadow schema synthesis.
//!
//! In general:
//! - `node` defines *what exists* (type definitions, members, constructors)
//! - `build` turns a graph plus root types into an immutable `SchemaSet`
//! - the runtime crate consumes the `SchemaSet` to merge documents

pub mod build;
pub mod classify;
pub mod closure;
pub mod error;
pub mod node;
pub mod shadow;
pub mod types;
pub mod validate;

/// Maximum length for type path identifiers.
pub const MAX_TYPE_PATH_LEN: usize = 256;

/// Maximum length for member identifiers.
pub const MAX_MEMBER_NAME_LEN: usize = 64;

use crate::{build::BuildError, node::NodeError};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        build::{BuildError, compile},
        classify::{Classification, Classifier, ConstructorPlan, Eligibility},
        closure::{Closure, resolve},
        err,
        error::ErrorTree,
        node::*,
        shadow::{MergeStrategy, SchemaId, SchemaSet, ShadowField, ShadowSchemaDescriptor, ShadowType},
        types::Primitive,
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    BuildError(#[from] BuildError),

    #[error(transparent)]
    NodeError(#[from] NodeError),
}
