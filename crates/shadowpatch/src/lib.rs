//! ## Crate layout
//! - `schema`: type graph model, classifier, closure resolution, shadow
//!   schema synthesis.
//! - `core`: runtime values, document reader, merge engine, type registry
//!   and observability.
//! - `config`: `shadowpatch.toml` loading.
//!
//! `PatchAdapter` is the request-facing entry point; `prelude` carries the
//! vocabulary most callers need.

pub use shadowpatch_config as config;
pub use shadowpatch_core as core;
pub use shadowpatch_schema as schema;

pub mod adapter;
pub mod error;
pub mod patch;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use adapter::PatchAdapter;
pub use error::Error;
pub use patch::apply_patch;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        PatchAdapter,
        core::{
            patch::MergeEngine,
            reader::{DocumentReader, ReaderOptions},
            registry::{SchemaRef, TypeRegistry},
            shadow::{ShadowInstance, ShadowValue},
            value::{MapKey, Record, Value},
        },
        schema::{
            build::compile,
            node::{MemberDef, TypeDef, TypeGraph, TypeRef},
            shadow::{SchemaSet, ShadowSchemaDescriptor},
            types::Primitive,
        },
    };
}
