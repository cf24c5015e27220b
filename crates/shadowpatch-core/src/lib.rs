//! Runtime side of shadowpatch: instance values, shadow instances, the
//! JSON document reader, the merge engine and the type registry.
//!
//! Schemas come from `shadowpatch-schema`; nothing here inspects a type
//! graph to decide how to merge.

// public exports are one module level down
pub mod obs;
pub mod patch;
pub mod reader;
pub mod registry;
pub mod shadow;
pub mod value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        patch::MergeEngine,
        reader::{DocumentReader, ReaderOptions},
        registry::{SchemaRef, TypeRegistry},
        shadow::{ShadowInstance, ShadowValue},
        value::{MapKey, Record, Value},
    };
}
