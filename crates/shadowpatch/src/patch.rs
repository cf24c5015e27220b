use crate::error::Error;
use shadowpatch_core::{patch::MergeEngine, shadow::ShadowInstance, value::Record};
use shadowpatch_schema::shadow::{SchemaSet, ShadowSchemaDescriptor};

// re-exports
pub use shadowpatch_core::patch::MergeError;

/// Apply a shadow instance to `target` (or to a fresh instance when it is
/// absent), translating core merge errors into interface-level errors.
pub fn apply_patch(
    set: &SchemaSet,
    schema: &ShadowSchemaDescriptor,
    shadow: &ShadowInstance,
    target: Option<Record>,
) -> Result<Record, Error> {
    MergeEngine::new(set)
        .apply(schema, shadow, target)
        .map_err(Error::from)
}
