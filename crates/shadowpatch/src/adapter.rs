use crate::error::Error;
use serde_json::Value as Json;
use shadowpatch_config::ShadowConfig;
use shadowpatch_core::{
    patch::MergeEngine,
    reader::{DocumentError, DocumentReader, ReaderOptions},
    registry::TypeRegistry,
    value::Record,
};
use shadowpatch_schema::{
    build::compile,
    node::{TypeGraph, TypeRef},
};
use std::sync::Arc;

///
/// PatchAdapter
///
/// Request-facing entry point: type lookup, document read, merge. Holds a
/// frozen registry and is cheap to clone across handlers.
///

#[derive(Clone, Debug)]
pub struct PatchAdapter {
    registry: Arc<TypeRegistry>,
    options: ReaderOptions,
}

impl PatchAdapter {
    #[must_use]
    pub const fn new(registry: Arc<TypeRegistry>, options: ReaderOptions) -> Self {
        Self { registry, options }
    }

    /// Compile `graph` for the configured roots and wrap the result.
    pub fn from_config(graph: TypeGraph, config: &ShadowConfig) -> Result<Self, Error> {
        let roots = config.root_types()?;
        let set = compile(graph, &roots)?;

        let mut registry = TypeRegistry::new();
        registry.register_set(Arc::new(set))?;

        Ok(Self::new(registry.freeze(), config.reader_options()))
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Merge the JSON patch `document` into `target` as type `ty`.
    pub fn apply_json(
        &self,
        ty: &TypeRef,
        document: &Json,
        target: Option<Record>,
    ) -> Result<Record, Error> {
        // Phase 1: resolve the schema.
        let schema = self.registry.require(ty)?;

        // Phase 2: read the document into a shadow instance.
        let shadow = DocumentReader::new(schema.set(), self.options).read(schema.id(), document)?;

        // Phase 3: merge.
        let merged = MergeEngine::new(schema.set()).apply(schema.descriptor(), &shadow, target)?;

        Ok(merged)
    }

    /// `apply_json` for raw request bodies.
    pub fn apply_str(
        &self,
        ty: &TypeRef,
        document: &str,
        target: Option<Record>,
    ) -> Result<Record, Error> {
        let json: Json = serde_json::from_str(document)
            .map_err(|err| DocumentError::new(format!("malformed JSON: {err}")))?;

        self.apply_json(ty, &json, target)
    }
}
