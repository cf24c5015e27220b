mod synthesize;

pub use synthesize::synthesize;

use crate::{
    classify::{Classifier, IneligibleReason},
    closure::resolve,
    error::ErrorTree,
    node::{TypeGraph, TypeRef},
    shadow::{SchemaId, SchemaSet},
    validate::validate_graph,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};
use thiserror::Error as ThisError;

///
/// BuildError
///

#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error("validation failed: {0}")]
    Validation(ErrorTree),
}

impl BuildError {
    #[must_use]
    pub const fn errors(&self) -> &ErrorTree {
        match self {
            Self::Validation(tree) => tree,
        }
    }
}

///
/// SchemaBuildError
///
/// Fatal, build-time schema failures. Never caught internally.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaBuildError {
    #[error("type '{ty}' has more than one greediest constructor ({arity} parameters)")]
    AmbiguousConstructor { ty: TypeRef, arity: usize },

    #[error("root type '{ty}' cannot be patched: {reason}")]
    IneligibleRoot { ty: TypeRef, reason: IneligibleReason },

    #[error("inheritance chain of '{ty}' is cyclic")]
    InheritanceCycle { ty: TypeRef },

    #[error("schema invariant violated for '{ty}': {message}")]
    Invariant { ty: TypeRef, message: String },
}

impl SchemaBuildError {
    /// The offending type, used to route and deduplicate reports.
    #[must_use]
    pub const fn ty(&self) -> &TypeRef {
        match self {
            Self::AmbiguousConstructor { ty, .. }
            | Self::IneligibleRoot { ty, .. }
            | Self::InheritanceCycle { ty }
            | Self::Invariant { ty, .. } => ty,
        }
    }
}

/// Compile shadow schemas for `roots` and everything they reach.
///
/// Stages run in a fixed order and stop at the first stage that reports:
/// graph validation, closure resolution, id reservation, synthesis.
pub fn compile(graph: TypeGraph, roots: &BTreeSet<TypeRef>) -> Result<SchemaSet, BuildError> {
    // Phase 1: structural graph validation.
    let mut errs = ErrorTree::new();
    validate_graph(&graph, &mut errs);
    errs.result().map_err(BuildError::Validation)?;

    // Phase 2: closure + classification.
    let classifier = Classifier::new(&graph);
    let closure = resolve(&classifier, roots).map_err(BuildError::Validation)?;

    // Phase 3: reserve an arena slot per type so fields can forward-reference.
    let mut ids = BTreeMap::new();
    for (index, ty) in closure.order().iter().enumerate() {
        let index = u32::try_from(index).map_err(|_| {
            BuildError::Validation(ErrorTree::from_message("too many schema types"))
        })?;
        ids.insert(ty.clone(), SchemaId::new(index));
    }

    // Phase 4: synthesize descriptors in id order.
    let mut schemas = Vec::with_capacity(closure.len());
    let mut errs = ErrorTree::new();
    for ty in closure.order() {
        let Some(entry) = closure.entry(ty) else {
            errs.add_for(ty.to_string(), "closure entry missing");
            continue;
        };
        match synthesize(&classifier, ty, entry, &ids) {
            Ok(schema) => schemas.push(schema),
            Err(err) => errs.add_for(err.ty().to_string(), err),
        }
    }
    errs.result().map_err(BuildError::Validation)?;

    Ok(SchemaSet::new(Arc::new(graph), schemas))
}

///
/// TESTS
///
