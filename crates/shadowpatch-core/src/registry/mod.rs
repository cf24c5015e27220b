//! Type registry: maps source types to their shadow schemas.
//!
//! Populated during a single-threaded build-out phase, then frozen into an
//! `Arc` and shared read-only.

use crate::obs::sink::{self, MetricsEvent};
use shadowpatch_schema::{
    node::TypeRef,
    shadow::{SchemaId, SchemaSet, ShadowSchemaDescriptor},
};
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;

///
/// RegistryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RegistryError {
    #[error("a shadow schema is already registered for '{ty}'")]
    DuplicateRegistration { ty: TypeRef },

    #[error("no shadow schema registered for '{ty}'")]
    SchemaNotFound { ty: TypeRef },

    #[error("schema for '{schema}' cannot be registered under '{ty}'")]
    TypeMismatch { ty: TypeRef, schema: TypeRef },
}

///
/// SchemaRef
///
/// A descriptor handle that keeps its arena alive, so nested schema ids
/// keep resolving wherever the handle travels.
///

#[derive(Clone, Debug)]
pub struct SchemaRef {
    set: Arc<SchemaSet>,
    id: SchemaId,
}

impl SchemaRef {
    /// Handle for `id`, if the arena holds it.
    #[must_use]
    pub fn new(set: Arc<SchemaSet>, id: SchemaId) -> Option<Self> {
        set.get(id)?;

        Some(Self { set, id })
    }

    #[must_use]
    pub fn for_type(set: Arc<SchemaSet>, ty: &TypeRef) -> Option<Self> {
        let id = set.id_of(ty)?;

        Some(Self { set, id })
    }

    #[must_use]
    pub fn descriptor(&self) -> &ShadowSchemaDescriptor {
        &self.set[self.id]
    }

    #[must_use]
    pub fn set(&self) -> &SchemaSet {
        &self.set
    }

    #[must_use]
    pub const fn id(&self) -> SchemaId {
        self.id
    }

    #[must_use]
    pub fn source_type(&self) -> &TypeRef {
        &self.descriptor().source_type
    }
}

impl PartialEq for SchemaRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.set, &other.set) && self.id == other.id
    }
}

impl Eq for SchemaRef {}

///
/// TypeRegistry
///

#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    entries: BTreeMap<TypeRef, SchemaRef>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `schema` for `ty`. A type can be registered once.
    pub fn register(&mut self, ty: TypeRef, schema: SchemaRef) -> Result<(), RegistryError> {
        self.check(&ty, &schema)?;
        self.entries.insert(ty, schema);

        Ok(())
    }

    /// Register every descriptor of a compiled set. Nothing is registered
    /// if any type is already present.
    pub fn register_set(&mut self, set: Arc<SchemaSet>) -> Result<(), RegistryError> {
        // Phase 1: validate the whole batch.
        let refs: Vec<SchemaRef> = set
            .iter()
            .map(|schema| SchemaRef {
                set: Arc::clone(&set),
                id: schema.id,
            })
            .collect();
        for schema in &refs {
            self.check(schema.source_type(), schema)?;
        }

        // Phase 2: insert.
        for schema in refs {
            self.entries.insert(schema.source_type().clone(), schema);
        }

        Ok(())
    }

    fn check(&self, ty: &TypeRef, schema: &SchemaRef) -> Result<(), RegistryError> {
        if schema.source_type() != ty {
            return Err(RegistryError::TypeMismatch {
                ty: ty.clone(),
                schema: schema.source_type().clone(),
            });
        }
        if self.entries.contains_key(ty) {
            return Err(RegistryError::DuplicateRegistration { ty: ty.clone() });
        }

        Ok(())
    }

    #[must_use]
    pub fn lookup(&self, ty: &TypeRef) -> Option<&SchemaRef> {
        self.entries.get(ty)
    }

    /// Like `lookup`, but a miss is an error.
    pub fn require(&self, ty: &TypeRef) -> Result<&SchemaRef, RegistryError> {
        self.entries.get(ty).ok_or_else(|| {
            sink::record(MetricsEvent::RegistryMiss {
                type_path: &ty.to_string(),
            });

            RegistryError::SchemaNotFound { ty: ty.clone() }
        })
    }

    #[must_use]
    pub fn contains(&self, ty: &TypeRef) -> bool {
        self.entries.contains_key(ty)
    }

    /// Entries in type order.
    pub fn iter(&self) -> impl Iterator<Item = (&TypeRef, &SchemaRef)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn all(&self) -> Vec<(&TypeRef, &SchemaRef)> {
        self.iter().collect()
    }

    /// Copy in every entry of `other` whose type is not registered here.
    /// On overlap the receiver's entry is kept.
    pub fn merge_from(&mut self, other: &Self) -> &mut Self {
        for (ty, schema) in &other.entries {
            self.entries
                .entry(ty.clone())
                .or_insert_with(|| schema.clone());
        }

        self
    }

    /// End the build-out phase.
    #[must_use]
    pub fn freeze(self) -> Arc<Self> {
        Arc::new(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

///
/// TESTS
///
