//! Shadow schema model: the presence-tracking mirror of a source type, as
//! produced by synthesis and consumed by the merge engine, the registry and
//! any source emitter.

use crate::{
    classify::ConstructorPlan,
    node::{MemberDescriptor, TypeGraph, TypeRef},
};
use derive_more::Display;
use serde::Serialize;
use std::{collections::BTreeMap, ops::Index, sync::Arc};

///
/// SchemaId
///
/// Arena index of a descriptor inside its `SchemaSet`. Ids are reserved for
/// every closure type before synthesis, so descriptors may reference each
/// other (cycles included) without being built first.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[display("#{_0}")]
#[serde(transparent)]
pub struct SchemaId(u32);

impl SchemaId {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

///
/// ShadowType
///
/// How a shadow field is represented.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum ShadowType {
    /// Same type as the source member.
    Same(TypeRef),

    /// Explicit-nullable wrapper around a value type.
    Nullable(TypeRef),

    /// Shadow instance of another schema.
    Shadow(SchemaId),

    Map {
        key: TypeRef,
        value: Box<ShadowType>,
    },

    List(Box<ShadowType>),
}

///
/// MergeStrategy
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum MergeStrategy {
    /// Assign the shadow value; null clears.
    Assign,

    /// Assign the shadow value; null degrades to the type's default.
    AssignOrDefault,

    /// Merge recursively against the current member value.
    Nested(SchemaId),

    /// Per-key upsert/remove of scalar values.
    MapOfScalar,

    /// Per-key recursive merge; null removes the key.
    MapOfPatchable(SchemaId),

    /// Rebuild every element against an absent target.
    ListOfPatchable(SchemaId),

    /// Whole-value replacement.
    ReplaceList,
}

impl MergeStrategy {
    /// Schema referenced by recursive strategies.
    #[must_use]
    pub const fn nested_schema(self) -> Option<SchemaId> {
        match self {
            Self::Nested(id) | Self::MapOfPatchable(id) | Self::ListOfPatchable(id) => Some(id),
            _ => None,
        }
    }
}

///
/// ShadowField
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ShadowField {
    pub member: MemberDescriptor,
    pub presence_index: usize,
    pub shadow_type: ShadowType,
    pub strategy: MergeStrategy,
}

impl ShadowField {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.member.name
    }

    #[must_use]
    pub const fn is_immutable(&self) -> bool {
        self.member.immutable_construction_only
    }
}

///
/// ShadowSchemaDescriptor
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ShadowSchemaDescriptor {
    pub id: SchemaId,
    pub source_type: TypeRef,

    /// Every settable member, opaque ones included, in presence order.
    pub members: Vec<MemberDescriptor>,

    /// Shadowed members; `fields[i].presence_index == i`.
    pub fields: Vec<ShadowField>,

    pub constructor: ConstructorPlan,
}

impl ShadowSchemaDescriptor {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ShadowField> {
        self.fields.iter().find(|f| f.member.name == name)
    }

    #[must_use]
    pub const fn field_count(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn has_immutable_fields(&self) -> bool {
        self.members.iter().any(|m| m.immutable_construction_only)
    }

    pub fn assignable_fields(&self) -> impl Iterator<Item = &ShadowField> {
        self.fields.iter().filter(|f| !f.is_immutable())
    }

    pub fn immutable_fields(&self) -> impl Iterator<Item = &ShadowField> {
        self.fields.iter().filter(|f| f.is_immutable())
    }
}

///
/// SchemaSet
///
/// Arena of descriptors produced by one compilation, plus the graph they
/// were compiled from. Immutable and shareable across threads.
///

#[derive(Clone, Debug, Serialize)]
pub struct SchemaSet {
    #[serde(skip)]
    graph: Arc<TypeGraph>,
    schemas: Vec<ShadowSchemaDescriptor>,

    #[serde(skip)]
    index: BTreeMap<TypeRef, SchemaId>,
}

impl SchemaSet {
    pub(crate) fn new(graph: Arc<TypeGraph>, schemas: Vec<ShadowSchemaDescriptor>) -> Self {
        let index = schemas
            .iter()
            .map(|schema| (schema.source_type.clone(), schema.id))
            .collect();

        Self {
            graph,
            schemas,
            index,
        }
    }

    #[must_use]
    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    #[must_use]
    pub fn get(&self, id: SchemaId) -> Option<&ShadowSchemaDescriptor> {
        self.schemas.get(id.index())
    }

    #[must_use]
    pub fn id_of(&self, ty: &TypeRef) -> Option<SchemaId> {
        self.index.get(ty).copied()
    }

    #[must_use]
    pub fn lookup(&self, ty: &TypeRef) -> Option<&ShadowSchemaDescriptor> {
        self.id_of(ty).and_then(|id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShadowSchemaDescriptor> {
        self.schemas.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl Index<SchemaId> for SchemaSet {
    type Output = ShadowSchemaDescriptor;

    fn index(&self, id: SchemaId) -> &Self::Output {
        &self.schemas[id.index()]
    }
}
