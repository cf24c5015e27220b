//! Merge engine: applies a shadow instance to a target record with
//! RFC 7396 semantics, driven entirely by precomputed merge strategies.

mod construct;
mod error;


pub use error::MergeError;

use crate::{
    obs::sink::{self, MetricsEvent},
    patch::construct::construct,
    shadow::{ShadowInstance, ShadowValue},
    value::{MapKey, Record, Value, default_for},
};
use shadowpatch_schema::shadow::{
    MergeStrategy, SchemaId, SchemaSet, ShadowField, ShadowSchemaDescriptor,
};
use std::collections::BTreeMap;

///
/// MergeEngine
///
/// Stateless view over one schema arena. Nested schemas are resolved by id
/// against that arena, never through a registry.
///

#[derive(Clone, Copy, Debug)]
pub struct MergeEngine<'a> {
    set: &'a SchemaSet,
}

impl<'a> MergeEngine<'a> {
    #[must_use]
    pub const fn new(set: &'a SchemaSet) -> Self {
        Self { set }
    }

    /// Apply `shadow` to `target`, constructing a fresh instance when the
    /// target is absent. The shadow instance is only read.
    pub fn apply(
        &self,
        schema: &ShadowSchemaDescriptor,
        shadow: &ShadowInstance,
        target: Option<Record>,
    ) -> Result<Record, MergeError> {
        let type_path = schema.source_type.to_string();
        sink::record(MetricsEvent::MergeStart {
            type_path: &type_path,
        });

        let result = target
            .as_ref()
            .map_or(Ok(()), |record| check_target(schema, record))
            .and_then(|()| self.merge(schema, shadow, target));

        match &result {
            Ok(_) => sink::record(MetricsEvent::MergeFinish {
                type_path: &type_path,
                fields_applied: u64::try_from(shadow.presence.count()).unwrap_or(u64::MAX),
            }),
            Err(_) => sink::record(MetricsEvent::MergeFailed {
                type_path: &type_path,
            }),
        }

        result
    }

    /// `apply` against the arena schema `id`.
    pub fn apply_id(
        &self,
        id: SchemaId,
        shadow: &ShadowInstance,
        target: Option<Record>,
    ) -> Result<Record, MergeError> {
        let schema = self.schema(id)?;

        self.apply(schema, shadow, target)
    }

    fn schema(&self, id: SchemaId) -> Result<&'a ShadowSchemaDescriptor, MergeError> {
        self.set.get(id).ok_or(MergeError::MissingSchema { id })
    }

    fn merge(
        &self,
        schema: &ShadowSchemaDescriptor,
        shadow: &ShadowInstance,
        target: Option<Record>,
    ) -> Result<Record, MergeError> {
        check_instance(schema, shadow)?;

        let mut target = target.unwrap_or_else(|| construct(self.set.graph(), schema));

        // Phase 1: construction-only members force a full rebuild.
        if schema.has_immutable_fields() {
            target = self.rebuild(schema, shadow, target)?;
        }

        // Phase 2: assignable members, in presence order.
        for field in schema.assignable_fields() {
            let Some(value) = present_value(shadow, field) else {
                continue;
            };
            let current = target.take(field.name());
            let merged = self
                .merge_field(field, value, current)
                .map_err(|err| err.with_field(field.name()))?;
            target.set(field.name(), merged);
        }

        Ok(target)
    }

    // New instance where each construction-only member is the merged value
    // when present and the current value otherwise. Everything else is
    // copied through unchanged.
    fn rebuild(
        &self,
        schema: &ShadowSchemaDescriptor,
        shadow: &ShadowInstance,
        mut current: Record,
    ) -> Result<Record, MergeError> {
        let mut rebuilt = construct(self.set.graph(), schema);

        for field in schema.immutable_fields() {
            let Some(value) = present_value(shadow, field) else {
                continue;
            };
            let existing = current.take(field.name());
            let merged = self
                .merge_field(field, value, existing)
                .map_err(|err| err.with_field(field.name()))?;
            current.set(field.name(), merged);
        }
        rebuilt.fields.extend(current.fields);

        Ok(rebuilt)
    }

    fn merge_field(
        &self,
        field: &ShadowField,
        value: &ShadowValue,
        current: Option<Value>,
    ) -> Result<Value, MergeError> {
        match (field.strategy, value) {
            (MergeStrategy::AssignOrDefault, ShadowValue::Null) => {
                Ok(default_for(self.set.graph(), &field.member.declared_type))
            }
            (MergeStrategy::AssignOrDefault, ShadowValue::Value(v)) if v.is_null() => {
                Ok(default_for(self.set.graph(), &field.member.declared_type))
            }
            // present null clears, whatever the strategy
            (_, ShadowValue::Null) => Ok(Value::Null),

            (
                MergeStrategy::Assign | MergeStrategy::AssignOrDefault | MergeStrategy::ReplaceList,
                ShadowValue::Value(v),
            ) => Ok(v.clone()),

            (MergeStrategy::Nested(id), ShadowValue::Object(nested)) => {
                let schema = self.schema(id)?;
                let current = current.and_then(Value::into_record);

                self.merge(schema, nested, current).map(Value::Record)
            }

            (MergeStrategy::MapOfScalar, ShadowValue::ScalarMap(delta)) => {
                Ok(Value::Map(merge_scalar_map(current, delta)))
            }

            (MergeStrategy::MapOfPatchable(id), ShadowValue::ObjectMap(delta)) => {
                self.merge_object_map(id, current, delta).map(Value::Map)
            }

            (MergeStrategy::ListOfPatchable(id), ShadowValue::ObjectList(items)) => {
                self.rebuild_list(id, items).map(Value::List)
            }

            (strategy, other) => Err(MergeError::InvalidShape {
                expected: expected_shape(strategy),
                actual: other.label(),
            }),
        }
    }

    // Per-key delta: `None` removes, otherwise merge against the existing
    // entry (or a fresh instance when the key is new).
    fn merge_object_map(
        &self,
        id: SchemaId,
        current: Option<Value>,
        delta: &BTreeMap<MapKey, Option<ShadowInstance>>,
    ) -> Result<BTreeMap<MapKey, Value>, MergeError> {
        let schema = self.schema(id)?;
        let mut map = into_map(current);

        for (key, entry) in delta {
            let existing = map.remove(key);
            let Some(nested) = entry else {
                continue;
            };
            let merged = self
                .merge(schema, nested, existing.and_then(Value::into_record))
                .map_err(|err| err.with_field(key.to_string()))?;
            map.insert(key.clone(), Value::Record(merged));
        }

        Ok(map)
    }

    // Whole-value replacement: every element is built against an absent
    // target, so existing elements never leak into the result.
    fn rebuild_list(
        &self,
        id: SchemaId,
        items: &[Option<ShadowInstance>],
    ) -> Result<Vec<Value>, MergeError> {
        let schema = self.schema(id)?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                None => Ok(Value::Null),
                Some(nested) => self
                    .merge(schema, nested, None)
                    .map(Value::Record)
                    .map_err(|err| err.with_index(i)),
            })
            .collect()
    }
}

fn present_value<'s>(shadow: &'s ShadowInstance, field: &ShadowField) -> Option<&'s ShadowValue> {
    if shadow.is_present(field.presence_index) {
        shadow.value(field.presence_index)
    } else {
        None
    }
}

fn merge_scalar_map(current: Option<Value>, delta: &BTreeMap<MapKey, Value>) -> BTreeMap<MapKey, Value> {
    let mut map = into_map(current);

    for (key, value) in delta {
        if value.is_null() {
            map.remove(key);
        } else {
            map.insert(key.clone(), value.clone());
        }
    }

    map
}

// A null or non-map member is replaced by an empty map before merging.
fn into_map(current: Option<Value>) -> BTreeMap<MapKey, Value> {
    match current {
        Some(Value::Map(map)) => map,
        _ => BTreeMap::new(),
    }
}

fn check_instance(schema: &ShadowSchemaDescriptor, shadow: &ShadowInstance) -> Result<(), MergeError> {
    if shadow.schema != schema.id {
        return Err(MergeError::SchemaMismatch {
            expected: schema.id,
            actual: shadow.schema,
        });
    }

    let expected = schema.field_count();
    for actual in [shadow.presence.len(), shadow.values.len()] {
        if actual != expected {
            return Err(MergeError::CardinalityViolation { expected, actual });
        }
    }

    Ok(())
}

fn check_target(schema: &ShadowSchemaDescriptor, target: &Record) -> Result<(), MergeError> {
    if target.ty == schema.source_type {
        Ok(())
    } else {
        Err(MergeError::TargetMismatch {
            expected: schema.source_type.to_string(),
            actual: target.ty.to_string(),
        })
    }
}

const fn expected_shape(strategy: MergeStrategy) -> &'static str {
    match strategy {
        MergeStrategy::Assign | MergeStrategy::AssignOrDefault | MergeStrategy::ReplaceList => {
            "value"
        }
        MergeStrategy::Nested(_) => "object",
        MergeStrategy::MapOfScalar => "scalar map",
        MergeStrategy::MapOfPatchable(_) => "object map",
        MergeStrategy::ListOfPatchable(_) => "object list",
    }
}
