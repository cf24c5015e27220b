//! JSON document reader.
//!
//! Turns an incoming merge-patch document into a `ShadowInstance`. A
//! member's presence bit is set exactly when its key appears in the
//! document, `null` included; absent keys leave the slot untouched.

mod error;

#[cfg(test)]
mod tests;

pub use error::DocumentError;

use crate::{
    obs::sink::{self, MetricsEvent},
    shadow::{ShadowInstance, ShadowValue},
    value::{
        MapKey, Value,
        json::{decode, decode_key},
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as Json};
use shadowpatch_schema::{
    classify::Classification,
    node::TypeRef,
    shadow::{MergeStrategy, SchemaId, SchemaSet, ShadowField, ShadowSchemaDescriptor},
};
use std::collections::BTreeMap;

/// Default nesting limit for incoming documents.
pub const DEFAULT_MAX_DEPTH: usize = 64;

///
/// ReaderOptions
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Reject document keys that name no settable member.
    pub deny_unknown_fields: bool,

    /// Maximum object nesting below the document root.
    pub max_depth: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            deny_unknown_fields: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

///
/// DocumentReader
///

#[derive(Clone, Copy, Debug)]
pub struct DocumentReader<'a> {
    set: &'a SchemaSet,
    options: ReaderOptions,
}

impl<'a> DocumentReader<'a> {
    #[must_use]
    pub const fn new(set: &'a SchemaSet, options: ReaderOptions) -> Self {
        Self { set, options }
    }

    #[must_use]
    pub const fn options(&self) -> ReaderOptions {
        self.options
    }

    /// Read `json` as a shadow instance of the arena schema `id`.
    pub fn read(&self, id: SchemaId, json: &Json) -> Result<ShadowInstance, DocumentError> {
        let schema = self.schema(id)?;
        let type_path = schema.source_type.to_string();

        let result = self.read_object(schema, json, 0);
        match &result {
            Ok(instance) => sink::record(MetricsEvent::DocumentRead {
                type_path: &type_path,
                fields_present: u64::try_from(instance.presence.count()).unwrap_or(u64::MAX),
            }),
            Err(_) => sink::record(MetricsEvent::DocumentRejected {
                type_path: &type_path,
            }),
        }

        result
    }

    /// Parse `text` as JSON, then `read` it.
    pub fn read_str(&self, id: SchemaId, text: &str) -> Result<ShadowInstance, DocumentError> {
        let json: Json = serde_json::from_str(text)
            .map_err(|err| DocumentError::new(format!("malformed JSON: {err}")))?;

        self.read(id, &json)
    }

    fn schema(&self, id: SchemaId) -> Result<&'a ShadowSchemaDescriptor, DocumentError> {
        self.set
            .get(id)
            .ok_or_else(|| DocumentError::new(format!("schema {id} is not in the schema set")))
    }

    fn read_object(
        &self,
        schema: &ShadowSchemaDescriptor,
        json: &Json,
        depth: usize,
    ) -> Result<ShadowInstance, DocumentError> {
        if depth > self.options.max_depth {
            return Err(DocumentError::new(format!(
                "document nesting exceeds {} levels",
                self.options.max_depth
            )));
        }
        let Json::Object(entries) = json else {
            return Err(DocumentError::new(format!(
                "expected object for '{}', found {}",
                schema.source_type,
                json_label(json)
            )));
        };

        if self.options.deny_unknown_fields {
            check_known(schema, entries)?;
        }

        let mut instance = ShadowInstance::new(schema);
        for field in &schema.fields {
            let Some(raw) = entries.get(field.name()) else {
                continue;
            };
            let value = self
                .read_field(field, raw, depth)
                .map_err(|err| err.with_field(field.name()))?;
            instance.set(field.presence_index, value);
        }

        Ok(instance)
    }

    fn read_field(
        &self,
        field: &ShadowField,
        raw: &Json,
        depth: usize,
    ) -> Result<ShadowValue, DocumentError> {
        // present null, whatever the strategy
        if raw.is_null() {
            return Ok(ShadowValue::Null);
        }
        let graph = self.set.graph();

        match field.strategy {
            MergeStrategy::Assign | MergeStrategy::AssignOrDefault | MergeStrategy::ReplaceList => {
                decode(graph, &field.member.declared_type, raw).map(ShadowValue::from)
            }

            MergeStrategy::Nested(id) => self
                .read_object(self.schema(id)?, raw, depth + 1)
                .map(ShadowValue::from),

            MergeStrategy::MapOfScalar => {
                let Classification::MapOfScalar { key, value } = &field.member.classification
                else {
                    return Err(strategy_mismatch(field));
                };
                let mut delta = BTreeMap::new();
                for (raw_key, item) in expect_object(raw)? {
                    let (k, v) = read_scalar_entry(self.set, key, value, raw_key, item)
                        .map_err(|err| err.with_field(raw_key))?;
                    delta.insert(k, v);
                }

                Ok(ShadowValue::ScalarMap(delta))
            }

            MergeStrategy::MapOfPatchable(id) => {
                let Classification::MapOfPatchable { key, .. } = &field.member.classification
                else {
                    return Err(strategy_mismatch(field));
                };
                let schema = self.schema(id)?;
                let mut delta = BTreeMap::new();
                for (raw_key, item) in expect_object(raw)? {
                    let k = decode_key(graph, key, raw_key).map_err(|err| err.with_field(raw_key))?;
                    let v = self
                        .read_optional(schema, item, depth)
                        .map_err(|err| err.with_field(raw_key))?;
                    delta.insert(k, v);
                }

                Ok(ShadowValue::ObjectMap(delta))
            }

            MergeStrategy::ListOfPatchable(id) => {
                let Json::Array(items) = raw else {
                    return Err(DocumentError::new(format!(
                        "expected array, found {}",
                        json_label(raw)
                    )));
                };
                let schema = self.schema(id)?;

                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        self.read_optional(schema, item, depth)
                            .map_err(|err| err.with_index(i))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(ShadowValue::ObjectList)
            }
        }
    }

    // Container element: null stays `None`, anything else is a nested object.
    fn read_optional(
        &self,
        schema: &ShadowSchemaDescriptor,
        item: &Json,
        depth: usize,
    ) -> Result<Option<ShadowInstance>, DocumentError> {
        if item.is_null() {
            return Ok(None);
        }

        self.read_object(schema, item, depth + 1).map(Some)
    }
}

fn read_scalar_entry(
    set: &SchemaSet,
    key: &TypeRef,
    value: &TypeRef,
    raw_key: &str,
    item: &Json,
) -> Result<(MapKey, Value), DocumentError> {
    let k = decode_key(set.graph(), key, raw_key)?;
    let v = if item.is_null() {
        Value::Null
    } else {
        decode(set.graph(), value, item)?
    };

    Ok((k, v))
}

// Opaque members are known: their keys are accepted and ignored.
fn check_known(
    schema: &ShadowSchemaDescriptor,
    entries: &JsonMap<String, Json>,
) -> Result<(), DocumentError> {
    for key in entries.keys() {
        if !schema.members.iter().any(|m| &m.name == key) {
            return Err(DocumentError::new(format!(
                "unknown member for '{}'",
                schema.source_type
            ))
            .with_field(key));
        }
    }

    Ok(())
}

fn expect_object(raw: &Json) -> Result<&JsonMap<String, Json>, DocumentError> {
    match raw {
        Json::Object(entries) => Ok(entries),
        other => Err(DocumentError::new(format!(
            "expected object, found {}",
            json_label(other)
        ))),
    }
}

fn strategy_mismatch(field: &ShadowField) -> DocumentError {
    DocumentError::new(format!(
        "member classified as {} cannot use strategy {:?}",
        field.member.classification.label(),
        field.strategy
    ))
}

const fn json_label(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
