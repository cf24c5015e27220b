//! JSON codec for full values.
//!
//! `decode` is type-directed: the declared `TypeRef` decides how a JSON
//! value is read and range-checked. `encode` is the inverse for exporting
//! merged results.

use crate::{
    reader::DocumentError,
    value::{MapKey, Record, Value},
};
use serde_json::{Map as JsonMap, Number, Value as Json};
use shadowpatch_schema::{
    node::{TypeGraph, TypeKind, TypeRef, TypeShape},
    types::Primitive,
};
use std::collections::BTreeMap;
use time::{Date, macros::format_description};

/// Decode `json` as a value of type `ty`.
pub fn decode(graph: &TypeGraph, ty: &TypeRef, json: &Json) -> Result<Value, DocumentError> {
    match ty.shape() {
        TypeShape::Nullable(inner) => {
            if json.is_null() {
                Ok(Value::Null)
            } else {
                decode(graph, inner, json)
            }
        }
        TypeShape::Primitive(prim) => decode_primitive(prim, json),
        TypeShape::List(elem) => {
            let Json::Array(items) = json else {
                return null_or_mismatch(json, "array");
            };
            items
                .iter()
                .enumerate()
                .map(|(i, item)| decode(graph, elem, item).map_err(|err| err.with_index(i)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List)
        }
        TypeShape::Map(key, value) => {
            let Json::Object(entries) = json else {
                return null_or_mismatch(json, "object");
            };
            let mut map = BTreeMap::new();
            for (raw, item) in entries {
                let k = decode_key(graph, key, raw).map_err(|err| err.with_field(raw))?;
                let v = decode(graph, value, item).map_err(|err| err.with_field(raw))?;
                map.insert(k, v);
            }

            Ok(Value::Map(map))
        }
        TypeShape::Named(named) => decode_named(graph, named, json),
        TypeShape::Malformed => Err(DocumentError::new(format!(
            "malformed type reference '{ty}'"
        ))),
    }
}

fn decode_named(graph: &TypeGraph, ty: &TypeRef, json: &Json) -> Result<Value, DocumentError> {
    let Some(def) = graph.resolve(ty) else {
        return Ok(decode_dynamic(json));
    };

    match def.kind {
        TypeKind::Enum => {
            if json.is_null() {
                return Err(DocumentError::new("null is not a valid enumeration value"));
            }
            let Some(name) = json.as_str() else {
                return Err(mismatch("variant name", json));
            };
            if def.variants.iter().any(|v| v == name) {
                Ok(Value::Enum(name.to_string()))
            } else {
                Err(DocumentError::new(format!(
                    "unknown variant '{name}' for '{ty}'"
                )))
            }
        }
        TypeKind::Record | TypeKind::Struct => {
            if json.is_null() && def.kind == TypeKind::Record {
                return Ok(Value::Null);
            }
            let Json::Object(entries) = json else {
                return Err(mismatch("object", json));
            };
            let members = graph
                .settable_members(ty)
                .map_err(|err| DocumentError::new(err.to_string()))?;

            let mut record = Record::new(ty.clone());
            for (_, member) in members {
                if let Some(item) = entries.get(&member.name) {
                    let value = decode(graph, &member.ty, item)
                        .map_err(|err| err.with_field(&member.name))?;
                    record.set(member.name, value);
                }
            }

            Ok(Value::Record(record))
        }
        // no declared shape to read against
        TypeKind::Interface => Ok(decode_dynamic(json)),
    }
}

fn decode_primitive(prim: Primitive, json: &Json) -> Result<Value, DocumentError> {
    if json.is_null() {
        return if prim.is_value_type() {
            Err(DocumentError::new(format!("null is not a valid {prim}")))
        } else {
            Ok(Value::Null)
        };
    }

    match prim {
        Primitive::Bool => json.as_bool().map(Value::Bool).ok_or_else(|| mismatch("bool", json)),
        Primitive::Text => json
            .as_str()
            .map(|s| Value::Text(s.to_string()))
            .ok_or_else(|| mismatch("string", json)),
        Primitive::Date => {
            let text = json.as_str().ok_or_else(|| mismatch("date string", json))?;
            parse_date(text).map(Value::Date)
        }
        Primitive::Blob => {
            let Json::Array(items) = json else {
                return Err(mismatch("byte array", json));
            };
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.as_u64()
                        .and_then(|b| u8::try_from(b).ok())
                        .ok_or_else(|| mismatch("byte", item).with_index(i))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Blob)
        }
        Primitive::Float32 | Primitive::Float64 => {
            let v = json.as_f64().ok_or_else(|| mismatch("number", json))?;
            if prim == Primitive::Float32 && v.abs() > f64::from(f32::MAX) {
                return Err(DocumentError::new(format!("{v} is out of range for {prim}")));
            }

            Ok(Value::Float64(v))
        }
        _ => decode_int(prim, json),
    }
}

fn decode_int(prim: Primitive, json: &Json) -> Result<Value, DocumentError> {
    if let Some((min, max)) = prim.signed_range() {
        let v = json.as_i64().ok_or_else(|| mismatch("integer", json))?;
        if v < min || v > max {
            return Err(DocumentError::new(format!("{v} is out of range for {prim}")));
        }

        return Ok(Value::Int(v));
    }
    if let Some(max) = prim.unsigned_max() {
        let v = json
            .as_u64()
            .ok_or_else(|| mismatch("unsigned integer", json))?;
        if v > max {
            return Err(DocumentError::new(format!("{v} is out of range for {prim}")));
        }

        return Ok(Value::Uint(v));
    }

    Err(DocumentError::new(format!("{prim} is not an integer type")))
}

/// Parse a map key from its JSON object-key text.
pub fn decode_key(graph: &TypeGraph, ty: &TypeRef, raw: &str) -> Result<MapKey, DocumentError> {
    let invalid = || DocumentError::new(format!("'{raw}' is not a valid {ty} key"));

    match ty.shape() {
        TypeShape::Primitive(Primitive::Text) => Ok(MapKey::Text(raw.to_string())),
        TypeShape::Primitive(Primitive::Bool) => raw.parse().map(MapKey::Bool).map_err(|_| invalid()),
        TypeShape::Primitive(prim) if prim.is_int() => {
            let value = decode_int(prim, &parse_number(raw).ok_or_else(invalid)?)?;
            MapKey::from_value(&value).ok_or_else(invalid)
        }
        TypeShape::Named(named) => match graph.resolve(named) {
            Some(def) if def.kind == TypeKind::Enum && def.variants.iter().any(|v| v == raw) => {
                Ok(MapKey::Enum(raw.to_string()))
            }
            _ => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}

fn parse_number(raw: &str) -> Option<Json> {
    if let Ok(v) = raw.parse::<u64>() {
        return Some(Json::from(v));
    }

    raw.parse::<i64>().ok().map(Json::from)
}

fn parse_date(text: &str) -> Result<Date, DocumentError> {
    let format = format_description!("[year]-[month]-[day]");

    Date::parse(text, format)
        .map_err(|err| DocumentError::new(format!("invalid date '{text}': {err}")))
}

// Untyped fallback for members whose declared type carries no shape.
fn decode_dynamic(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(v) => Value::Bool(*v),
        Json::Number(n) => n
            .as_u64()
            .map(Value::Uint)
            .or_else(|| n.as_i64().map(Value::Int))
            .unwrap_or_else(|| Value::Float64(n.as_f64().unwrap_or_default())),
        Json::String(s) => Value::Text(s.clone()),
        Json::Array(items) => Value::List(items.iter().map(decode_dynamic).collect()),
        Json::Object(entries) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| (MapKey::Text(k.clone()), decode_dynamic(v)))
                .collect(),
        ),
    }
}

fn null_or_mismatch(json: &Json, expected: &str) -> Result<Value, DocumentError> {
    if json.is_null() {
        Ok(Value::Null)
    } else {
        Err(mismatch(expected, json))
    }
}

fn mismatch(expected: &str, found: &Json) -> DocumentError {
    let found = match found {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    };

    DocumentError::new(format!("expected {expected}, found {found}"))
}

/// Encode a value as JSON. Non-finite floats encode as `null`.
#[must_use]
pub fn encode(value: &Value) -> Json {
    match value {
        Value::Blob(bytes) => Json::Array(bytes.iter().map(|b| Json::from(*b)).collect()),
        Value::Bool(v) => Json::Bool(*v),
        Value::Date(d) => format_date(*d),
        Value::Enum(v) | Value::Text(v) => Json::String(v.clone()),
        Value::Float64(v) => Number::from_f64(*v).map_or(Json::Null, Json::Number),
        Value::Int(v) => Json::from(*v),
        Value::Uint(v) => Json::from(*v),
        Value::List(items) => Json::Array(items.iter().map(encode).collect()),
        Value::Map(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), encode(v)))
                .collect::<JsonMap<_, _>>(),
        ),
        Value::Null => Json::Null,
        Value::Record(record) => Json::Object(
            record
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), encode(v)))
                .collect::<JsonMap<_, _>>(),
        ),
    }
}

// Same layout `parse_date` accepts, including signed years.
fn format_date(date: Date) -> Json {
    let format = format_description!("[year]-[month]-[day]");

    date.format(format).map_or(Json::Null, Json::String)
}
