use crate::value::{Record, Value};
use shadowpatch_schema::{
    node::{TypeGraph, TypeKind, TypeRef, TypeShape},
    types::Primitive,
};
use std::collections::BTreeSet;
use time::macros::date;

/// The value a member of type `ty` holds when nothing has been assigned.
///
/// Value-type primitives get their zero value, enumerations their first
/// variant and value-type structs a record of member defaults. Everything
/// else (reference types, nullables, containers, unknown types) is `Null`.
#[must_use]
pub fn default_for(graph: &TypeGraph, ty: &TypeRef) -> Value {
    default_inner(graph, ty, &mut BTreeSet::new())
}

fn default_inner(graph: &TypeGraph, ty: &TypeRef, active: &mut BTreeSet<TypeRef>) -> Value {
    match ty.shape() {
        TypeShape::Primitive(prim) => primitive_default(prim),
        TypeShape::Named(named) => match graph.resolve(named) {
            Some(def) if def.kind == TypeKind::Enum => {
                def.variants.first().cloned().map_or(Value::Null, Value::Enum)
            }
            Some(def) if def.kind == TypeKind::Struct => {
                // a struct cannot contain itself by value
                if !active.insert(named.clone()) {
                    return Value::Null;
                }
                let mut record = Record::new(named.clone());
                if let Ok(members) = graph.settable_members(named) {
                    for (_, member) in members {
                        let value = default_inner(graph, &member.ty, active);
                        record.set(member.name, value);
                    }
                }
                active.remove(named);

                Value::Record(record)
            }
            _ => Value::Null,
        },
        TypeShape::List(_) | TypeShape::Map(..) | TypeShape::Nullable(_) | TypeShape::Malformed => {
            Value::Null
        }
    }
}

const fn primitive_default(prim: Primitive) -> Value {
    match prim {
        Primitive::Blob | Primitive::Text => Value::Null,
        Primitive::Bool => Value::Bool(false),
        Primitive::Date => Value::Date(date!(1970-01-01)),
        Primitive::Float32 | Primitive::Float64 => Value::Float64(0.0),
        Primitive::Int8 | Primitive::Int16 | Primitive::Int32 | Primitive::Int64 => Value::Int(0),
        Primitive::Nat8 | Primitive::Nat16 | Primitive::Nat32 | Primitive::Nat64 => Value::Uint(0),
    }
}
