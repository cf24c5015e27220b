//! Shadow instances: a presence vector plus one value slot per shadow
//! field. Built by the document reader, read (never written) by the merge
//! engine.

mod presence;

pub use presence::PresenceVector;

use crate::value::{MapKey, Value};
use shadowpatch_schema::shadow::{SchemaId, ShadowSchemaDescriptor};
use std::collections::BTreeMap;

///
/// ShadowValue
///
/// The payload of one shadow field. Which variant is valid depends on the
/// field's merge strategy.
///

#[derive(Clone, Debug, PartialEq)]
pub enum ShadowValue {
    /// Explicit null.
    Null,

    /// Scalar or whole-list value.
    Value(Value),

    /// Nested shadow instance.
    Object(Box<ShadowInstance>),

    /// Key → value delta; a `Null` value removes the key.
    ScalarMap(BTreeMap<MapKey, Value>),

    /// Key → nested delta; `None` removes the key.
    ObjectMap(BTreeMap<MapKey, Option<ShadowInstance>>),

    /// Replacement list; `None` elements stay null.
    ObjectList(Vec<Option<ShadowInstance>>),
}

impl ShadowValue {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Value(_) => "value",
            Self::Object(_) => "object",
            Self::ScalarMap(_) => "scalar map",
            Self::ObjectMap(_) => "object map",
            Self::ObjectList(_) => "object list",
        }
    }
}

impl From<Value> for ShadowValue {
    fn from(value: Value) -> Self {
        if value.is_null() {
            Self::Null
        } else {
            Self::Value(value)
        }
    }
}

impl From<ShadowInstance> for ShadowValue {
    fn from(instance: ShadowInstance) -> Self {
        Self::Object(Box::new(instance))
    }
}

///
/// ShadowInstance
///

#[derive(Clone, Debug, PartialEq)]
pub struct ShadowInstance {
    pub schema: SchemaId,
    pub presence: PresenceVector,
    pub values: Vec<ShadowValue>,
}

impl ShadowInstance {
    /// Empty instance for `schema`: nothing present, every slot `Null`.
    #[must_use]
    pub fn new(schema: &ShadowSchemaDescriptor) -> Self {
        let len = schema.field_count();

        Self {
            schema: schema.id,
            presence: PresenceVector::new(len),
            values: vec![ShadowValue::Null; len],
        }
    }

    /// Store a value and mark the slot present.
    pub fn set(&mut self, index: usize, value: ShadowValue) -> bool {
        if !self.store(index, value) {
            return false;
        }

        self.presence.set(index)
    }

    /// Store a value without touching presence.
    pub fn store(&mut self, index: usize, value: ShadowValue) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Set a field by member name. Returns false for unknown or opaque names.
    pub fn set_field(
        &mut self,
        schema: &ShadowSchemaDescriptor,
        name: &str,
        value: impl Into<ShadowValue>,
    ) -> bool {
        schema
            .field(name)
            .is_some_and(|field| self.set(field.presence_index, value.into()))
    }

    /// Builder-style `set_field`. `name` must be a shadow field of `schema`;
    /// debug builds panic otherwise.
    #[must_use]
    pub fn with(
        mut self,
        schema: &ShadowSchemaDescriptor,
        name: &str,
        value: impl Into<ShadowValue>,
    ) -> Self {
        let applied = self.set_field(schema, name, value);
        debug_assert!(
            applied,
            "'{name}' is not a shadow field of '{}'",
            schema.source_type
        );

        self
    }

    #[must_use]
    pub fn is_present(&self, index: usize) -> bool {
        self.presence.is_set(index)
    }

    #[must_use]
    pub fn value(&self, index: usize) -> Option<&ShadowValue> {
        self.values.get(index)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use shadowpatch_schema::{build::compile, shadow::SchemaSet};
    use shadowpatch_testing_fixtures::{self as fixtures, PERSON};

    fn people() -> SchemaSet {
        compile(fixtures::people(), &fixtures::roots(&[PERSON])).expect("people should compile")
    }

    #[test]
    fn set_field_rejects_unknown_and_opaque_names() {
        let set = people();
        let schema = &set[set.id_of(&fixtures::named(PERSON)).expect("person compiled")];
        let mut instance = ShadowInstance::new(schema);

        assert!(!instance.set_field(schema, "missing", Value::Int(1)));
        assert!(!instance.set_field(schema, "shape", Value::Text("circle".into())));
        assert_eq!(instance.presence.count(), 0);

        let instance = instance.with(schema, "age", Value::Int(4));
        let index = schema.field("age").expect("age is a field").presence_index;
        assert!(instance.is_present(index));
        assert_eq!(instance.value(index), Some(&ShadowValue::Value(Value::Int(4))));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "'missing' is not a shadow field of 'app::Person'")]
    fn with_panics_on_unknown_name_in_debug() {
        let set = people();
        let schema = &set[set.id_of(&fixtures::named(PERSON)).expect("person compiled")];

        let _ = ShadowInstance::new(schema).with(schema, "missing", Value::Int(1));
    }
}
