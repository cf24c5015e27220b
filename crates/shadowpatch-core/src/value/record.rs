use crate::value::Value;
use shadowpatch_schema::node::TypeRef;
use std::collections::BTreeMap;

///
/// Record
///
/// An instance of a record or struct type. Members not listed in `fields`
/// read as `Null`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub ty: TypeRef,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    #[must_use]
    pub const fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn named(path: &str) -> Self {
        Self::new(TypeRef::named(path))
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Current member value; missing members read as `Null`.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Value {
        self.fields.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }
}
