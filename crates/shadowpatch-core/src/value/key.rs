use crate::value::Value;
use derive_more::Display;

///
/// MapKey
///
/// The keyable subset of `Value`. Maps key on these so ordering and
/// equality are total.
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MapKey {
    Bool(bool),
    Enum(String),
    Int(i64),
    Text(String),
    Uint(u64),
}

impl MapKey {
    /// Narrow a runtime value to a key, if it is keyable.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(Self::Bool(*v)),
            Value::Enum(v) => Some(Self::Enum(v.clone())),
            Value::Int(v) => Some(Self::Int(*v)),
            Value::Text(v) => Some(Self::Text(v.clone())),
            Value::Uint(v) => Some(Self::Uint(*v)),
            _ => None,
        }
    }
}

impl From<MapKey> for Value {
    fn from(key: MapKey) -> Self {
        match key {
            MapKey::Bool(v) => Self::Bool(v),
            MapKey::Enum(v) => Self::Enum(v),
            MapKey::Int(v) => Self::Int(v),
            MapKey::Text(v) => Self::Text(v),
            MapKey::Uint(v) => Self::Uint(v),
        }
    }
}

impl From<&str> for MapKey {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for MapKey {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for MapKey {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for MapKey {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<bool> for MapKey {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}
