//! Runtime instance model.
//!
//! Targets and merged results are plain `Value` trees; every `Record`
//! carries the `TypeRef` it was built for so the merge engine and the
//! codec never have to guess a type.

mod default;
pub mod json;
mod key;
mod record;


pub use default::default_for;
pub use key::MapKey;
pub use record::Record;

use std::collections::BTreeMap;
use time::Date;

///
/// Value
///

#[remain::sorted]
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Blob(Vec<u8>),
    Bool(bool),
    Date(Date),

    /// Enumeration variant, by name.
    Enum(String),

    /// Every float primitive widens to f64.
    Float64(f64),

    Int(i64),
    List(Vec<Self>),

    /// Keyed map; iteration order is key order.
    Map(BTreeMap<MapKey, Self>),

    Null,
    Record(Record),
    Text(String),
    Uint(u64),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<MapKey, Self>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Short label for shape mismatch reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Blob(_) => "blob",
            Self::Bool(_) => "bool",
            Self::Date(_) => "date",
            Self::Enum(_) => "enum",
            Self::Float64(_) => "float",
            Self::Int(_) => "int",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Null => "null",
            Self::Record(_) => "record",
            Self::Text(_) => "text",
            Self::Uint(_) => "uint",
        }
    }

    /// Build a map value from `(key, value)` pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<MapKey>,
        V: Into<Self>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a list value.
    pub fn list<V: Into<Self>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    Date => Date,
    f64 => Float64,
    i32 => Int,
    i64 => Int,
    u32 => Uint,
    u64 => Uint,
    &str => Text,
    String => Text,
    Record => Record,
    Vec<u8> => Blob,
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
