use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// Primitive
///
/// Builtin scalar types. A `TypeRef` whose path is one of these names (and
/// carries no type arguments) is a primitive, never a graph definition.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[remain::sorted]
pub enum Primitive {
    Blob,
    Bool,
    Date,
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Int64,
    Nat8,
    Nat16,
    Nat32,
    Nat64,
    Text,
}

impl Primitive {
    pub const ALL: [Self; 14] = [
        Self::Blob,
        Self::Bool,
        Self::Date,
        Self::Float32,
        Self::Float64,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Nat8,
        Self::Nat16,
        Self::Nat32,
        Self::Nat64,
        Self::Text,
    ];

    /// Value types always hold a value; their shadow representation needs
    /// an explicit nullable wrapper to tell "absent" from "default".
    #[must_use]
    pub const fn is_value_type(self) -> bool {
        !matches!(self, Self::Blob | Self::Text)
    }

    // can this primitive key a map
    #[must_use]
    pub const fn is_keyable(self) -> bool {
        self.is_int() || matches!(self, Self::Bool | Self::Text)
    }

    #[must_use]
    pub const fn is_signed_int(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    #[must_use]
    pub const fn is_unsigned_int(self) -> bool {
        matches!(self, Self::Nat8 | Self::Nat16 | Self::Nat32 | Self::Nat64)
    }

    #[must_use]
    pub const fn is_int(self) -> bool {
        self.is_signed_int() || self.is_unsigned_int()
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Inclusive signed range for signed integer primitives.
    #[must_use]
    pub const fn signed_range(self) -> Option<(i64, i64)> {
        match self {
            Self::Int8 => Some((i8::MIN as i64, i8::MAX as i64)),
            Self::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            Self::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            Self::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Inclusive upper bound for unsigned integer primitives.
    #[must_use]
    pub const fn unsigned_max(self) -> Option<u64> {
        match self {
            Self::Nat8 => Some(u8::MAX as u64),
            Self::Nat16 => Some(u16::MAX as u64),
            Self::Nat32 => Some(u32::MAX as u64),
            Self::Nat64 => Some(u64::MAX),
            _ => None,
        }
    }

    /// Resolve a bare type path to a primitive (exact, case-sensitive).
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|prim| prim.to_string() == path)
    }
}

///
/// TESTS
///
