use crate::{classify::Classification, node::TypeRef};
use serde::{Deserialize, Serialize};

///
/// MemberAccess
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum MemberAccess {
    /// Settable at any time after construction.
    #[default]
    Assignable,

    /// Only settable while the instance is being constructed.
    InitOnly,

    /// Computed or private; never settable, never shadowed.
    ReadOnly,
}

impl MemberAccess {
    #[must_use]
    pub const fn is_settable(self) -> bool {
        !matches!(self, Self::ReadOnly)
    }
}

///
/// MemberDef
///
/// A member as declared on a type definition.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MemberDef {
    pub name: String,
    pub ty: TypeRef,

    #[serde(default)]
    pub access: MemberAccess,
}

impl MemberDef {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            access: MemberAccess::Assignable,
        }
    }

    #[must_use]
    pub fn init_only(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            access: MemberAccess::InitOnly,
            ..Self::new(name, ty)
        }
    }

    #[must_use]
    pub fn read_only(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            access: MemberAccess::ReadOnly,
            ..Self::new(name, ty)
        }
    }
}

///
/// MemberDescriptor
///
/// One settable member of a source type after classification.
/// Identity is `(owner, name)`.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MemberDescriptor {
    /// Type the member is declared on (a base type for inherited members).
    pub owner: TypeRef,
    pub name: String,
    pub declared_type: TypeRef,
    pub immutable_construction_only: bool,
    pub is_value_type: bool,
    pub is_explicitly_nullable: bool,
    pub classification: Classification,
}

impl MemberDescriptor {
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        matches!(self.classification, Classification::Opaque)
    }

    #[must_use]
    pub fn identity(&self) -> (&TypeRef, &str) {
        (&self.owner, self.name.as_str())
    }
}
