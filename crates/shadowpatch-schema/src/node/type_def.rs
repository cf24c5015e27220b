use crate::node::{MemberDef, TypeRef};
use serde::{Deserialize, Serialize};
use std::ops::Not;

///
/// TypeKind
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TypeKind {
    /// Reference-type record; instances may be absent (null).
    #[default]
    Record,

    /// Value-type record; instances always hold a value.
    Struct,

    Enum,
    Interface,
}

impl TypeKind {
    #[must_use]
    pub const fn is_value_type(self) -> bool {
        matches!(self, Self::Struct | Self::Enum)
    }
}

///
/// ConstructorParam
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ConstructorParam {
    pub name: String,
    pub ty: TypeRef,
}

///
/// ConstructorDef
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ConstructorDef {
    #[serde(default)]
    pub params: Vec<ConstructorParam>,

    #[serde(default = "accessible_default")]
    pub accessible: bool,
}

const fn accessible_default() -> bool {
    true
}

impl ConstructorDef {
    #[must_use]
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = (S, TypeRef)>,
        S: Into<String>,
    {
        Self {
            params: params
                .into_iter()
                .map(|(name, ty)| ConstructorParam {
                    name: name.into(),
                    ty,
                })
                .collect(),
            accessible: true,
        }
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.accessible = false;
        self
    }

    #[must_use]
    pub const fn arity(&self) -> usize {
        self.params.len()
    }
}

///
/// TypeDef
///
/// Declarative description of one source type. A definition with no
/// declared constructors has an implicit, accessible zero-argument one.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypeDef {
    pub path: String,

    #[serde(default)]
    pub kind: TypeKind,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub is_abstract: bool,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub is_anonymous: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_params: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<TypeRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<ConstructorDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
}

impl TypeDef {
    fn with_kind(path: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            path: path.into(),
            kind,
            is_abstract: false,
            is_anonymous: false,
            generic_params: Vec::new(),
            base: None,
            members: Vec::new(),
            constructors: Vec::new(),
            variants: Vec::new(),
        }
    }

    #[must_use]
    pub fn record(path: impl Into<String>) -> Self {
        Self::with_kind(path, TypeKind::Record)
    }

    #[must_use]
    pub fn value_struct(path: impl Into<String>) -> Self {
        Self::with_kind(path, TypeKind::Struct)
    }

    #[must_use]
    pub fn interface(path: impl Into<String>) -> Self {
        Self::with_kind(path, TypeKind::Interface)
    }

    #[must_use]
    pub fn enumeration<I, S>(path: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variants: variants.into_iter().map(Into::into).collect(),
            ..Self::with_kind(path, TypeKind::Enum)
        }
    }

    #[must_use]
    pub fn member(mut self, member: MemberDef) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn field(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.member(MemberDef::new(name, ty))
    }

    #[must_use]
    pub fn init_field(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.member(MemberDef::init_only(name, ty))
    }

    #[must_use]
    pub fn constructor(mut self, ctor: ConstructorDef) -> Self {
        self.constructors.push(ctor);
        self
    }

    #[must_use]
    pub fn extends(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub fn generics<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generic_params = params.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[must_use]
    pub const fn anonymous(mut self) -> Self {
        self.is_anonymous = true;
        self
    }

    /// Constructors usable for instantiation, the implicit default included.
    #[must_use]
    pub fn usable_constructors(&self) -> Vec<ConstructorDef> {
        if self.constructors.is_empty() {
            return vec![ConstructorDef::new(Vec::<(String, TypeRef)>::new())];
        }

        self.constructors
            .iter()
            .filter(|ctor| ctor.accessible)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn get_member(&self, name: &str) -> Option<&MemberDef> {
        self.members.iter().find(|m| m.name == name)
    }
}
