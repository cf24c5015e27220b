//! Type-graph fixtures shared by the core and facade test suites.
//!
//! Every fixture is a plain `TypeGraph`; callers compile it with the roots
//! they need.

use shadowpatch_schema::{
    node::{ConstructorDef, MemberDef, TypeDef, TypeGraph, TypeRef},
    types::Primitive,
};
use std::collections::BTreeSet;

pub const PERSON: &str = "app::Person";
pub const CHILD: &str = "app::Child";
pub const COLOR: &str = "app::Color";
pub const SHAPE: &str = "app::Shape";

pub const MONEY: &str = "app::Money";
pub const MUTABLE_MONEY: &str = "app::MutableMoney";
pub const LEDGER: &str = "app::Ledger";

pub const ENTITY: &str = "app::Entity";
pub const EMPLOYEE: &str = "app::Employee";

pub const NODE_A: &str = "app::A";
pub const NODE_B: &str = "app::B";

#[must_use]
pub fn prim(p: Primitive) -> TypeRef {
    TypeRef::primitive(p)
}

#[must_use]
pub fn named(path: &str) -> TypeRef {
    TypeRef::named(path)
}

/// Root set from type paths.
#[must_use]
pub fn roots(paths: &[&str]) -> BTreeSet<TypeRef> {
    paths.iter().map(|path| named(path)).collect()
}

/// A person with one member per classification, plus the types it uses.
#[must_use]
pub fn people() -> TypeGraph {
    let text = prim(Primitive::Text);

    graph([
        TypeDef::record(PERSON)
            .field("parent", text.clone())
            .field("age", prim(Primitive::Int32))
            .field("nickname", TypeRef::nullable(text.clone()))
            .field("lucky", TypeRef::nullable(prim(Primitive::Int32)))
            .field("color", named(COLOR))
            .field("child", named(CHILD))
            .field("scores", TypeRef::map(text.clone(), prim(Primitive::Int64)))
            .field("friends", TypeRef::map(text.clone(), named(CHILD)))
            .field("kids", TypeRef::list(named(CHILD)))
            .field("tags", TypeRef::list(prim(Primitive::Int32)))
            .field("shape", named(SHAPE))
            .member(MemberDef::read_only("display_name", text)),
        TypeDef::record(CHILD)
            .field("num", prim(Primitive::Int32))
            .field("date", prim(Primitive::Date)),
        TypeDef::enumeration(COLOR, ["Red", "Green", "Blue"]),
        TypeDef::interface(SHAPE),
    ])
}

/// The same money shape twice: construction-only and plain assignable.
#[must_use]
pub fn money() -> TypeGraph {
    let amount = prim(Primitive::Int64);
    let currency = prim(Primitive::Text);

    graph([
        TypeDef::record(MONEY)
            .init_field("amount", amount.clone())
            .init_field("currency", currency.clone())
            .field("note", prim(Primitive::Text))
            .constructor(ConstructorDef::new([
                ("amount", amount.clone()),
                ("currency", currency.clone()),
            ])),
        TypeDef::record(MUTABLE_MONEY)
            .field("amount", amount)
            .field("currency", currency)
            .field("note", prim(Primitive::Text)),
        TypeDef::record(LEDGER)
            .field("balance", named(MONEY))
            .field("entries", TypeRef::list(named(MONEY))),
    ])
}

/// A derived type whose base contributes members.
#[must_use]
pub fn employees() -> TypeGraph {
    let text = prim(Primitive::Text);

    graph([
        TypeDef::record(ENTITY)
            .field("id", text.clone())
            .field("title", text.clone()),
        TypeDef::record(EMPLOYEE)
            .extends(named(ENTITY))
            .field("title", text.clone())
            .field("manager", named(EMPLOYEE))
            .field("level", prim(Primitive::Nat8)),
    ])
}

/// Two records referencing each other.
#[must_use]
pub fn cyclic() -> TypeGraph {
    graph([
        TypeDef::record(NODE_A)
            .field("b", named(NODE_B))
            .field("label", prim(Primitive::Text)),
        TypeDef::record(NODE_B)
            .field("a", named(NODE_A))
            .field("weight", prim(Primitive::Float64)),
    ])
}

fn graph(defs: impl IntoIterator<Item = TypeDef>) -> TypeGraph {
    TypeGraph::from_defs(defs).expect("fixture type paths are unique")
}
