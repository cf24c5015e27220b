//! Structural graph validation, run before any classification.

pub mod inheritance;
pub mod naming;

use crate::{
    err,
    error::ErrorTree,
    node::{TypeDef, TypeGraph, TypeKind, TypeRef, TypeShape},
};
use std::collections::BTreeSet;

/// Validate every definition in `graph`, routing problems by type path.
pub fn validate_graph(graph: &TypeGraph, errs: &mut ErrorTree) {
    // Phase 1: local, per-definition invariants.
    for (path, def) in graph.iter() {
        let mut local = ErrorTree::new();
        validate_def(path, def, &mut local);
        errs.merge_for(path, local);
    }

    // Phase 2: graph-wide invariants.
    inheritance::validate_bases(graph, errs);
}

fn validate_def(key: &str, def: &TypeDef, errs: &mut ErrorTree) {
    if key != def.path {
        err!(errs, "registered under '{key}' but declares path '{}'", def.path);
    }
    if let Err(msg) = naming::validate_type_path(&def.path) {
        errs.add(msg);
    }

    let mut generics = BTreeSet::new();
    for param in &def.generic_params {
        if let Err(msg) = naming::validate_ident(param) {
            errs.add(msg);
        }
        if !generics.insert(param.as_str()) {
            err!(errs, "duplicate generic parameter '{param}'");
        }
    }

    let mut names = BTreeSet::new();
    for member in &def.members {
        if let Err(msg) = naming::validate_member_name(&member.name) {
            errs.add(msg);
        }
        if !names.insert(member.name.as_str()) {
            err!(errs, "duplicate member '{}'", member.name);
        }
        validate_type_ref(&member.ty, errs);
    }

    for (i, ctor) in def.constructors.iter().enumerate() {
        let mut params = BTreeSet::new();
        for param in &ctor.params {
            if let Err(msg) = naming::validate_ident(&param.name) {
                err!(errs, "constructor {i}: {msg}");
            }
            if !params.insert(param.name.as_str()) {
                err!(errs, "constructor {i}: duplicate parameter '{}'", param.name);
            }
            validate_type_ref(&param.ty, errs);
        }
    }

    match def.kind {
        TypeKind::Enum => validate_enum(def, errs),
        TypeKind::Record | TypeKind::Struct | TypeKind::Interface => {
            if !def.variants.is_empty() {
                err!(errs, "only enumerations may declare variants");
            }
        }
    }
}

fn validate_enum(def: &TypeDef, errs: &mut ErrorTree) {
    if !def.members.is_empty() {
        err!(errs, "enumeration cannot declare members");
    }
    if def.base.is_some() {
        err!(errs, "enumeration cannot extend a base type");
    }

    let mut seen = BTreeSet::new();
    for variant in &def.variants {
        if let Err(msg) = naming::validate_ident(variant) {
            errs.add(msg);
        }
        if !seen.insert(variant.as_str()) {
            err!(errs, "duplicate variant '{variant}'");
        }
    }
}

// Builtin containers must carry the right number of arguments, at any depth.
fn validate_type_ref(ty: &TypeRef, errs: &mut ErrorTree) {
    if matches!(ty.shape(), TypeShape::Malformed) {
        err!(errs, "malformed type reference '{ty}'");
        return;
    }
    if ty.path.is_empty() {
        err!(errs, "type reference has an empty path");
    }

    for arg in &ty.args {
        validate_type_ref(arg, errs);
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        node::{ConstructorDef, MemberDef},
        types::Primitive,
    };

    fn text() -> TypeRef {
        TypeRef::primitive(Primitive::Text)
    }

    fn run(defs: impl IntoIterator<Item = TypeDef>) -> ErrorTree {
        let graph = TypeGraph::from_defs(defs).expect("graph should build");
        let mut errs = ErrorTree::new();
        validate_graph(&graph, &mut errs);

        errs
    }

    #[test]
    fn well_formed_graph_passes() {
        let errs = run([
            TypeDef::record("app::Base").field("id", text()),
            TypeDef::record("app::Person")
                .extends(TypeRef::named("app::Base"))
                .field("tags", TypeRef::list(text()))
                .constructor(ConstructorDef::new([("id", text())])),
            TypeDef::enumeration("app::Color", ["Red", "Green"]),
        ]);

        assert!(errs.is_empty(), "{errs}");
    }

    #[test]
    fn duplicate_and_empty_members_are_routed_by_type() {
        let errs = run([TypeDef::record("app::A")
            .field("x", text())
            .field("x", text())
            .member(MemberDef::new("", text()))]);

        assert_eq!(errs.messages_for("app::A").len(), 2);
    }

    #[test]
    fn malformed_container_is_rejected() {
        let errs = run([TypeDef::record("app::A")
            .field("bad", TypeRef::generic(crate::node::MAP_PATH, vec![text()]))]);

        assert_eq!(errs.messages_for("app::A").len(), 1);
    }

    #[test]
    fn enum_rules() {
        let errs = run([
            TypeDef::enumeration("app::Color", ["Red", "Red"]).field("x", text()),
            TypeDef::record("app::A").member(MemberDef::new("ok", text())),
        ]);

        assert_eq!(errs.messages_for("app::Color").len(), 2);
        assert!(errs.messages_for("app::A").is_empty());
    }

    #[test]
    fn enum_without_variants_is_allowed() {
        let errs = run([TypeDef::enumeration("app::Empty", Vec::<String>::new())]);

        assert!(errs.is_empty());
    }

    #[test]
    fn constructor_parameters_must_be_unique() {
        let errs = run([TypeDef::record("app::A")
            .constructor(ConstructorDef::new([("a", text()), ("a", text())]))]);

        assert_eq!(errs.messages_for("app::A").len(), 1);
    }
}
