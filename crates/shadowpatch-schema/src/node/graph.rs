use crate::{
    build::SchemaBuildError,
    node::{MemberDef, NodeError, TypeDef, TypeRef},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

///
/// TypeGraph
///
/// All known type definitions, keyed by path. Read-only once compilation
/// starts.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypeGraph {
    #[serde(default)]
    types: BTreeMap<String, TypeDef>,
}

impl TypeGraph {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// Build a graph from definitions, rejecting duplicate paths.
    pub fn from_defs(defs: impl IntoIterator<Item = TypeDef>) -> Result<Self, NodeError> {
        let mut graph = Self::new();
        for def in defs {
            graph.insert(def)?;
        }

        Ok(graph)
    }

    pub fn insert(&mut self, def: TypeDef) -> Result<(), NodeError> {
        if self.types.contains_key(&def.path) {
            return Err(NodeError::DuplicateType { path: def.path });
        }
        self.types.insert(def.path.clone(), def);

        Ok(())
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&TypeDef> {
        self.types.get(path)
    }

    #[must_use]
    pub fn resolve(&self, ty: &TypeRef) -> Option<&TypeDef> {
        self.get(&ty.path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDef)> {
        self.types.iter().map(|(path, def)| (path.as_str(), def))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Settable members of `ty`, own members first, then each base type's
    /// own members walking up the chain. A base member hidden by a
    /// same-named member further down is skipped. Generic parameters are
    /// substituted at every level.
    pub fn settable_members(
        &self,
        ty: &TypeRef,
    ) -> Result<Vec<(TypeRef, MemberDef)>, SchemaBuildError> {
        let mut out: Vec<(TypeRef, MemberDef)> = Vec::new();
        let mut seen_names = BTreeSet::new();
        let mut seen_types = BTreeSet::new();
        let mut current = Some(ty.clone());

        while let Some(level) = current.take() {
            if !seen_types.insert(level.path.clone()) {
                return Err(SchemaBuildError::InheritanceCycle { ty: ty.clone() });
            }
            let Some(def) = self.resolve(&level) else {
                break;
            };

            for member in &def.members {
                // hidden names are skipped even when read-only
                if !seen_names.insert(member.name.clone()) || !member.access.is_settable() {
                    continue;
                }
                let mut member = member.clone();
                member.ty = member.ty.substitute(&def.generic_params, &level.args);
                out.push((level.clone(), member));
            }

            current = def
                .base
                .as_ref()
                .map(|base| base.substitute(&def.generic_params, &level.args));
        }

        Ok(out)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;

    fn text() -> TypeRef {
        TypeRef::primitive(Primitive::Text)
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let err = TypeGraph::from_defs([TypeDef::record("app::A"), TypeDef::record("app::A")])
            .expect_err("duplicate path should fail");

        assert_eq!(
            err,
            NodeError::DuplicateType {
                path: "app::A".to_string()
            }
        );
    }

    #[test]
    fn base_members_are_appended_after_declared_members() {
        let graph = TypeGraph::from_defs([
            TypeDef::record("app::Base")
                .field("id", text())
                .field("name", text()),
            TypeDef::record("app::Derived")
                .extends(TypeRef::named("app::Base"))
                .field("extra", text())
                .field("name", text())
                .member(MemberDef::read_only("computed", text())),
        ])
        .expect("graph should build");

        let members = graph
            .settable_members(&TypeRef::named("app::Derived"))
            .expect("members should flatten");
        let names: Vec<_> = members.iter().map(|(_, m)| m.name.as_str()).collect();
        let owners: Vec<_> = members.iter().map(|(o, _)| o.path.as_str()).collect();

        assert_eq!(names, vec!["extra", "name", "id"]);
        assert_eq!(owners, vec!["app::Derived", "app::Derived", "app::Base"]);
    }

    #[test]
    fn inheritance_cycle_is_reported() {
        let graph = TypeGraph::from_defs([
            TypeDef::record("app::A").extends(TypeRef::named("app::B")),
            TypeDef::record("app::B").extends(TypeRef::named("app::A")),
        ])
        .expect("graph should build");

        let err = graph
            .settable_members(&TypeRef::named("app::A"))
            .expect_err("cycle should fail");

        assert!(matches!(err, SchemaBuildError::InheritanceCycle { .. }));
    }

    #[test]
    fn generic_members_are_substituted() {
        let graph = TypeGraph::from_defs([TypeDef::record("app::Page")
            .generics(["T"])
            .field("items", TypeRef::list(TypeRef::named("T")))])
        .expect("graph should build");

        let page = TypeRef::generic("app::Page", vec![TypeRef::named("app::Line")]);
        let members = graph.settable_members(&page).expect("members should flatten");

        assert_eq!(members[0].1.ty, TypeRef::list(TypeRef::named("app::Line")));
        assert_eq!(members[0].0, page);
    }

    #[test]
    fn graph_loads_from_json() {
        let json = r#"{
            "types": {
                "app::Person": {
                    "path": "app::Person",
                    "members": [
                        { "name": "name", "ty": { "path": "Text" } },
                        { "name": "id", "ty": { "path": "Text" }, "access": "InitOnly" }
                    ],
                    "constructors": [
                        { "params": [{ "name": "id", "ty": { "path": "Text" } }] }
                    ]
                }
            }
        }"#;

        let graph: TypeGraph = serde_json::from_str(json).expect("graph should parse");
        let person = graph.get("app::Person").expect("person defined");

        assert_eq!(person.members.len(), 2);
        assert!(person.constructors[0].accessible);
        assert_eq!(
            person.get_member("id").map(|m| m.access),
            Some(crate::node::MemberAccess::InitOnly)
        );
    }
}
