use crate::{
    error::ErrorTree,
    node::{TypeGraph, TypeKind, TypeShape},
};
use std::collections::BTreeSet;

/// Every declared base must resolve to a record or struct with matching
/// generic arity, and no chain may loop back on itself.
pub fn validate_bases(graph: &TypeGraph, errs: &mut ErrorTree) {
    for (path, def) in graph.iter() {
        let Some(base) = &def.base else {
            continue;
        };

        if !matches!(base.shape(), TypeShape::Named(_)) {
            errs.add_for(path, format!("base '{base}' is not a user type"));
            continue;
        }

        let Some(base_def) = graph.resolve(base) else {
            errs.add_for(path, format!("base type '{base}' not found"));
            continue;
        };

        match base_def.kind {
            TypeKind::Record | TypeKind::Struct => {}
            TypeKind::Enum | TypeKind::Interface => {
                errs.add_for(path, format!("base '{base}' must be a record or struct"));
            }
        }
        if base_def.generic_params.len() != base.args.len() {
            errs.add_for(
                path,
                format!(
                    "base '{base}' expects {} type arguments",
                    base_def.generic_params.len()
                ),
            );
        }

        if loops(graph, path) {
            errs.add_for(path, "inheritance chain is cyclic");
        }
    }
}

fn loops(graph: &TypeGraph, start: &str) -> bool {
    let mut seen = BTreeSet::new();
    let mut current = Some(start);

    while let Some(path) = current {
        if !seen.insert(path) {
            return true;
        }
        current = graph
            .get(path)
            .and_then(|def| def.base.as_ref())
            .map(|base| base.path.as_str());
    }

    false
}
