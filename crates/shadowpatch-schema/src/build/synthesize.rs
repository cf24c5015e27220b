use crate::{
    build::SchemaBuildError,
    classify::{Classification, Classifier},
    closure::ClosureEntry,
    node::{MemberDescriptor, TypeRef},
    shadow::{MergeStrategy, SchemaId, ShadowField, ShadowSchemaDescriptor, ShadowType},
};
use std::collections::BTreeMap;

/// Build the shadow schema descriptor for one closure type.
///
/// `ids` must hold a reserved id for every closure type; nested strategies
/// refer to other schemas only through those ids.
pub fn synthesize(
    classifier: &Classifier<'_>,
    ty: &TypeRef,
    entry: &ClosureEntry,
    ids: &BTreeMap<TypeRef, SchemaId>,
) -> Result<ShadowSchemaDescriptor, SchemaBuildError> {
    let id = lookup_id(ty, ty, ids)?;

    let mut fields = Vec::with_capacity(entry.members.len());
    for member in &entry.members {
        let Some((shadow_type, strategy)) = shadow_for(classifier, ty, member, ids)? else {
            continue;
        };

        fields.push(ShadowField {
            member: member.clone(),
            presence_index: fields.len(),
            shadow_type,
            strategy,
        });
    }

    Ok(ShadowSchemaDescriptor {
        id,
        source_type: ty.clone(),
        members: entry.members.clone(),
        fields,
        constructor: entry.constructor.clone(),
    })
}

// Representation + strategy for a member; `None` for opaque members.
fn shadow_for(
    classifier: &Classifier<'_>,
    owner: &TypeRef,
    member: &MemberDescriptor,
    ids: &BTreeMap<TypeRef, SchemaId>,
) -> Result<Option<(ShadowType, MergeStrategy)>, SchemaBuildError> {
    let declared = &member.declared_type;

    let pair = match &member.classification {
        Classification::Opaque => return Ok(None),

        Classification::Scalar => (ShadowType::Same(declared.clone()), MergeStrategy::Assign),

        Classification::ScalarNeedsNullable => (
            ShadowType::Nullable(declared.clone()),
            MergeStrategy::AssignOrDefault,
        ),

        Classification::Nested(target) => {
            let id = lookup_id(owner, target, ids)?;
            (ShadowType::Shadow(id), MergeStrategy::Nested(id))
        }

        Classification::MapOfScalar { key, value } => (
            ShadowType::Map {
                key: key.clone(),
                value: Box::new(map_scalar_value(classifier, value)),
            },
            MergeStrategy::MapOfScalar,
        ),

        Classification::MapOfPatchable { key, value } => {
            let id = lookup_id(owner, value, ids)?;
            (
                ShadowType::Map {
                    key: key.clone(),
                    value: Box::new(ShadowType::Shadow(id)),
                },
                MergeStrategy::MapOfPatchable(id),
            )
        }

        Classification::ListOfPatchable(elem) => {
            let id = lookup_id(owner, elem, ids)?;
            (
                ShadowType::List(Box::new(ShadowType::Shadow(id))),
                MergeStrategy::ListOfPatchable(id),
            )
        }

        Classification::ListOfScalar(_) => {
            (ShadowType::Same(declared.clone()), MergeStrategy::ReplaceList)
        }
    };

    Ok(Some(pair))
}

// Map values are read as value-or-null; null already means "remove", so
// non-nullable value types (primitives, enums, value structs) are wrapped.
fn map_scalar_value(classifier: &Classifier<'_>, value: &TypeRef) -> ShadowType {
    if !value.is_nullable() && classifier.is_value_type(value) {
        ShadowType::Nullable(value.clone())
    } else {
        ShadowType::Same(value.clone())
    }
}

fn lookup_id(
    owner: &TypeRef,
    target: &TypeRef,
    ids: &BTreeMap<TypeRef, SchemaId>,
) -> Result<SchemaId, SchemaBuildError> {
    ids.get(target)
        .copied()
        .ok_or_else(|| SchemaBuildError::Invariant {
            ty: owner.clone(),
            message: format!("no schema reserved for '{target}'"),
        })
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        closure::resolve,
        node::{ConstructorDef, TypeDef, TypeGraph},
        types::Primitive,
    };
    use std::collections::BTreeSet;

    fn prim(p: Primitive) -> TypeRef {
        TypeRef::primitive(p)
    }

    fn named(path: &str) -> TypeRef {
        TypeRef::named(path)
    }

    fn build(graph: &TypeGraph, root: &str) -> Vec<ShadowSchemaDescriptor> {
        let classifier = Classifier::new(graph);
        let closure =
            resolve(&classifier, &BTreeSet::from([named(root)])).expect("closure resolves");
        let ids: BTreeMap<_, _> = closure
            .order()
            .iter()
            .enumerate()
            .map(|(i, ty)| (ty.clone(), SchemaId::new(u32::try_from(i).unwrap())))
            .collect();

        closure
            .order()
            .iter()
            .map(|ty| {
                synthesize(&classifier, ty, closure.entry(ty).unwrap(), &ids)
                    .expect("synthesizes")
            })
            .collect()
    }

    fn graph() -> TypeGraph {
        TypeGraph::from_defs([
            TypeDef::record("app::Entity").field("id", prim(Primitive::Text)),
            TypeDef::record("app::Person")
                .extends(named("app::Entity"))
                .field("name", prim(Primitive::Text))
                .field("age", prim(Primitive::Int32))
                .field("nickname", TypeRef::nullable(prim(Primitive::Int32)))
                .field("child", named("app::Child"))
                .field("scores", TypeRef::map(prim(Primitive::Text), prim(Primitive::Int64)))
                .field("friends", TypeRef::map(prim(Primitive::Text), named("app::Child")))
                .field("kids", TypeRef::list(named("app::Child")))
                .field("tags", TypeRef::list(prim(Primitive::Text)))
                .field("shape", named("app::Shape")),
            TypeDef::record("app::Child").field("num", prim(Primitive::Int32)),
            TypeDef::interface("app::Shape"),
        ])
        .expect("graph should build")
    }

    #[test]
    fn strategies_follow_classification() {
        let graph = graph();
        let schemas = build(&graph, "app::Person");
        let person = &schemas[0];
        let child_id = schemas[1].id;

        let strategies: Vec<_> = person
            .fields
            .iter()
            .map(|f| (f.name().to_string(), f.strategy))
            .collect();

        assert_eq!(
            strategies,
            vec![
                ("name".to_string(), MergeStrategy::Assign),
                ("age".to_string(), MergeStrategy::AssignOrDefault),
                ("nickname".to_string(), MergeStrategy::Assign),
                ("child".to_string(), MergeStrategy::Nested(child_id)),
                ("scores".to_string(), MergeStrategy::MapOfScalar),
                ("friends".to_string(), MergeStrategy::MapOfPatchable(child_id)),
                ("kids".to_string(), MergeStrategy::ListOfPatchable(child_id)),
                ("tags".to_string(), MergeStrategy::ReplaceList),
                ("id".to_string(), MergeStrategy::Assign),
            ]
        );
    }

    #[test]
    fn presence_indexes_are_dense_and_skip_opaque() {
        let graph = graph();
        let schemas = build(&graph, "app::Person");
        let person = &schemas[0];

        assert_eq!(person.members.len(), 10);
        assert_eq!(person.fields.len(), 9);
        for (i, field) in person.fields.iter().enumerate() {
            assert_eq!(field.presence_index, i);
        }
        assert!(person.field("shape").is_none());
    }

    #[test]
    fn shadow_types_wrap_value_scalars() {
        let graph = graph();
        let schemas = build(&graph, "app::Person");
        let person = &schemas[0];

        assert_eq!(
            person.field("age").map(|f| &f.shadow_type),
            Some(&ShadowType::Nullable(prim(Primitive::Int32)))
        );
        assert_eq!(
            person.field("scores").map(|f| &f.shadow_type),
            Some(&ShadowType::Map {
                key: prim(Primitive::Text),
                value: Box::new(ShadowType::Nullable(prim(Primitive::Int64))),
            })
        );
    }

    #[test]
    fn map_values_of_value_types_are_wrapped() {
        let graph = TypeGraph::from_defs([
            TypeDef::record("app::Palette")
                .field("weights", TypeRef::map(prim(Primitive::Text), named("app::Color")))
                .field(
                    "fallbacks",
                    TypeRef::map(prim(Primitive::Text), TypeRef::nullable(named("app::Color"))),
                )
                .field("labels", TypeRef::map(prim(Primitive::Text), prim(Primitive::Text))),
            TypeDef::enumeration("app::Color", ["Red", "Green"]),
        ])
        .expect("graph should build");

        let schemas = build(&graph, "app::Palette");
        let palette = &schemas[0];
        let value_of = |name: &str| match palette.field(name).map(|f| &f.shadow_type) {
            Some(ShadowType::Map { value, .. }) => (**value).clone(),
            other => panic!("'{name}' is not a map: {other:?}"),
        };

        assert_eq!(value_of("weights"), ShadowType::Nullable(named("app::Color")));
        assert_eq!(
            value_of("fallbacks"),
            ShadowType::Same(TypeRef::nullable(named("app::Color")))
        );
        assert_eq!(value_of("labels"), ShadowType::Same(prim(Primitive::Text)));
    }

    #[test]
    fn synthesis_is_repeatable() {
        let graph = graph();

        assert_eq!(build(&graph, "app::Person"), build(&graph, "app::Person"));
    }

    #[test]
    fn greediest_constructor_plan_is_carried() {
        let graph = TypeGraph::from_defs([TypeDef::record("app::Money")
            .init_field("amount", prim(Primitive::Int64))
            .init_field("currency", prim(Primitive::Text))
            .constructor(ConstructorDef::new([
                ("amount", prim(Primitive::Int64)),
                ("currency", prim(Primitive::Text)),
            ]))])
        .expect("graph should build");

        let schemas = build(&graph, "app::Money");

        assert_eq!(schemas[0].constructor.params.len(), 2);
        assert!(schemas[0].has_immutable_fields());
        assert_eq!(schemas[0].immutable_fields().count(), 2);
    }
}
