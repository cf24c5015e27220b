use crate::value::{Record, default_for};
use shadowpatch_schema::{node::TypeGraph, shadow::ShadowSchemaDescriptor};

/// Fresh instance for an absent target, as the schema's constructor plan
/// would build it with every parameter defaulted.
pub(crate) fn construct(graph: &TypeGraph, schema: &ShadowSchemaDescriptor) -> Record {
    let mut record = Record::new(schema.source_type.clone());

    // Phase 1: settable members start at their type default.
    for member in &schema.members {
        record.set(member.name.clone(), default_for(graph, &member.declared_type));
    }

    // Phase 2: greediest-constructor parameters initialise their members.
    for param in &schema.constructor.params {
        if let Some(member) = &param.member {
            record.set(member.clone(), default_for(graph, &param.ty));
        }
    }

    record
}
