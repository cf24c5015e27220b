use serde_json::json;
use shadowpatch::{
    Error, PatchAdapter, apply_patch,
    config::ShadowConfig,
    core::{
        obs::{metrics_report, metrics_reset_all},
        reader::{DocumentReader, ReaderOptions},
        registry::TypeRegistry,
        value::{Record, Value, json::encode},
    },
    error::{ErrorKind, ErrorOrigin, PatchError, RegistryErrorKind},
    schema::build::compile,
};
use shadowpatch_testing_fixtures::{
    self as fixtures, CHILD, EMPLOYEE, MONEY, MUTABLE_MONEY, PERSON,
};
use std::sync::Arc;
use time::macros::date;

fn config(roots: &[&str], extra: &str) -> ShadowConfig {
    let roots = roots
        .iter()
        .map(|r| format!("\"{r}\""))
        .collect::<Vec<_>>()
        .join(", ");

    ShadowConfig::from_toml_str(&format!("roots = [{roots}]\n{extra}")).expect("config parses")
}

fn people_adapter() -> PatchAdapter {
    PatchAdapter::from_config(fixtures::people(), &config(&[PERSON], "")).expect("adapter builds")
}

fn person() -> Record {
    Record::named(PERSON)
        .with("parent", "x")
        .with("age", 42)
        .with("nickname", "xx")
        .with(
            "child",
            Record::named(CHILD)
                .with("num", 1)
                .with("date", date!(2021-01-20)),
        )
        .with("scores", Value::map([("a", 1i64), ("b", 2), ("c", 3)]))
        .with("tags", Value::list([1i64, 2, 3, 4]))
}

#[test]
fn document_merges_with_rfc7396_semantics() {
    let adapter = people_adapter();
    let doc = json!({
        "parent": null,
        "age": null,
        "child": { "num": 5 },
        "scores": { "b": null, "c": 33, "d": 4 },
        "tags": [1, 2, 3],
    });

    let merged = adapter
        .apply_json(&fixtures::named(PERSON), &doc, Some(person()))
        .expect("patch applies");

    assert_eq!(
        encode(&Value::Record(merged)),
        json!({
            "parent": null,
            "age": 0,
            "nickname": "xx",
            "child": { "num": 5, "date": "2021-01-20" },
            "scores": { "a": 1, "c": 33, "d": 4 },
            "tags": [1, 2, 3],
        })
    );
}

#[test]
fn empty_document_changes_nothing() {
    let adapter = people_adapter();

    let merged = adapter
        .apply_str(&fixtures::named(PERSON), "{}", Some(person()))
        .expect("patch applies");

    assert_eq!(merged, person());
}

#[test]
fn applying_twice_is_idempotent() {
    let adapter = people_adapter();
    let ty = fixtures::named(PERSON);
    let doc = json!({ "nickname": "y", "scores": { "a": null, "z": 9 }, "child": { "num": 2 } });

    let once = adapter
        .apply_json(&ty, &doc, Some(person()))
        .expect("first apply");
    let twice = adapter
        .apply_json(&ty, &doc, Some(once.clone()))
        .expect("second apply");

    assert_eq!(once, twice);
}

#[test]
fn absent_target_is_built_from_the_document() {
    let adapter = people_adapter();

    let merged = adapter
        .apply_json(
            &fixtures::named(PERSON),
            &json!({ "parent": "p", "kids": [{ "num": 3 }] }),
            None,
        )
        .expect("patch applies");

    assert_eq!(merged.get("parent"), Some(&Value::Text("p".into())));
    assert_eq!(merged.get("age"), Some(&Value::Int(0)));
    assert_eq!(
        encode(merged.get("kids").expect("kids set")),
        json!([{ "num": 3, "date": "1970-01-01" }])
    );
}

#[test]
fn unregistered_type_is_a_registry_error() {
    let adapter = people_adapter();

    let err = adapter
        .apply_json(&fixtures::named("app::Nobody"), &json!({}), None)
        .expect_err("no schema for type");

    assert_eq!(err.kind, ErrorKind::Registry(RegistryErrorKind::NotFound));
    assert_eq!(err.origin, ErrorOrigin::Registry);
}

#[test]
fn malformed_documents_are_document_errors() {
    let adapter = people_adapter();
    let ty = fixtures::named(PERSON);

    let err = adapter
        .apply_str(&ty, "{ not json", None)
        .expect_err("malformed JSON");
    assert_eq!(err.kind, ErrorKind::Document);

    let err = adapter
        .apply_json(&ty, &json!({ "kids": [{ "num": "one" }] }), None)
        .expect_err("bad element");
    assert_eq!(err.kind, ErrorKind::Document);
    assert!(err.message.contains("kids[0].num"));
}

#[test]
fn configured_reader_options_apply() {
    let adapter = PatchAdapter::from_config(
        fixtures::people(),
        &config(&[PERSON], "[reader]\ndeny_unknown_fields = true"),
    )
    .expect("adapter builds");

    let err = adapter
        .apply_json(&fixtures::named(PERSON), &json!({ "bogus": 1 }), None)
        .expect_err("unknown key");

    assert_eq!(err.kind, ErrorKind::Document);
}

#[test]
fn ineligible_root_fails_the_build() {
    let err = PatchAdapter::from_config(fixtures::people(), &config(&[fixtures::SHAPE], ""))
        .expect_err("interface root");

    assert_eq!(err.kind, ErrorKind::Schema);
    assert_eq!(err.origin, ErrorOrigin::Build);
}

#[test]
fn construction_only_members_behave_like_assignable_ones() {
    let adapter = PatchAdapter::from_config(
        fixtures::money(),
        &config(&[MONEY, MUTABLE_MONEY], ""),
    )
    .expect("adapter builds");
    let doc = json!({ "amount": 10, "note": null });
    let target = |path: &str| {
        Record::named(path)
            .with("amount", 5)
            .with("currency", "USD")
            .with("note", "a")
    };

    let immutable = adapter
        .apply_json(&fixtures::named(MONEY), &doc, Some(target(MONEY)))
        .expect("money patches");
    let mutable = adapter
        .apply_json(&fixtures::named(MUTABLE_MONEY), &doc, Some(target(MUTABLE_MONEY)))
        .expect("mutable money patches");

    assert_eq!(immutable.fields, mutable.fields);
    assert_eq!(
        encode(&Value::Record(immutable)),
        json!({ "amount": 10, "currency": "USD", "note": null })
    );
}

#[test]
fn inherited_members_are_patchable() {
    let adapter = PatchAdapter::from_config(fixtures::employees(), &config(&[EMPLOYEE], ""))
        .expect("adapter builds");

    let merged = adapter
        .apply_json(
            &fixtures::named(EMPLOYEE),
            &json!({ "id": "e1", "title": "eng", "level": 3, "manager": { "title": "cto" } }),
            None,
        )
        .expect("employee patches");

    assert_eq!(
        encode(&Value::Record(merged)),
        json!({
            "id": "e1",
            "title": "eng",
            "level": 3,
            "manager": { "id": null, "title": "cto", "level": 0, "manager": null },
        })
    );
}

#[test]
fn adapter_emits_read_and_merge_metrics() {
    metrics_reset_all();
    let adapter = people_adapter();

    adapter
        .apply_json(&fixtures::named(PERSON), &json!({ "age": 1 }), None)
        .expect("patch applies");

    let ops = metrics_report().counters.ops;
    assert_eq!(ops.documents_read, 1);
    assert_eq!(ops.merge_calls, 1);
    assert_eq!(ops.fields_applied, 1);
}

#[test]
fn apply_patch_maps_merge_errors() {
    let set = Arc::new(compile(fixtures::people(), &fixtures::roots(&[PERSON])).expect("compiles"));
    let mut registry = TypeRegistry::new();
    registry.register_set(Arc::clone(&set)).expect("registers");
    let person = registry.require(&fixtures::named(PERSON)).expect("registered");
    let child = registry.require(&fixtures::named(CHILD)).expect("registered");

    let shadow = DocumentReader::new(&set, ReaderOptions::default())
        .read(child.id(), &json!({ "num": 1 }))
        .expect("child reads");

    let err: Error = apply_patch(&set, person.descriptor(), &shadow, None)
        .expect_err("child shadow cannot patch a person");

    assert_eq!(err.kind, ErrorKind::Patch(PatchError::SchemaMismatch));
}
