use super::*;
use crate::{
    obs::{metrics_report, metrics_reset_all},
    patch::MergeEngine,
    value::Record,
};
use serde_json::json;
use shadowpatch_schema::build::compile;
use shadowpatch_testing_fixtures::{self as fixtures, CHILD, NODE_A, PERSON};

fn people() -> SchemaSet {
    compile(fixtures::people(), &fixtures::roots(&[PERSON])).expect("people should compile")
}

fn person_id(set: &SchemaSet) -> SchemaId {
    set.id_of(&fixtures::named(PERSON)).expect("person compiled")
}

fn read(set: &SchemaSet, json: &Json) -> Result<ShadowInstance, DocumentError> {
    DocumentReader::new(set, ReaderOptions::default()).read(person_id(set), json)
}

fn slot<'a>(set: &SchemaSet, instance: &'a ShadowInstance, name: &str) -> Option<&'a ShadowValue> {
    let schema = &set[instance.schema];
    let index = schema.field(name)?.presence_index;

    instance.is_present(index).then(|| &instance.values[index])
}

#[test]
fn presence_follows_keys_not_values() {
    let set = people();
    let instance = read(&set, &json!({ "parent": null, "age": 5 })).expect("document reads");

    assert_eq!(slot(&set, &instance, "parent"), Some(&ShadowValue::Null));
    assert_eq!(
        slot(&set, &instance, "age"),
        Some(&ShadowValue::Value(Value::Int(5)))
    );
    assert_eq!(slot(&set, &instance, "nickname"), None);
    assert_eq!(instance.presence.count(), 2);
}

#[test]
fn empty_document_marks_nothing_present() {
    let set = people();
    let instance = read(&set, &json!({})).expect("document reads");

    assert!(instance.presence.iter().next().is_none());
    assert_eq!(instance.values.len(), set[instance.schema].field_count());
}

#[test]
fn containers_read_as_deltas() {
    let set = people();
    let child = &set[set.id_of(&fixtures::named(CHILD)).expect("child compiled")];
    let doc = json!({
        "child": { "num": 3 },
        "scores": { "a": 1, "b": null },
        "friends": { "amy": { "date": "2020-02-02" }, "bob": null },
        "kids": [{ "num": 1 }, null],
        "tags": [1, 2],
    });

    let instance = read(&set, &doc).expect("document reads");

    let nested = ShadowInstance::new(child).with(child, "num", Value::Int(3));
    assert_eq!(
        slot(&set, &instance, "child"),
        Some(&ShadowValue::Object(Box::new(nested)))
    );
    assert_eq!(
        slot(&set, &instance, "scores"),
        Some(&ShadowValue::ScalarMap(BTreeMap::from([
            (MapKey::from("a"), Value::Int(1)),
            (MapKey::from("b"), Value::Null),
        ])))
    );
    let Some(ShadowValue::ObjectMap(friends)) = slot(&set, &instance, "friends") else {
        panic!("friends should read as an object map");
    };
    assert!(friends[&MapKey::from("amy")].is_some());
    assert!(friends[&MapKey::from("bob")].is_none());
    let Some(ShadowValue::ObjectList(kids)) = slot(&set, &instance, "kids") else {
        panic!("kids should read as an object list");
    };
    assert_eq!(kids.len(), 2);
    assert!(kids[1].is_none());
    assert_eq!(
        slot(&set, &instance, "tags"),
        Some(&ShadowValue::Value(Value::list([1i64, 2])))
    );
}

#[test]
fn opaque_and_unknown_keys_are_ignored_by_default() {
    let set = people();
    let instance = read(&set, &json!({ "shape": { "sides": 3 }, "bogus": 1 }))
        .expect("document reads");

    assert_eq!(instance.presence.count(), 0);
}

#[test]
fn deny_unknown_fields_rejects_strangers_but_not_opaque_members() {
    let set = people();
    let reader = DocumentReader::new(
        &set,
        ReaderOptions {
            deny_unknown_fields: true,
            ..ReaderOptions::default()
        },
    );

    assert!(reader
        .read(person_id(&set), &json!({ "shape": { "sides": 3 } }))
        .is_ok());

    let err = reader
        .read(person_id(&set), &json!({ "child": { "bogus": 1 } }))
        .expect_err("unknown nested key");
    assert_eq!(err.path, "child.bogus");
}

#[test]
fn type_errors_carry_paths() {
    let set = people();

    let err = read(&set, &json!({ "age": "old" })).expect_err("string age");
    assert_eq!(err.path, "age");

    let err = read(&set, &json!({ "kids": [{ "num": 1 }, { "num": "x" }] })).expect_err("bad kid");
    assert_eq!(err.path, "kids[1].num");

    let err = read(&set, &json!({ "friends": { "amy": { "date": "nope" } } }))
        .expect_err("bad date");
    assert_eq!(err.path, "friends.amy.date");

    let err = read(&set, &json!({ "color": "Purple" })).expect_err("bad variant");
    assert_eq!(err.path, "color");
}

#[test]
fn root_must_be_an_object() {
    let set = people();

    let err = read(&set, &json!([1, 2])).expect_err("array root");

    assert!(err.path.is_empty());
    assert_eq!(err.message, "expected object for 'app::Person', found array");
}

#[test]
fn nesting_beyond_limit_is_rejected() {
    let set = compile(fixtures::cyclic(), &fixtures::roots(&[NODE_A])).expect("compiles");
    let id = set.id_of(&fixtures::named(NODE_A)).expect("A compiled");
    let reader = DocumentReader::new(
        &set,
        ReaderOptions {
            max_depth: 2,
            ..ReaderOptions::default()
        },
    );

    assert!(reader.read(id, &json!({ "b": { "a": { "label": "ok" } } })).is_ok());

    let err = reader
        .read(id, &json!({ "b": { "a": { "b": {} } } }))
        .expect_err("too deep");
    assert_eq!(err.path, "b.a.b");
}

#[test]
fn read_str_reports_malformed_json() {
    let set = people();
    let reader = DocumentReader::new(&set, ReaderOptions::default());

    let err = reader
        .read_str(person_id(&set), "{ \"age\": ")
        .expect_err("truncated document");

    assert!(err.message.starts_with("malformed JSON"));
}

#[test]
fn reads_and_rejections_are_counted() {
    metrics_reset_all();
    let set = people();

    read(&set, &json!({ "age": 1, "parent": "p" })).expect("document reads");
    read(&set, &json!({ "age": "x" })).expect_err("bad age");

    let ops = metrics_report().counters.ops;
    assert_eq!(ops.documents_read, 1);
    assert_eq!(ops.documents_rejected, 1);
    assert_eq!(ops.fields_present, 2);
}

#[test]
fn document_then_merge_applies_map_delta() {
    let set = people();
    let id = person_id(&set);
    let target = Record::named(PERSON)
        .with("parent", "x")
        .with("scores", Value::map([("a", 1i64), ("b", 2), ("c", 3)]));

    let shadow = read(&set, &json!({ "scores": { "b": null, "c": 33, "d": 4 } }))
        .expect("document reads");
    let merged = MergeEngine::new(&set)
        .apply_id(id, &shadow, Some(target))
        .expect("merge succeeds");

    assert_eq!(
        merged.get("scores"),
        Some(&Value::map([("a", 1i64), ("c", 33), ("d", 4)]))
    );
    assert_eq!(merged.get("parent"), Some(&Value::Text("x".into())));
}
