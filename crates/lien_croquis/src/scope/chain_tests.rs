//! Tests for scope chain management.

use super::*;
use insta::assert_snapshot;
use lien_relief::{EvaluationError, Path};
use serde_json::{json, Value};

fn global_with(value: Value) -> Scopes {
    match value {
        Value::Object(map) => Scopes::with_global(map),
        _ => Scopes::new(),
    }
}

#[test]
fn test_lookup_walks_chain() {
    let mut scopes = global_with(json!({"title": "list", "n": 1}));
    let child = scopes.child(Scopes::global()).unwrap();
    scopes.set_local(child, "n", json!(2)).unwrap();

    assert_eq!(scopes.lookup(child, "title"), Some(&json!("list")));
    assert_eq!(scopes.lookup(child, "n"), Some(&json!(2)));
    assert_eq!(scopes.lookup(Scopes::global(), "n"), Some(&json!(1)));
    assert_eq!(scopes.lookup(child, "missing"), None);
}

#[test]
fn test_owner() {
    let mut scopes = global_with(json!({"user": {"name": "a"}}));
    let child = scopes.child(Scopes::global()).unwrap();
    scopes.set_local(child, "row", json!({})).unwrap();

    assert_eq!(scopes.owner(child, "user"), Some(ScopeId::GLOBAL));
    assert_eq!(scopes.owner(child, "row"), Some(child));
    assert_eq!(scopes.owner(child, "nobody"), None);
}

#[test]
fn test_get_path_is_null_safe() {
    let scopes = global_with(json!({"a": {"b": [10, 20]}}));
    let global = Scopes::global();

    assert_eq!(scopes.get_path(global, &Path::parse("a.b.1")), json!(20));
    assert_eq!(scopes.get_path(global, &Path::parse("a.x.y.z")), Value::Null);
    assert_eq!(scopes.get_path(global, &Path::parse("nothing.here")), Value::Null);
}

#[test]
fn test_set_path_writes_to_owner() {
    let mut scopes = global_with(json!({"user": {"name": "a"}}));
    let child = scopes.child(Scopes::global()).unwrap();

    assert!(scopes
        .set_path(child, &Path::parse("user.name"), json!("b"))
        .unwrap());
    assert_eq!(
        scopes.get_path(Scopes::global(), &Path::parse("user.name")),
        json!("b")
    );
    // Unowned names land on the local scope
    scopes
        .set_path(child, &Path::parse("draft.text"), json!("hi"))
        .unwrap();
    assert_eq!(scopes.owner(child, "draft"), Some(child));
    assert_eq!(scopes.lookup(Scopes::global(), "draft"), None);
}

#[test]
fn test_set_path_creates_intermediates() {
    let mut scopes = global_with(json!({"a": null}));
    let global = Scopes::global();
    scopes
        .set_path(global, &Path::parse("a.b.c"), json!(1))
        .unwrap();
    assert_eq!(scopes.lookup(global, "a"), Some(&json!({"b": {"c": 1}})));
}

#[test]
fn test_set_path_drops_write_through_scalar() {
    let mut scopes = global_with(json!({"a": 5}));
    let global = Scopes::global();
    let written = scopes
        .set_path(global, &Path::parse("a.b"), json!(1))
        .unwrap();
    assert!(!written);
    assert_eq!(scopes.lookup(global, "a"), Some(&json!(5)));
}

#[test]
fn test_set_path_through_sequence_index() {
    let mut scopes = global_with(json!({"rows": [{"v": 1}, {"v": 2}]}));
    let global = Scopes::global();
    assert!(scopes
        .set_path(global, &Path::parse("rows.1.v"), json!(9))
        .unwrap());
    assert!(!scopes
        .set_path(global, &Path::parse("rows.5.v"), json!(9))
        .unwrap());
    assert_eq!(
        scopes.lookup(global, "rows"),
        Some(&json!([{"v": 1}, {"v": 9}]))
    );
}

#[test]
fn test_alias_writes_through() {
    let mut scopes = global_with(json!({"todos": {"a": {"done": false}}}));
    let global = Scopes::global();
    let child = scopes.child(global).unwrap();
    scopes
        .set_local(child, "todo", json!({"done": false}))
        .unwrap();
    scopes
        .set_alias(child, "todo", Alias::new(global, Path::parse("todos"), "a"))
        .unwrap();

    scopes
        .set_path(child, &Path::parse("todo.done"), json!(true))
        .unwrap();
    assert_eq!(scopes.get_path(child, &Path::parse("todo.done")), json!(true));
    assert_eq!(
        scopes.get_path(global, &Path::parse("todos.a.done")),
        json!(true)
    );
}

#[test]
fn test_alias_of_sequence_entry() {
    let mut scopes = global_with(json!({"names": ["x", "y"]}));
    let global = Scopes::global();
    let child = scopes.child(global).unwrap();
    scopes.set_local(child, "name", json!("y")).unwrap();
    scopes
        .set_alias(child, "name", Alias::new(global, Path::parse("names"), "1"))
        .unwrap();

    scopes
        .set_path(child, &Path::parse("name"), json!("z"))
        .unwrap();
    assert_eq!(scopes.lookup(global, "names"), Some(&json!(["x", "z"])));
}

#[test]
fn test_dispose() {
    let mut scopes = Scopes::new();
    let child = scopes.child(Scopes::global()).unwrap();
    let grandchild = scopes.child(child).unwrap();
    assert_eq!(scopes.live_count(), 3);

    assert!(scopes.dispose(child));
    assert!(!scopes.dispose(child));
    assert!(!scopes.dispose(Scopes::global()));
    assert!(!scopes.is_alive(child));
    assert_eq!(scopes.live_count(), 2);

    assert_eq!(
        scopes.set_local(child, "x", json!(1)),
        Err(EvaluationError::DisposedScope(child.as_u32()))
    );
    assert!(scopes.child(child).is_err());
    // Ids are not reused
    let next = scopes.child(Scopes::global()).unwrap();
    assert!(next > grandchild);
}

#[test]
fn test_as_value_flattens_chain() {
    let mut scopes = global_with(json!({"title": "t", "index": "outer"}));
    let child = scopes.child(Scopes::global()).unwrap();
    scopes.set_local(child, "index", json!(0)).unwrap();
    scopes.set_local(child, "first", json!(true)).unwrap();

    let flat = serde_json::to_string_pretty(&scopes.as_value(child)).unwrap();
    assert_snapshot!(flat, @r###"
    {
      "title": "t",
      "index": 0,
      "first": true
    }
    "###);
}
