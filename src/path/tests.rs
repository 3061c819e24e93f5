//! Tests for the path walker

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

// ============================================================================
// DottedPath Tests
// ============================================================================

#[test]
fn test_parse_valid_path() {
    let path = DottedPath::parse("sampleData.users.nodes").unwrap();
    assert_eq!(path.as_str(), "sampleData.users.nodes");
    assert_eq!(path.segments(), &["sampleData", "users", "nodes"]);
    assert_eq!(path.to_string(), "sampleData.users.nodes");
}

#[test]
fn test_parse_trims_segments() {
    let path = DottedPath::parse(" users. edges .node ").unwrap();
    assert_eq!(path.segments(), &["users", "edges", "node"]);
    assert_eq!(path.as_str(), "users.edges.node");
    assert_eq!(path, DottedPath::parse("users.edges.node").unwrap());

    let tree = json!({"a": {"b": 1}});
    assert_eq!(resolve(&tree, "a. b").found().map(|r| r.to_value()), Some(json!(1)));
}

#[test_case(""; "empty")]
#[test_case("   "; "blank")]
#[test_case("a..b"; "empty middle segment")]
#[test_case(".a"; "leading dot")]
#[test_case("a."; "trailing dot")]
fn test_parse_rejects(raw: &str) {
    assert!(DottedPath::parse(raw).is_none());
}

// ============================================================================
// Resolution Tests
// ============================================================================

#[test]
fn test_resolve_nested_objects() {
    let tree = json!({"a": {"b": {"c": 42}}});
    let resolved = resolve(&tree, "a.b.c").found().unwrap();
    assert_eq!(resolved.as_node(), Some(&json!(42)));
    assert_eq!(resolved.to_value(), json!(42));
}

#[test]
fn test_resolve_maps_over_array() {
    let tree = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
    let resolved = resolve(&tree, "a.b.c").found().unwrap();
    assert!(resolved.as_node().is_none());
    assert_eq!(resolved.to_value(), json!([1, 2]));
}

#[test]
fn test_resolve_path_ending_on_array_returns_the_array() {
    let tree = json!({"data": {"items": [{"id": 1}, {"id": 2}]}});
    let resolved = resolve(&tree, "data.items").found().unwrap();
    assert_eq!(resolved.as_node(), Some(&json!([{"id": 1}, {"id": 2}])));
}

#[test]
fn test_resolve_through_nested_arrays() {
    let tree = json!({
        "sampleData": {
            "users": [
                {"nodes": [{"id": 1}, {"id": 2}]},
                {"nodes": [{"id": 3}]}
            ]
        }
    });

    let resolved = resolve(&tree, "sampleData.users.nodes").found().unwrap();
    assert_eq!(
        resolved.to_value(),
        json!([[{"id": 1}, {"id": 2}], [{"id": 3}]])
    );

    let leaves = resolved.leaves();
    assert_eq!(leaves.len(), 2);
    assert_eq!(leaves[0], &json!([{"id": 1}, {"id": 2}]));

    let ids = resolve(&tree, "sampleData.users.nodes.id").found().unwrap();
    assert_eq!(ids.to_value(), json!([[1, 2], [3]]));
}

#[test]
fn test_resolve_skips_elements_missing_the_rest_of_the_path() {
    let tree = json!({"items": [{"c": 1}, {"other": true}, {"c": 3}]});
    let resolved = resolve(&tree, "items.c").found().unwrap();
    assert_eq!(resolved.to_value(), json!([1, 3]));
}

#[test]
fn test_resolve_empty_array_is_found() {
    let tree = json!({"items": []});
    let resolved = resolve(&tree, "items.c").found().unwrap();
    assert_eq!(resolved.to_value(), json!([]));
    assert!(resolved.leaves().is_empty());
}

#[test]
fn test_resolve_null_leaf_is_found() {
    let tree = json!({"a": {"b": null}});
    let resolved = resolve(&tree, "a.b").found().unwrap();
    assert_eq!(resolved.as_node(), Some(&json!(null)));
}

// ============================================================================
// NotFound Tests
// ============================================================================

#[test]
fn test_missing_leaf_reports_parent_found() {
    let tree = json!({"a": {"b": {}}});
    match resolve(&tree, "a.b.c") {
        Lookup::NotFound(miss) => {
            assert_eq!(miss.segment, "c");
            assert_eq!(miss.depth, 2);
            assert!(miss.parent_found());
        }
        Lookup::Found(found) => panic!("unexpected match: {found:?}"),
    }
}

#[test]
fn test_missing_root_reports_parent_absent() {
    let tree = json!({"data": {}});
    match resolve(&tree, "sampleData.users") {
        Lookup::NotFound(miss) => {
            assert_eq!(miss.segment, "sampleData");
            assert_eq!(miss.depth, 0);
            assert!(!miss.parent_found());
        }
        Lookup::Found(found) => panic!("unexpected match: {found:?}"),
    }
}

#[test]
fn test_scalar_in_the_middle_is_not_found() {
    let tree = json!({"a": 5});
    assert!(!resolve(&tree, "a.b").is_found());

    let tree = json!({"a": null});
    assert!(!resolve(&tree, "a.b").is_found());
}

#[test]
fn test_array_where_no_element_matches_is_not_found() {
    let tree = json!({"items": [{"x": 1}, {"y": 2}]});
    match resolve(&tree, "items.z") {
        Lookup::NotFound(miss) => {
            assert_eq!(miss.segment, "z");
            assert!(miss.parent_found());
        }
        Lookup::Found(found) => panic!("unexpected match: {found:?}"),
    }
}

#[test]
fn test_invalid_path_never_resolves() {
    let tree = json!({"a": {"": 1}});
    assert!(!resolve(&tree, "a.").is_found());
}
