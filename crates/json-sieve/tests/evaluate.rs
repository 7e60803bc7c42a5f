//! End-to-end evaluation over strict JSON documents.

use json_sieve::JsonFilter;

fn eval(expression: &str, document: &str) -> bool {
    JsonFilter::compile(expression)
        .unwrap()
        .evaluate(document, false)
        .unwrap()
}

#[test]
fn member_comparison() {
    assert!(eval("@.a == 5", r#"{"a": 5}"#));
    assert!(!eval("@.a == 5", r#"{"a": 6}"#));
    assert!(eval("@.a != 5", r#"{"a": 6}"#));
}

#[test]
fn missing_paths_default_to_false() {
    assert!(!eval("@.missing == 5", "{}"));
    // the default applies to the leaf, not to the comparison
    assert!(!eval("@.missing != 5", "{}"));
    assert!(!eval("@.missing <= 5", "{}"));
    assert!(!eval("@.missing", "{}"));
}

#[test]
fn comparisons_are_typed() {
    assert!(!eval("@.a == 5", r#"{"a": "5"}"#));
    assert!(eval("@.a != 5", r#"{"a": "5"}"#));
    assert!(eval("@.a != 1", r#"{"a": true}"#));
    assert!(eval("@.a == null", r#"{"a": null}"#));
    assert!(!eval("@.a == null", r#"{"a": 1}"#));
    assert!(eval("@.a != null", r#"{"a": 1}"#));
}

#[test]
fn null_orders_weakly_from_the_left() {
    assert!(eval("@.a <= 0", r#"{"a": null}"#));
    assert!(eval("@.a >= \"x\"", r#"{"a": null}"#));
    assert!(!eval("@.a < 0", r#"{"a": null}"#));
    assert!(!eval("@.a > 0", r#"{"a": null}"#));
    assert!(!eval("@.a <= null", r#"{"a": 5}"#));
    assert!(eval("@.a <= null", r#"{"a": null}"#));
}

#[test]
fn numbers_compare_numerically() {
    assert!(eval("@.a == 5.0", r#"{"a": 5}"#));
    assert!(eval("@.a == 5e0", r#"{"a": 5}"#));
    assert!(eval("@.a < 1e2", r#"{"a": 99.5}"#));
    assert!(eval("@.a > 2", r#"{"a": 10}"#));
    assert!(eval("@.a == 1e100", r#"{"a": 1e100}"#));
}

#[test]
fn strings_compare_lexically() {
    assert!(eval("@.a < \"2\"", r#"{"a": "10"}"#));
    assert!(eval("@.a >= \"abc\"", r#"{"a": "abd"}"#));
}

#[test]
fn array_indexing() {
    let doc = "[1, 2, 2, 4, 5]";
    assert!(eval("@[1] > @[0]", doc));
    assert!(eval("@[1] == @[2]", doc));
    assert!(!eval("@[0] > @[1]", doc));
    assert!(eval("@[4] == 5", doc));
    assert!(!eval("@[5]", doc));
}

#[test]
fn nested_paths() {
    let doc = r#"[1, {"a": 1, "c": [1, 2, 3]}, 3]"#;
    assert!(eval("@[1].c.[1]", doc));
    assert!(!eval("@[1].c.[3]", doc));
    assert!(eval("@[1].c[1] == 2", doc));
    assert!(eval("@[1].a == 1 && @[2] == 3", doc));
}

#[test]
fn quoted_member_names() {
    assert!(eval("@.\"odd name\" == 1", r#"{"odd name": 1}"#));
}

#[test]
fn root_scalar_documents() {
    assert!(eval("@ == 5", "5"));
    assert!(!eval("@ == 5", "6"));
    assert!(eval("@", "null"));
    assert!(eval("@ == \"x\"", r#""x""#));
}

#[test]
fn container_valued_paths_never_satisfy_comparisons() {
    assert!(!eval("@.a == 5", r#"{"a": {"x": 1}}"#));
    assert!(!eval("@.a == 5", r#"{"a": [5]}"#));
    // but existence holds
    assert!(eval("@.a", r#"{"a": {"x": 1}}"#));
}

#[test]
fn a_path_can_be_both_compared_and_descended() {
    let filter = "@.a == 5 || @.a.b == 1";
    assert!(eval(filter, r#"{"a": 5}"#));
    assert!(eval(filter, r#"{"a": {"b": 1}}"#));
    assert!(!eval(filter, r#"{"a": {"b": 2}}"#));
}

#[test]
fn and_binds_tighter_than_or() {
    let filter = "@.a == 1 || @.b == 1 && @.c == 1";
    assert!(eval(filter, r#"{"a": 1, "b": 0, "c": 0}"#));
    assert!(eval(filter, r#"{"a": 0, "b": 1, "c": 1}"#));
    assert!(!eval(filter, r#"{"a": 0, "b": 1, "c": 0}"#));
}

#[test]
fn parentheses_group() {
    let filter = "(@.a || @.b) && @.c";
    assert!(eval(filter, r#"{"b": 1, "c": 1}"#));
    assert!(!eval(filter, r#"{"c": 1}"#));
    assert!(!eval(filter, r#"{"a": 1, "b": 1}"#));
}

#[test]
fn irrelevant_subtrees_are_skipped() {
    let doc = r#"{"a": {"huge": [1, 2, {"x": [[], {"y": null}]}]}, "z": 1}"#;
    assert!(eval("@.z == 1", doc));
}

#[test]
fn a_compiled_filter_is_reusable() {
    let mut filter = JsonFilter::compile("@.a == 1").unwrap();
    assert!(filter.evaluate(r#"{"a": 1}"#, false).unwrap());
    assert!(!filter.evaluate(r#"{"a": 2}"#, false).unwrap());
    assert!(filter.evaluate(r#"{"a": 1}"#, false).unwrap());
}

#[test]
fn reuse_resets_array_counters() {
    let mut filter = JsonFilter::compile("@[1] == 2").unwrap();
    assert!(filter.evaluate("[0, 2]", false).unwrap());
    assert!(!filter.evaluate("[2, 0]", false).unwrap());
    assert!(filter.evaluate("[0, 2]", false).unwrap());
}

#[test]
fn resolution_stops_the_pass_before_trailing_input() {
    // everything after the deciding value is never read
    let mut filter = JsonFilter::compile("@[0] == 1").unwrap();
    assert!(filter.evaluate("[1, THIS IS NOT JSON", false).unwrap());

    let mut filter = JsonFilter::compile("@.a == 1").unwrap();
    assert!(filter.evaluate(r#"{"a": 1, "b": NOT JSON"#, false).unwrap());
}

#[test]
fn a_false_conjunct_settles_the_whole_tree() {
    // the false first member cancels the pending siblings, so the pass ends
    // before the truncation is ever reached
    let mut filter = JsonFilter::compile("@.a == 1 && @.b == 2 && @.c == 3").unwrap();
    assert!(!filter.evaluate(r#"{"a": 0"#, false).unwrap());

    // a disjunction stays pending after the false member and must read on
    let mut filter = JsonFilter::compile("@.a == 1 || @.b == 2").unwrap();
    assert!(filter.evaluate(r#"{"a": 0"#, false).is_err());
}

#[test]
fn unresolved_passes_still_report_malformed_documents() {
    let mut filter = JsonFilter::compile("@[1] == 1").unwrap();
    assert!(filter.evaluate("[1, oops", false).is_err());

    let mut filter = JsonFilter::compile("@.a == 1").unwrap();
    assert!(filter.evaluate(r#"{"a": }"#, false).is_err());
}

#[test]
fn evaluate_bytes_validates_utf8() {
    let mut filter = JsonFilter::compile("@.a == 1").unwrap();
    assert!(filter.evaluate_bytes(br#"{"a": 1}"#, false).unwrap());
    assert!(filter.evaluate_bytes(&[0x7b, 0xFF, 0x7d], false).is_err());
}

#[test]
fn compile_errors() {
    assert!(JsonFilter::compile("5 == 6").is_err());
    assert!(JsonFilter::compile("@.a ==").is_err());
    assert!(JsonFilter::compile("").is_err());
    assert!(JsonFilter::compile("@.a == 5 extra").is_err());
}
