//! Building filters through the predicate builder instead of the parser.

use json_sieve::{
    CompareOp, CompileError, JsonFilter, Number, Operand, Path, PredicateBuilder, Step, Value,
};

fn names(parts: &[&str]) -> Path {
    Path::new(parts.iter().map(|p| Step::Name(p.to_string())).collect())
}

fn num(text: &str) -> Value {
    Value::Number(Number::parse(text))
}

#[test]
fn hand_built_conjunction() {
    let mut builder = PredicateBuilder::new();
    let age = builder
        .compare(
            CompareOp::Ge,
            Operand::Path(names(&["user", "age"])),
            Operand::Constant(num("21")),
        )
        .unwrap();
    let name = builder.exists(&names(&["user", "name"]));
    let root = builder.all(vec![age, name]).unwrap();
    let mut filter = JsonFilter::from_builder(builder, root);

    assert!(filter
        .evaluate(r#"{"user": {"age": 30, "name": "x"}}"#, false)
        .unwrap());
    assert!(!filter
        .evaluate(r#"{"user": {"age": 20, "name": "x"}}"#, false)
        .unwrap());
    assert!(!filter.evaluate(r#"{"user": {"age": 30}}"#, false).unwrap());
}

#[test]
fn hand_built_path_against_path() {
    let mut builder = PredicateBuilder::new();
    let root = builder
        .compare(
            CompareOp::Eq,
            Operand::Path(Path::new(vec![Step::Index(0)])),
            Operand::Path(Path::new(vec![Step::Index(1)])),
        )
        .unwrap();
    let mut filter = JsonFilter::from_builder(builder, root);

    assert!(filter.evaluate("[7, 7]", false).unwrap());
    assert!(!filter.evaluate("[7, 8]", false).unwrap());
}

#[test]
fn hand_built_disjunction_with_nested_conjunction() {
    let mut builder = PredicateBuilder::new();
    let a = builder.exists(&names(&["a"]));
    let b = builder.exists(&names(&["b"]));
    let both = builder.all(vec![a, b]).unwrap();
    let c = builder.exists(&names(&["c"]));
    let root = builder.any(vec![both, c]).unwrap();
    let mut filter = JsonFilter::from_builder(builder, root);

    assert!(filter.evaluate(r#"{"a": 1, "b": 2}"#, false).unwrap());
    assert!(filter.evaluate(r#"{"c": null}"#, false).unwrap());
    assert!(!filter.evaluate(r#"{"a": 1}"#, false).unwrap());
}

#[test]
fn constant_only_comparison_is_a_build_error() {
    let mut builder = PredicateBuilder::new();
    let err = builder
        .compare(
            CompareOp::Eq,
            Operand::Constant(num("1")),
            Operand::Constant(Value::String("1".into())),
        )
        .unwrap_err();
    assert!(matches!(err, CompileError::ConstantComparison));
}

#[test]
fn clones_evaluate_independently() {
    let mut filter = JsonFilter::compile("@.a == 1").unwrap();
    let mut clone = filter.clone();
    assert!(filter.evaluate(r#"{"a": 1}"#, false).unwrap());
    assert!(!clone.evaluate(r#"{"a": 2}"#, false).unwrap());
    assert!(filter.evaluate(r#"{"a": 1}"#, false).unwrap());
}
