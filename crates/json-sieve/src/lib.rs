//! Streaming boolean filter engine for JSON documents.
//!
//! Compiles a filter expression such as `@.a.b[2] == 5 && @.c` once, then
//! evaluates it against documents consumed as a single forward token stream.
//! No document tree is built: subtrees the expression does not reference are
//! skipped in one unit, and the pass stops as soon as the outcome is known.
//! Cost scales with the referenced paths, not with document size.
//!
//! # Example
//!
//! ```
//! use json_sieve::JsonFilter;
//!
//! let mut filter = JsonFilter::compile(r#"@.user.age >= 21 && @.user.name == "ada""#)?;
//! assert!(filter.evaluate(r#"{"user": {"name": "ada", "age": 36}}"#, false)?);
//! assert!(!filter.evaluate(r#"{"user": {"name": "bob", "age": 50}}"#, false)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Paths start at the document root (`@`) and navigate with `.name` and
//! `[index]` steps; a bare path tests existence. Comparisons are total
//! across types, and a path that never materializes resolves its leaf to
//! false at the end of the document.

mod value;
pub use value::{Number, Value};

mod index;
pub use index::PathIndex;

mod cursor;

mod predicate;
pub use predicate::{
    CompileError, Operand, PredicateBuilder, PredicateTree, PredId, Receiver, Side,
};

mod eval;

mod filter;
pub use filter::JsonFilter;

pub use json_sieve_expr::{
    CompareOp, Expr, Literal, LogicalOp, OperandExpr, ParseError, Path, QueryParser, Step,
};
pub use json_sieve_reader::{JsonReader, ReadError, Token, TokenRead};
