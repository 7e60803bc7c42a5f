//! Filter expression language for json-sieve.
//!
//! Parses boolean filter expressions over JSON documents, e.g.
//! `@.a.b[2] == 5 && @.c`, into an AST the engine compiles into a streaming
//! predicate. A path starts at the document root (`@`) and navigates with
//! `.name` and `[index]` steps; leaves compare a path against a literal or
//! another path, or test a path for existence.
//!
//! # Example
//!
//! ```
//! use json_sieve_expr::{QueryParser, Expr};
//!
//! let expr = QueryParser::parse("@.user.age >= 21 && @.user.name").unwrap();
//! assert!(matches!(expr, Expr::Logical { .. }));
//! ```

mod types;
pub use types::*;

mod parser;
pub use parser::{ParseError, QueryParser};
