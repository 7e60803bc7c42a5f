//! Compiled filter: the embedding entry point.

use json_sieve_expr::{Expr, QueryParser};
use json_sieve_reader::{JsonReader, ReadError, TokenRead};
use log::debug;

use crate::cursor::Cursor;
use crate::eval;
use crate::index::PathIndex;
use crate::predicate::{CompileError, PredicateBuilder, PredicateTree, PredId};

/// A compiled boolean filter, reusable across any number of documents.
///
/// Evaluation takes `&mut self`: internal per-pass state is rewound before
/// each document. To evaluate in parallel, give each thread its own clone.
#[derive(Debug, Clone)]
pub struct JsonFilter {
    index: PathIndex,
    tree: PredicateTree,
    cursor: Cursor,
}

impl JsonFilter {
    /// Compiles a filter expression, e.g. `@.a.b[2] == 5 && @.c`.
    pub fn compile(expression: &str) -> Result<Self, CompileError> {
        let expr = QueryParser::parse(expression)?;
        Self::from_expr(&expr)
    }

    /// Compiles an already-parsed expression.
    pub fn from_expr(expr: &Expr) -> Result<Self, CompileError> {
        let mut builder = PredicateBuilder::new();
        let root = builder.build_expr(expr)?;
        Ok(Self::from_builder(builder, root))
    }

    /// Assembles a filter from a programmatically built predicate tree.
    /// `root` is the id the whole filter resolves through.
    pub fn from_builder(builder: PredicateBuilder, root: PredId) -> Self {
        let (index, tree) = builder.finish(root);
        let cursor = Cursor::new(index.max_steps() + 1);
        debug!(
            "compiled filter: {} predicate nodes, {} path nodes, {} counter levels",
            tree.len(),
            index.len(),
            index.max_steps() + 1
        );
        Self { index, tree, cursor }
    }

    /// Evaluates against one document. Lenient mode relaxes the accepted
    /// JSON syntax (unquoted names, single quotes, trailing commas).
    pub fn evaluate(&mut self, document: &str, lenient: bool) -> Result<bool, ReadError> {
        let mut reader = JsonReader::new(document, lenient);
        self.evaluate_tokens(&mut reader)
    }

    /// Evaluates against raw bytes, validating UTF-8 first.
    pub fn evaluate_bytes(&mut self, document: &[u8], lenient: bool) -> Result<bool, ReadError> {
        let mut reader = JsonReader::from_slice(document, lenient)?;
        self.evaluate_tokens(&mut reader)
    }

    /// Evaluates against any token source. The reader is left wherever the
    /// pass stopped, which may be before the end of the document.
    pub fn evaluate_tokens<R: TokenRead>(&mut self, reader: &mut R) -> Result<bool, ReadError> {
        self.tree.reset();
        self.cursor.reset();
        eval::run(reader, &self.index, &mut self.tree, &mut self.cursor)
    }
}
