//! Filter expression AST.

/// One navigation step within a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Object member access: `.name`, `."quoted name"`
    Name(String),
    /// Array element access: `[2]`, `.[2]`
    Index(u32),
}

/// An ordered, immutable sequence of steps locating a value, relative to the
/// document root. An empty path is the document itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    pub steps: Vec<Step>,
}

impl Path {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }
}

/// Literal operand. Numbers keep their lexical form; the engine decides how
/// to interpret them.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(String),
    Bool(bool),
    Null,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq, // ==
    Ne, // !=
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=
}

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And, // &&
    Or,  // ||
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum OperandExpr {
    Path(Path),
    Literal(Literal),
}

/// A filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `left OP right`; at least one side is a path.
    Compare {
        op: CompareOp,
        left: OperandExpr,
        right: OperandExpr,
    },
    /// Bare path: true iff the path is reached in the document.
    Exists(Path),
    /// N-ary `&&`/`||` chain; same-operator runs are flattened.
    Logical { op: LogicalOp, operands: Vec<Expr> },
}
