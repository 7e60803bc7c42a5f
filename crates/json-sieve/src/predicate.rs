//! Predicate tree: incremental boolean resolution over delivered scalars.
//!
//! Nodes live in an arena and point upward; resolving a leaf climbs the
//! parent chain, short-circuiting composites as soon as their outcome is
//! determined. Every node resolves at most once per pass.

use json_sieve_expr::{CompareOp, Expr, Literal, LogicalOp, OperandExpr, ParseError, Path};
use thiserror::Error;

use crate::index::PathIndex;
use crate::value::Value;

pub type PredId = usize;

/// Which comparison side a delivered scalar feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Delivery endpoint stored in the path trie.
#[derive(Debug, Clone, Copy)]
pub struct Receiver {
    pub pred: PredId,
    pub side: Side,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("comparison needs a path on at least one side")]
    ConstantComparison,
    #[error("logical operator needs at least one operand")]
    EmptyLogical,
    #[error("predicate node already belongs to another logical operator")]
    ReusedChild,
}

/// One comparison side: a constant bound at compile time, or a write-once
/// cell filled by the first scalar found at the bound path.
#[derive(Debug, Clone)]
enum Slot {
    Constant(Value),
    Streamed(Option<Value>),
}

impl Slot {
    fn get(&self) -> Option<&Value> {
        match self {
            Slot::Constant(v) => Some(v),
            Slot::Streamed(v) => v.as_ref(),
        }
    }

    fn set(&mut self, value: Value) {
        if let Slot::Streamed(cell) = self {
            if cell.is_none() {
                *cell = Some(value);
            }
        }
    }

    fn reset(&mut self) {
        if let Slot::Streamed(cell) = self {
            *cell = None;
        }
    }
}

#[derive(Debug, Clone)]
enum PredKind {
    Compare {
        op: CompareOp,
        left: Slot,
        right: Slot,
    },
    Exists,
    All(Vec<PredId>),
    Any(Vec<PredId>),
}

#[derive(Debug, Clone)]
struct PredNode {
    parent: Option<PredId>,
    /// Still pending this pass; flips to false exactly once.
    needed: bool,
    value: bool,
    kind: PredKind,
}

/// One side of a comparison, for programmatic construction.
#[derive(Debug, Clone)]
pub enum Operand {
    Path(Path),
    Constant(Value),
}

impl Operand {
    pub fn literal(literal: &Literal) -> Self {
        Operand::Constant(Value::from_literal(literal))
    }
}

/// Builds a predicate tree and its path index together. Leaves register
/// their paths as they are created; composites adopt previously built nodes.
#[derive(Debug, Default)]
pub struct PredicateBuilder {
    index: PathIndex,
    nodes: Vec<PredNode>,
    leaves: Vec<PredId>,
}

impl PredicateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compare(
        &mut self,
        op: CompareOp,
        left: Operand,
        right: Operand,
    ) -> Result<PredId, CompileError> {
        if matches!((&left, &right), (Operand::Constant(_), Operand::Constant(_))) {
            return Err(CompileError::ConstantComparison);
        }
        let id = self.nodes.len();
        let left = self.bind(left, Receiver { pred: id, side: Side::Left });
        let right = self.bind(right, Receiver { pred: id, side: Side::Right });
        self.nodes.push(PredNode {
            parent: None,
            needed: true,
            value: false,
            kind: PredKind::Compare { op, left, right },
        });
        self.leaves.push(id);
        Ok(id)
    }

    pub fn exists(&mut self, path: &Path) -> PredId {
        let id = self.nodes.len();
        self.index.register_visitor(path, id);
        self.nodes.push(PredNode {
            parent: None,
            needed: true,
            value: false,
            kind: PredKind::Exists,
        });
        self.leaves.push(id);
        id
    }

    pub fn all(&mut self, children: Vec<PredId>) -> Result<PredId, CompileError> {
        self.composite(PredKind::All(children))
    }

    pub fn any(&mut self, children: Vec<PredId>) -> Result<PredId, CompileError> {
        self.composite(PredKind::Any(children))
    }

    fn composite(&mut self, kind: PredKind) -> Result<PredId, CompileError> {
        let children = match &kind {
            PredKind::All(c) | PredKind::Any(c) => c.clone(),
            _ => unreachable!(),
        };
        if children.is_empty() {
            return Err(CompileError::EmptyLogical);
        }
        let id = self.nodes.len();
        self.nodes.push(PredNode {
            parent: None,
            needed: true,
            value: false,
            kind,
        });
        for child in children {
            if self.nodes[child].parent.is_some() {
                return Err(CompileError::ReusedChild);
            }
            self.nodes[child].parent = Some(id);
        }
        Ok(id)
    }

    fn bind(&mut self, operand: Operand, receiver: Receiver) -> Slot {
        match operand {
            Operand::Constant(value) => Slot::Constant(value),
            Operand::Path(path) => {
                self.index.register_receiver(&path, receiver);
                Slot::Streamed(None)
            }
        }
    }

    /// Translates a parsed expression, returning the id of its root node.
    pub fn build_expr(&mut self, expr: &Expr) -> Result<PredId, CompileError> {
        match expr {
            Expr::Compare { op, left, right } => {
                self.compare(*op, Self::operand(left), Self::operand(right))
            }
            Expr::Exists(path) => Ok(self.exists(path)),
            Expr::Logical { op, operands } => {
                let children = operands
                    .iter()
                    .map(|e| self.build_expr(e))
                    .collect::<Result<Vec<_>, _>>()?;
                match op {
                    LogicalOp::And => self.all(children),
                    LogicalOp::Or => self.any(children),
                }
            }
        }
    }

    fn operand(operand: &OperandExpr) -> Operand {
        match operand {
            OperandExpr::Path(path) => Operand::Path(path.clone()),
            OperandExpr::Literal(literal) => Operand::literal(literal),
        }
    }

    pub fn finish(self, root: PredId) -> (PathIndex, PredicateTree) {
        (
            self.index,
            PredicateTree {
                nodes: self.nodes,
                root,
                leaves: self.leaves,
            },
        )
    }
}

#[derive(Debug, Clone)]
pub struct PredicateTree {
    nodes: Vec<PredNode>,
    root: PredId,
    /// Leaves in construction order, for end-of-document defaulting.
    leaves: Vec<PredId>,
}

impl PredicateTree {
    /// False once the root has resolved; the pass can stop.
    pub fn needs_more(&self) -> bool {
        self.nodes[self.root].needed
    }

    pub fn result(&self) -> bool {
        self.nodes[self.root].value
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Feeds a scalar into one comparison side. Resolves the comparison once
    /// both sides are known; later deliveries to a resolved node are ignored.
    pub fn deliver(&mut self, receiver: Receiver, value: &Value) {
        let node = &mut self.nodes[receiver.pred];
        if !node.needed {
            return;
        }
        let PredKind::Compare { op, left, right } = &mut node.kind else {
            panic!("scalar delivered to a non-comparison predicate");
        };
        match receiver.side {
            Side::Left => left.set(value.clone()),
            Side::Right => right.set(value.clone()),
        }
        let outcome = match (left.get(), right.get()) {
            (Some(l), Some(r)) => Some(l.compare(*op, r)),
            _ => None,
        };
        if let Some(outcome) = outcome {
            self.resolve(receiver.pred, outcome);
        }
    }

    /// An existence test saw its path; resolves true.
    pub fn visit(&mut self, id: PredId) {
        if !self.nodes[id].needed {
            return;
        }
        debug_assert!(matches!(self.nodes[id].kind, PredKind::Exists));
        self.resolve(id, true);
    }

    /// Resolves every still-pending leaf to false, in construction order,
    /// stopping as soon as the root settles. Called at end of document.
    pub fn resolve_defaults(&mut self) {
        for i in 0..self.leaves.len() {
            if !self.needs_more() {
                break;
            }
            let leaf = self.leaves[i];
            if self.nodes[leaf].needed {
                self.resolve(leaf, false);
            }
        }
    }

    fn resolve(&mut self, id: PredId, value: bool) {
        debug_assert!(self.nodes[id].needed);
        self.settle(id, value);
        let mut cur = id;
        while let Some(parent) = self.nodes[cur].parent {
            if !self.nodes[parent].needed {
                break;
            }
            let child_value = self.nodes[cur].value;
            let outcome = match &self.nodes[parent].kind {
                PredKind::All(children) => {
                    if !child_value {
                        Some(false)
                    } else if children.iter().all(|&c| !self.nodes[c].needed) {
                        Some(true)
                    } else {
                        None
                    }
                }
                PredKind::Any(children) => {
                    if child_value {
                        Some(true)
                    } else if children.iter().all(|&c| !self.nodes[c].needed) {
                        Some(false)
                    } else {
                        None
                    }
                }
                _ => panic!("leaf predicate has children"),
            };
            match outcome {
                Some(outcome) => {
                    self.settle(parent, outcome);
                    cur = parent;
                }
                None => break,
            }
        }
    }

    /// Marks one node resolved and cancels everything still pending below
    /// it, so late deliveries cannot resurrect a decided subtree.
    fn settle(&mut self, id: PredId, value: bool) {
        self.nodes[id].value = value;
        self.nodes[id].needed = false;
        let mut queue: Vec<PredId> = match &self.nodes[id].kind {
            PredKind::All(children) | PredKind::Any(children) => children.clone(),
            _ => return,
        };
        while let Some(child) = queue.pop() {
            if !self.nodes[child].needed {
                continue;
            }
            self.nodes[child].needed = false;
            if let PredKind::All(c) | PredKind::Any(c) = &self.nodes[child].kind {
                queue.extend_from_slice(c);
            }
        }
    }

    /// Back to the pending state: all nodes unresolved, streamed cells empty.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.needed = true;
            node.value = false;
            if let PredKind::Compare { left, right, .. } = &mut node.kind {
                left.reset();
                right.reset();
            }
        }
    }
}
