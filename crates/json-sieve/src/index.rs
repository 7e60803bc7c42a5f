//! Trie over every path the filter references.
//!
//! Built once at compile time, read-only during evaluation. Each node maps a
//! navigation step to a child node and carries the predicate endpoints bound
//! at that location: receivers waiting for a scalar, and visitors fired as
//! soon as any value begins there.

use std::collections::HashMap;

use json_sieve_expr::{Path, Step};

use crate::predicate::{PredId, Receiver};

pub type NodeId = usize;

#[derive(Debug, Clone, Default)]
pub struct TrieNode {
    children: HashMap<Step, NodeId>,
    parent: Option<NodeId>,
    receivers: Vec<Receiver>,
    visitors: Vec<PredId>,
}

impl TrieNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn receivers(&self) -> &[Receiver] {
        &self.receivers
    }

    pub fn visitors(&self) -> &[PredId] {
        &self.visitors
    }
}

#[derive(Debug, Clone)]
pub struct PathIndex {
    nodes: Vec<TrieNode>,
    max_steps: usize,
}

impl Default for PathIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PathIndex {
    /// The empty path, i.e. the document itself.
    pub const ROOT: NodeId = 0;

    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            max_steps: 0,
        }
    }

    /// Binds one comparison side to a path; the receiver gets the scalar
    /// found there, if any.
    pub fn register_receiver(&mut self, path: &Path, receiver: Receiver) {
        let node = self.insert(path);
        self.nodes[node].receivers.push(receiver);
    }

    /// Binds an existence test to a path; fired when any value begins there.
    pub fn register_visitor(&mut self, path: &Path, pred: PredId) {
        let node = self.insert(path);
        self.nodes[node].visitors.push(pred);
    }

    fn insert(&mut self, path: &Path) -> NodeId {
        let mut cur = Self::ROOT;
        for step in &path.steps {
            cur = match self.nodes[cur].children.get(step) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode {
                        parent: Some(cur),
                        ..TrieNode::default()
                    });
                    self.nodes[cur].children.insert(step.clone(), child);
                    child
                }
            };
        }
        self.max_steps = self.max_steps.max(path.steps.len());
        cur
    }

    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id]
    }

    pub fn child(&self, id: NodeId, step: &Step) -> Option<NodeId> {
        self.nodes[id].children.get(step).copied()
    }

    /// A node without children terminates every path through it; values
    /// below it can be skipped wholesale.
    pub fn has_children(&self, id: NodeId) -> bool {
        !self.nodes[id].children.is_empty()
    }

    /// Longest registered path, in steps. Bounds the container depth the
    /// cursor can descend to.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        false // the root always exists
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::Side;

    fn path(steps: Vec<Step>) -> Path {
        Path::new(steps)
    }

    #[test]
    fn shared_prefixes_share_nodes() {
        let mut index = PathIndex::new();
        index.register_visitor(
            &path(vec![Step::Name("a".into()), Step::Name("b".into())]),
            0,
        );
        index.register_visitor(
            &path(vec![Step::Name("a".into()), Step::Name("c".into())]),
            1,
        );
        // root + a + b + c
        assert_eq!(index.len(), 4);
        assert_eq!(index.max_steps(), 2);

        let a = index.child(PathIndex::ROOT, &Step::Name("a".into())).unwrap();
        assert!(index.has_children(a));
        let b = index.child(a, &Step::Name("b".into())).unwrap();
        assert!(!index.has_children(b));
        assert_eq!(index.node(b).parent(), Some(a));
        assert_eq!(index.node(b).visitors(), &[0]);
    }

    #[test]
    fn empty_path_targets_the_root() {
        let mut index = PathIndex::new();
        index.register_receiver(
            &Path::default(),
            Receiver {
                pred: 3,
                side: Side::Left,
            },
        );
        assert_eq!(index.len(), 1);
        assert_eq!(index.node(PathIndex::ROOT).receivers().len(), 1);
        assert_eq!(index.max_steps(), 0);
    }

    #[test]
    fn name_and_index_steps_are_distinct_edges() {
        let mut index = PathIndex::new();
        index.register_visitor(&path(vec![Step::Name("0".into())]), 0);
        index.register_visitor(&path(vec![Step::Index(0)]), 1);
        assert_eq!(index.len(), 3);
    }
}
