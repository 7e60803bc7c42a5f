//! Walks the path trie in lock-step with document structure.
//!
//! The cursor mirrors the reader's position inside the parts of the document
//! the filter cares about. Entering a relevant array pushes an element
//! counter; entering a relevant object pushes an inactive level, so the top
//! of the counter stack always tells whether the current container is an
//! array. The stack is sized at compile time from the longest registered
//! path and never grows during a pass.

use json_sieve_expr::Step;

use crate::index::{NodeId, PathIndex};

const INACTIVE: i64 = -1;

#[derive(Debug, Clone)]
pub struct Cursor {
    /// Trie node of the value or container currently being processed.
    position: Option<NodeId>,
    /// Child matched by the last member name, consumed by the next value.
    pending: Option<NodeId>,
    counters: Vec<i64>,
    depth: usize,
}

impl Cursor {
    pub fn new(levels: usize) -> Self {
        Self {
            position: None,
            pending: None,
            counters: vec![INACTIVE; levels.max(1)],
            depth: 0,
        }
    }

    pub fn reset(&mut self) {
        self.position = None;
        self.pending = None;
        self.depth = 0;
        self.counters.fill(INACTIVE);
    }

    /// A value (scalar or container) begins. Returns its trie node when the
    /// value sits on a registered path; `None` means the caller skips it.
    pub fn value_begin(&mut self, index: &PathIndex) -> Option<NodeId> {
        if let Some(child) = self.pending.take() {
            self.position = Some(child);
            return Some(child);
        }
        let Some(position) = self.position else {
            // first value of the document
            self.position = Some(PathIndex::ROOT);
            return Some(PathIndex::ROOT);
        };
        if self.depth == 0 || self.counters[self.depth - 1] == INACTIVE {
            panic!("value token outside any matched member or array element");
        }
        let element = self.counters[self.depth - 1];
        let child = u32::try_from(element)
            .ok()
            .and_then(|i| index.child(position, &Step::Index(i)));
        match child {
            Some(child) => {
                self.position = Some(child);
                Some(child)
            }
            None => {
                // skipped elements still count
                self.counters[self.depth - 1] += 1;
                None
            }
        }
    }

    /// The value entered by the matching `value_begin` is finished; climbs
    /// back to the parent and counts the element if the enclosing container
    /// is an array.
    pub fn value_end(&mut self, index: &PathIndex) {
        let position = self.position.expect("value_end without a current value");
        self.position = index.node(position).parent();
        if self.depth > 0 && self.counters[self.depth - 1] != INACTIVE {
            self.counters[self.depth - 1] += 1;
        }
    }

    /// A member name was read inside a relevant object. True when a child
    /// path continues through it; the next `value_begin` then descends.
    pub fn match_name(&mut self, index: &PathIndex, name: &str) -> bool {
        let position = self.position.expect("member name outside any object");
        match index.child(position, &Step::Name(name.to_owned())) {
            Some(child) => {
                self.pending = Some(child);
                true
            }
            None => false,
        }
    }

    pub fn begin_object(&mut self) {
        self.push(INACTIVE);
    }

    pub fn end_object(&mut self) {
        self.pop();
    }

    pub fn begin_array(&mut self) {
        self.push(0);
    }

    pub fn end_array(&mut self) {
        self.pop();
    }

    fn push(&mut self, counter: i64) {
        assert!(
            self.depth < self.counters.len(),
            "container depth exceeds the longest registered path"
        );
        self.counters[self.depth] = counter;
        self.depth += 1;
    }

    fn pop(&mut self) {
        debug_assert!(self.depth > 0);
        self.depth -= 1;
        self.counters[self.depth] = INACTIVE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Receiver, Side};
    use json_sieve_expr::Path;

    fn index_over(paths: &[Vec<Step>]) -> PathIndex {
        let mut index = PathIndex::new();
        for (i, steps) in paths.iter().enumerate() {
            index.register_receiver(
                &Path::new(steps.clone()),
                Receiver {
                    pred: i,
                    side: Side::Left,
                },
            );
        }
        index
    }

    #[test]
    fn root_value_is_always_relevant() {
        let index = index_over(&[vec![]]);
        let mut cursor = Cursor::new(index.max_steps() + 1);
        assert_eq!(cursor.value_begin(&index), Some(PathIndex::ROOT));
        cursor.value_end(&index);
    }

    #[test]
    fn member_names_gate_descent() {
        let index = index_over(&[vec![Step::Name("a".into())]]);
        let mut cursor = Cursor::new(index.max_steps() + 1);

        // {"x": ..skipped.., "a": 5}
        assert!(cursor.value_begin(&index).is_some());
        cursor.begin_object();
        assert!(!cursor.match_name(&index, "x"));
        assert!(cursor.match_name(&index, "a"));
        let node = cursor.value_begin(&index).unwrap();
        assert_ne!(node, PathIndex::ROOT);
        cursor.value_end(&index);
        cursor.end_object();
        cursor.value_end(&index);
    }

    #[test]
    fn array_elements_are_counted_including_skipped_ones() {
        let index = index_over(&[vec![Step::Index(2)]]);
        let mut cursor = Cursor::new(index.max_steps() + 1);

        // [_, _, hit]
        assert!(cursor.value_begin(&index).is_some());
        cursor.begin_array();
        assert_eq!(cursor.value_begin(&index), None); // element 0
        assert_eq!(cursor.value_begin(&index), None); // element 1
        let hit = cursor.value_begin(&index).unwrap(); // element 2
        assert_ne!(hit, PathIndex::ROOT);
        cursor.value_end(&index);
        cursor.end_array();
        cursor.value_end(&index);
    }

    #[test]
    fn object_members_do_not_disturb_element_counters() {
        // [{...}, hit] with the object itself relevant through index 0
        let index = index_over(&[
            vec![Step::Index(0), Step::Name("k".into())],
            vec![Step::Index(1)],
        ]);
        let mut cursor = Cursor::new(index.max_steps() + 1);

        assert!(cursor.value_begin(&index).is_some());
        cursor.begin_array();
        assert!(cursor.value_begin(&index).is_some()); // element 0, the object
        cursor.begin_object();
        assert!(cursor.match_name(&index, "k"));
        assert!(cursor.value_begin(&index).is_some());
        cursor.value_end(&index); // member value must not advance the array
        cursor.end_object();
        cursor.value_end(&index); // element 0 done, counter now 1
        let hit = cursor.value_begin(&index); // element 1
        assert!(hit.is_some());
        cursor.value_end(&index);
        cursor.end_array();
        cursor.value_end(&index);
    }

    #[test]
    fn reset_clears_the_walk() {
        let index = index_over(&[vec![Step::Index(1)]]);
        let mut cursor = Cursor::new(index.max_steps() + 1);
        assert!(cursor.value_begin(&index).is_some());
        cursor.begin_array();
        assert_eq!(cursor.value_begin(&index), None);

        cursor.reset();
        assert_eq!(cursor.value_begin(&index), Some(PathIndex::ROOT));
        cursor.begin_array();
        assert_eq!(cursor.value_begin(&index), None); // counting restarts at 0
        assert!(cursor.value_begin(&index).is_some());
    }
}
