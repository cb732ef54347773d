use ahash::RandomState;
use indexmap::IndexMap;

use crate::dump::Coroutine;

const ROOT: usize = 0;

#[derive(Debug)]
struct Node<'a> {
    /// The frame this node adds to its parent's key. `None` only for the root.
    frame: Option<&'a str>,

    /// Coroutines whose reversed stack passes through this node, in input order.
    labels: Vec<usize>,

    /// Child nodes by frame, in the order they were first seen.
    children: IndexMap<&'a str, usize, RandomState>,
}

impl<'a> Node<'a> {
    fn new(frame: Option<&'a str>) -> Self {
        Node {
            frame,
            labels: Vec::new(),
            children: IndexMap::default(),
        }
    }
}

/// A prefix tree over stack traces read outermost frame first.
///
/// A node's key is the sequence of frames on the path from the root, so two coroutines share a
/// node exactly when they share that many outermost frames. Every node records every coroutine
/// that passes through it. Coroutines with no frames at all are recorded on the root.
#[derive(Debug)]
pub(crate) struct SuffixTrie<'a> {
    nodes: Vec<Node<'a>>,
}

/// A node as seen during a [`SuffixTrie::preorder`] walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Visit<'t, 'a> {
    /// The deepest frame of this node's key; `None` for the root.
    pub(crate) frame: Option<&'a str>,
    /// Indices of the coroutines passing through this node, ascending.
    pub(crate) labels: &'t [usize],
}

impl<'a> SuffixTrie<'a> {
    pub(crate) fn build(coroutines: &'a [Coroutine]) -> Self {
        let mut trie = SuffixTrie {
            nodes: vec![Node::new(None)],
        };
        for (i, coroutine) in coroutines.iter().enumerate() {
            if coroutine.stack_trace.is_empty() {
                trie.nodes[ROOT].labels.push(i);
                continue;
            }
            let mut at = ROOT;
            for frame in coroutine.stack_trace.iter().rev() {
                at = trie.child(at, frame);
                trie.nodes[at].labels.push(i);
            }
        }
        trie
    }

    fn child(&mut self, parent: usize, frame: &'a str) -> usize {
        if let Some(&idx) = self.nodes[parent].children.get(frame) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(Node::new(Some(frame)));
        self.nodes[parent].children.insert(frame, idx);
        idx
    }

    /// Number of nodes, root included.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Walks the trie depth-first, parents before children, siblings in first-seen order.
    pub(crate) fn preorder(&self) -> Preorder<'_, 'a> {
        Preorder {
            trie: self,
            pending: vec![ROOT],
        }
    }
}

pub(crate) struct Preorder<'t, 'a> {
    trie: &'t SuffixTrie<'a>,
    pending: Vec<usize>,
}

impl<'t, 'a> Iterator for Preorder<'t, 'a> {
    type Item = Visit<'t, 'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let trie = self.trie;
        let node = &trie.nodes[self.pending.pop()?];
        // reversed so the first-seen child is popped first
        self.pending.extend(node.children.values().rev());
        Some(Visit {
            frame: node.frame,
            labels: &node.labels,
        })
    }
}
