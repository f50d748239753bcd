//! Call tree built from stack samples.
//!
//! Nodes live in an arena owned by [`CallTree`]; parents own their
//! children through [`NodeId`] handles keyed by resolved symbol name, so
//! two samples through same-named frames merge into one child even when
//! their addresses differed.
//!
//! Total time is derived (self + children's totals) and only computed on
//! first read, after the builder has handed the finished tree over.

use crate::utils::config::ROOT_SYMBOL;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::collections::BTreeMap;

/// Handle to a node inside one [`CallTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Every tree's root
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A single frame of the aggregated tree
#[derive(Debug, Clone)]
pub struct CallTreeNode {
    symbol: String,
    self_ticks: u64,
    depth: usize,
    parent: Option<NodeId>,
    children: BTreeMap<String, NodeId>,
    total_ticks: OnceCell<u64>,
}

impl CallTreeNode {
    fn new(symbol: impl Into<String>, depth: usize, parent: Option<NodeId>) -> Self {
        Self {
            symbol: symbol.into(),
            self_ticks: 0,
            depth,
            parent,
            children: BTreeMap::new(),
            total_ticks: OnceCell::new(),
        }
    }

    /// Resolved frame name (or the unknown sentinel)
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Samples in which this frame was the leaf
    pub fn self_ticks(&self) -> u64 {
        self.self_ticks
    }

    /// Distance from the root (the root is 0)
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children ordered by symbol name
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.values().copied()
    }

    pub fn child(&self, symbol: &str) -> Option<NodeId> {
        self.children.get(symbol).copied()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Rooted, acyclic call tree
#[derive(Debug, Clone)]
pub struct CallTree {
    nodes: Vec<CallTreeNode>,
}

impl CallTree {
    /// Tree containing only the root
    pub fn new() -> Self {
        Self {
            nodes: vec![CallTreeNode::new(ROOT_SYMBOL, 0, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn node(&self, id: NodeId) -> Option<&CallTreeNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &CallTreeNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Self ticks plus the total ticks of every descendant
    ///
    /// Computed on first read and cached. Unknown ids yield 0.
    pub fn total_ticks(&self, id: NodeId) -> u64 {
        let Some(node) = self.node(id) else {
            return 0;
        };
        if let Some(&total) = node.total_ticks.get() {
            return total;
        }

        // Post-order without recursion so deep stacks cannot overflow
        let mut pending = vec![(id, false)];
        while let Some((current, expanded)) = pending.pop() {
            let node = &self.nodes[current.0];
            if node.total_ticks.get().is_some() {
                continue;
            }
            if expanded {
                let total = node
                    .children
                    .values()
                    .map(|c| self.nodes[c.0].total_ticks.get().copied().unwrap_or(0))
                    .fold(node.self_ticks, u64::saturating_add);
                let _ = node.total_ticks.set(total);
            } else {
                pending.push((current, true));
                pending.extend(node.children.values().map(|&c| (c, false)));
            }
        }

        node.total_ticks.get().copied().unwrap_or(0)
    }

    /// Symbol names from the first frame below the root down to `id`
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self.node(id);
        while let Some(node) = current {
            let Some(parent) = node.parent else { break };
            path.push(node.symbol.as_str());
            current = self.node(parent);
        }
        path.reverse();
        path
    }

    /// Follow `names` from the root, one child per name
    pub fn find_path(&self, names: &[&str]) -> Option<NodeId> {
        names.iter().try_fold(self.root(), |id, name| {
            self.node(id).and_then(|node| node.child(name))
        })
    }

    fn child_or_insert(&mut self, parent: NodeId, symbol: &str) -> NodeId {
        if let Some(existing) = self.nodes[parent.0].child(symbol) {
            return existing;
        }
        let id = NodeId(self.nodes.len());
        let depth = self.nodes[parent.0].depth + 1;
        self.nodes.push(CallTreeNode::new(symbol, depth, Some(parent)));
        self.nodes[parent.0].children.insert(symbol.to_string(), id);
        id
    }

    fn structurally_equal(&self, a: NodeId, other: &CallTree, b: NodeId) -> bool {
        let mut pending = vec![(a, b)];
        while let Some((a, b)) = pending.pop() {
            let (left, right) = (&self.nodes[a.0], &other.nodes[b.0]);
            if left.symbol != right.symbol
                || left.self_ticks != right.self_ticks
                || left.children.len() != right.children.len()
            {
                return false;
            }
            for (name, &la) in &left.children {
                let Some(&rb) = right.children.get(name) else {
                    return false;
                };
                pending.push((la, rb));
            }
        }
        true
    }
}

impl Default for CallTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Trees are equal when they have the same shape, names and self ticks
impl PartialEq for CallTree {
    fn eq(&self, other: &Self) -> bool {
        self.structurally_equal(self.root(), other, other.root())
    }
}

/// Folds stack samples into a [`CallTree`]
///
/// Keeps the live stack of open nodes mirroring the log's stack deltas.
/// The root is always at the bottom of the stack.
#[derive(Debug, Clone)]
pub struct CallTreeBuilder {
    tree: CallTree,
    stack: Vec<NodeId>,
}

impl CallTreeBuilder {
    pub fn new() -> Self {
        Self {
            tree: CallTree::new(),
            stack: vec![NodeId::ROOT],
        }
    }

    /// Add one sample whose leaf frame is `symbol`
    ///
    /// The leaf lands at `previous depth + stack_delta`, never shallower
    /// than 1 and never more than one level below the previous leaf.
    /// `weight` is added to the leaf's self ticks, saturating at `u64::MAX`.
    pub fn add_sample(&mut self, symbol: &str, stack_delta: i32, weight: u64) -> NodeId {
        let previous_depth = self.stack.len() as i64 - 1;
        let target_depth = (previous_depth + i64::from(stack_delta)).max(1) as usize;

        // Keep the leaf's ancestors: root .. depth target-1
        self.stack.truncate(target_depth.min(self.stack.len()));

        let parent = self.current();
        let leaf = self.tree.child_or_insert(parent, symbol);
        let node = &mut self.tree.nodes[leaf.0];
        node.self_ticks = node.self_ticks.saturating_add(weight);
        self.stack.push(leaf);
        leaf
    }

    /// Depth of the most recent leaf (0 before any sample)
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Top of the live stack
    pub fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId::ROOT)
    }

    pub fn finish(self) -> CallTree {
        self.tree
    }
}

impl Default for CallTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
