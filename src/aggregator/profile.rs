//! The finished, immutable result of one log parse.

use super::call_tree::{CallTree, CallTreeNode, NodeId};
use super::metrics::{calculate_hot_paths, calculate_time_distribution, HotPath, TimeDistribution};
use super::stack_builder::{build_collapsed_stacks, CollapsedStack};
use crate::utils::config::DEFAULT_TICK_INTERVAL_MS;
use serde::{Deserialize, Serialize};

/// Counters collected while parsing a log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Lines consumed, blank ones included
    pub lines: usize,

    /// `tick` records folded into the tree
    pub samples: u64,

    /// Sum of tick weights
    pub ticks: u64,

    /// Ticks whose address had no live symbol
    pub unresolved_ticks: u64,

    pub code_creations: u64,
    pub code_moves: u64,
    pub code_deletes: u64,

    /// Unknown or malformed lines that were skipped
    pub skipped_lines: usize,
}

/// A symbolicated, time-weighted call tree
#[derive(Debug, Clone)]
pub struct Profile {
    tree: CallTree,
    tick_interval_ms: f64,
    stats: ParseStats,
}

impl Profile {
    pub fn new(tree: CallTree, tick_interval_ms: f64, stats: ParseStats) -> Self {
        Self {
            tree,
            tick_interval_ms,
            stats,
        }
    }

    /// Valid profile with zero total time
    pub fn empty() -> Self {
        Self::new(CallTree::new(), DEFAULT_TICK_INTERVAL_MS, ParseStats::default())
    }

    pub fn tree(&self) -> &CallTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn node(&self, id: NodeId) -> Option<&CallTreeNode> {
        self.tree.node(id)
    }

    /// Number of frames below the root
    pub fn frame_count(&self) -> usize {
        self.tree.len() - 1
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    pub fn tick_interval_ms(&self) -> f64 {
        self.tick_interval_ms
    }

    /// Time spent under the root, in milliseconds
    pub fn total_time(&self) -> f64 {
        self.total_time_of(self.root())
    }

    pub fn total_time_of(&self, id: NodeId) -> f64 {
        self.tree.total_ticks(id) as f64 * self.tick_interval_ms
    }

    pub fn self_time(&self, id: NodeId) -> f64 {
        self.node(id)
            .map(|n| n.self_ticks() as f64 * self.tick_interval_ms)
            .unwrap_or(0.0)
    }

    /// Share of the profile's total time spent under `id`, in `[0, 1]`
    pub fn fraction_of_total(&self, id: NodeId) -> f64 {
        let total = self.tree.total_ticks(self.root());
        if total == 0 {
            return 0.0;
        }
        self.tree.total_ticks(id) as f64 / total as f64
    }

    pub fn find_path(&self, names: &[&str]) -> Option<NodeId> {
        self.tree.find_path(names)
    }

    pub fn is_empty(&self) -> bool {
        self.tree.total_ticks(self.root()) == 0
    }

    /// Children of `id`, ordered by symbol
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|node| node.children().collect())
            .unwrap_or_default()
    }

    /// Folded `a;b;c weight` lines, heaviest first
    pub fn collapsed_stacks(&self) -> Vec<CollapsedStack> {
        build_collapsed_stacks(self)
    }

    /// The `top_n` stacks with the most self time
    pub fn hot_paths(&self, top_n: usize) -> Vec<HotPath> {
        calculate_hot_paths(&self.collapsed_stacks(), self.tick_interval_ms, top_n)
    }

    pub fn time_distribution(&self) -> TimeDistribution {
        calculate_time_distribution(&self.collapsed_stacks())
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Profile {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree && self.tick_interval_ms == other.tick_interval_ms
    }
}
