//! Aggregation of stack samples into call trees and metrics.
//!
//! This module provides:
//! - The call tree and its builder (stack samples → tree)
//! - The immutable `Profile` produced by a parse
//! - Collapsed stack export and hot path analysis

pub mod call_tree;
pub mod metrics;
pub mod profile;
pub mod stack_builder;

// Re-export main types and functions
pub use call_tree::{CallTree, CallTreeBuilder, CallTreeNode, NodeId};
pub use metrics::{calculate_hot_paths, calculate_time_distribution, HotPath, TimeDistribution};
pub use profile::{ParseStats, Profile};
pub use stack_builder::{build_collapsed_stacks, CollapsedStack};
