//! Output JSON schema definitions for profile reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::aggregator::{HotPath, NodeId, ParseStats, Profile};
use crate::utils::config::REPORT_SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Where the log came from (file path, record sequence, ...)
    pub source: String,

    /// Total time under the root in milliseconds
    pub total_time_ms: f64,

    pub tick_interval_ms: f64,

    pub stats: ParseStats,

    /// Top hot paths (ranked by self time)
    pub hot_paths: Vec<HotPath>,

    /// Full call tree in pre-order, root first; siblings ordered by name
    pub call_tree: Vec<ReportNode>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// One call tree node in a report
///
/// Nodes reference their parent by index into `ProfileReport::call_tree`,
/// so the JSON stays flat however deep the stacks go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportNode {
    pub name: String,
    /// Index of the parent node; `None` for the root
    pub parent: Option<usize>,
    pub depth: usize,
    pub self_time_ms: f64,
    pub total_time_ms: f64,
}

impl ProfileReport {
    /// Build a report from a finished profile
    ///
    /// **Public** - used by the analyze and replay commands
    pub fn from_profile(profile: &Profile, source: impl Into<String>, top_paths: usize) -> Self {
        Self {
            version: REPORT_SCHEMA_VERSION.to_string(),
            source: source.into(),
            total_time_ms: profile.total_time(),
            tick_interval_ms: profile.tick_interval_ms(),
            stats: profile.stats().clone(),
            hot_paths: profile.hot_paths(top_paths),
            call_tree: report_tree(profile),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Flatten the call tree into pre-order report nodes
///
/// **Private** - walks with an explicit stack
fn report_tree(profile: &Profile) -> Vec<ReportNode> {
    let mut nodes = Vec::with_capacity(profile.tree().len());
    let mut pending: Vec<(NodeId, Option<usize>)> = vec![(profile.root(), None)];

    while let Some((id, parent)) = pending.pop() {
        let Some(node) = profile.node(id) else {
            continue;
        };

        let index = nodes.len();
        nodes.push(ReportNode {
            name: node.symbol().to_string(),
            parent,
            depth: node.depth(),
            self_time_ms: profile.self_time(id),
            total_time_ms: profile.total_time_of(id),
        });

        // Reversed so the alphabetically first child is emitted next
        let children: Vec<NodeId> = node.children().collect();
        pending.extend(children.into_iter().rev().map(|child| (child, Some(index))));
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_log;
    use crate::utils::config::ROOT_SYMBOL;

    #[test]
    fn test_report_from_profile() {
        let profile = parse_log(
            "code-creation,LazyCompile,0x10,16,\"main\"\n\
             code-creation,LazyCompile,0x20,16,\"work\"\n\
             tick,0x10,+1,1\ntick,0x20,+1,3\n",
        );
        let report = ProfileReport::from_profile(&profile, "test.log", 10);

        assert_eq!(report.version, REPORT_SCHEMA_VERSION);
        assert_eq!(report.source, "test.log");
        assert_eq!(report.total_time_ms, 4.0);
        assert_eq!(report.hot_paths.len(), 2);
        assert_eq!(report.hot_paths[0].stack, "main;work");

        let names: Vec<&str> = report.call_tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec![ROOT_SYMBOL, "main", "work"]);
        assert_eq!(report.call_tree[0].parent, None);
        assert_eq!(report.call_tree[1].parent, Some(0));
        assert_eq!(report.call_tree[1].total_time_ms, 4.0);
        assert_eq!(report.call_tree[2].parent, Some(1));
        assert_eq!(report.call_tree[2].depth, 2);
        assert_eq!(report.call_tree[2].self_time_ms, 3.0);
    }

    #[test]
    fn test_siblings_follow_their_parent_in_name_order() {
        let profile = parse_log(
            "code-creation,LazyCompile,0x10,16,\"main\"\n\
             code-creation,LazyCompile,0x20,16,\"zeta\"\n\
             code-creation,LazyCompile,0x30,16,\"alpha\"\n\
             code-creation,LazyCompile,0x40,16,\"inner\"\n\
             tick,0x10,+1,1\ntick,0x20,+1,1\ntick,0x30,0,1\ntick,0x40,+1,1\n",
        );
        let report = ProfileReport::from_profile(&profile, "test.log", 10);

        let names: Vec<&str> = report.call_tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec![ROOT_SYMBOL, "main", "alpha", "inner", "zeta"]);
        assert_eq!(report.call_tree[3].parent, Some(2));
        assert_eq!(report.call_tree[4].parent, Some(1));
    }
}
