//! Build collapsed stack format from a parsed profile.
//!
//! Format: "parent;child;grandchild weight"
//!
//! Example: "main;render;layout 12"
//! This means: main called render which called layout, and layout was the
//! executing frame in 12 ticks.

use super::profile::Profile;
use log::debug;

/// A single collapsed stack entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Weight (self ticks of the leaf frame)
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Render as one line of a folded-stacks file
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }

    /// Name of the leaf frame
    pub fn leaf(&self) -> &str {
        self.stack.rsplit(';').next().unwrap_or(&self.stack)
    }
}

/// Build collapsed stacks from a profile
///
/// **Public** - main entry point for stack building
///
/// # Returns
/// One entry per frame with non-zero self ticks, heaviest first.
/// Equal weights are ordered by stack string so output is deterministic.
pub fn build_collapsed_stacks(profile: &Profile) -> Vec<CollapsedStack> {
    let tree = profile.tree();

    let mut stacks: Vec<CollapsedStack> = tree
        .iter()
        .filter(|(id, node)| *id != tree.root() && node.self_ticks() > 0)
        .map(|(id, node)| CollapsedStack::new(tree.path(id).join(";"), node.self_ticks()))
        .collect();

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!("Built {} collapsed stacks", stacks.len());

    stacks
}
