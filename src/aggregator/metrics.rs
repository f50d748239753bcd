//! Calculate performance metrics and hot paths from a profile.
//!
//! Hot paths are the stacks whose leaf frame was executing most often.
//! These are the primary targets for optimization.

use super::stack_builder::CollapsedStack;
use serde::{Deserialize, Serialize};
use log::debug;

/// A hot path in the execution (stack trace with time)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotPath {
    /// Collapsed stack representation (e.g., "main;render;layout")
    pub stack: String,

    /// Self time of the leaf frame in milliseconds
    pub time_ms: f64,

    /// Percentage of total time
    pub percentage: f64,
}

/// Calculate hot paths from collapsed stacks
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `stacks` - Collapsed stacks from stack_builder (heaviest first)
/// * `tick_interval_ms` - Milliseconds per tick
/// * `top_n` - Number of top paths to return
pub fn calculate_hot_paths(
    stacks: &[CollapsedStack],
    tick_interval_ms: f64,
    top_n: usize,
) -> Vec<HotPath> {
    debug!("Calculating top {} hot paths from {} stacks", top_n, stacks.len());

    let total_ticks = total_weight(stacks.iter());

    stacks
        .iter()
        .take(top_n)
        .map(|stack| create_hot_path(stack, total_ticks, tick_interval_ms))
        .collect()
}

/// Create a HotPath from a CollapsedStack
pub fn create_hot_path(stack: &CollapsedStack, total_ticks: u64, tick_interval_ms: f64) -> HotPath {
    let percentage = if total_ticks > 0 {
        (stack.weight as f64 / total_ticks as f64) * 100.0
    } else {
        0.0
    };

    HotPath {
        stack: stack.stack.clone(),
        time_ms: stack.weight as f64 * tick_interval_ms,
        percentage,
    }
}

/// Time distribution statistics over the frames of a profile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeDistribution {
    /// Total ticks across all stacks
    pub total_ticks: u64,

    /// Number of stacks with self time
    pub stack_count: usize,

    pub mean_ticks_per_stack: u64,
    pub median_ticks_per_stack: u64,

    /// Ticks in the heaviest 10% of stacks
    pub top_10_percent_ticks: u64,

    /// Percentage of total ticks in the heaviest 10%
    pub top_10_percent_percentage: f64,
}

impl TimeDistribution {
    /// True if the heaviest 10% of stacks account for more than 80% of time
    pub fn is_highly_concentrated(&self) -> bool {
        self.top_10_percent_percentage > 80.0
    }

    /// Human-readable one-liner for logging
    pub fn summary(&self) -> String {
        format!(
            "Total: {} ticks | Stacks: {} | Mean: {} | Median: {} | Top 10%: {:.1}%",
            self.total_ticks,
            self.stack_count,
            self.mean_ticks_per_stack,
            self.median_ticks_per_stack,
            self.top_10_percent_percentage
        )
    }
}

/// Calculate time distribution statistics
///
/// `stacks` must be sorted heaviest first, as `build_collapsed_stacks` returns them.
pub fn calculate_time_distribution(stacks: &[CollapsedStack]) -> TimeDistribution {
    if stacks.is_empty() {
        return TimeDistribution::default();
    }

    let total = total_weight(stacks.iter());
    let count = stacks.len();

    let mut weights: Vec<u64> = stacks.iter().map(|s| s.weight).collect();
    weights.sort_unstable();
    let median = weights[weights.len() / 2];

    let top_count = (count as f64 * 0.1).ceil() as usize;
    let top_ticks = total_weight(stacks.iter().take(top_count));

    TimeDistribution {
        total_ticks: total,
        stack_count: count,
        mean_ticks_per_stack: total / count as u64,
        median_ticks_per_stack: median,
        top_10_percent_ticks: top_ticks,
        top_10_percent_percentage: if total > 0 {
            (top_ticks as f64 / total as f64) * 100.0
        } else {
            0.0
        },
    }
}

/// Sum of stack weights, saturating at `u64::MAX`
fn total_weight<'a>(stacks: impl Iterator<Item = &'a CollapsedStack>) -> u64 {
    stacks.map(|s| s.weight).fold(0, u64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_hot_paths() {
        let stacks = vec![
            CollapsedStack::new("main;execute".to_string(), 50),
            CollapsedStack::new("main;layout".to_string(), 30),
            CollapsedStack::new("main;paint".to_string(), 20),
        ];

        let hot_paths = calculate_hot_paths(&stacks, 1.0, 2);

        assert_eq!(hot_paths.len(), 2);
        assert_eq!(hot_paths[0].stack, "main;execute");
        assert_eq!(hot_paths[0].time_ms, 50.0);
        assert_eq!(hot_paths[0].percentage, 50.0);
        assert_eq!(hot_paths[1].percentage, 30.0);
    }

    #[test]
    fn test_create_hot_path_scales_time() {
        let stack = CollapsedStack::new("test;path".to_string(), 4);
        let hot_path = create_hot_path(&stack, 16, 0.25);

        assert_eq!(hot_path.time_ms, 1.0);
        assert_eq!(hot_path.percentage, 25.0);
    }

    #[test]
    fn test_calculate_time_distribution() {
        let stacks = vec![
            CollapsedStack::new("stack1".to_string(), 8500),
            CollapsedStack::new("stack2".to_string(), 1000),
            CollapsedStack::new("stack3".to_string(), 250),
            CollapsedStack::new("stack4".to_string(), 250),
        ];

        let dist = calculate_time_distribution(&stacks);

        assert_eq!(dist.total_ticks, 10000);
        assert_eq!(dist.stack_count, 4);
        assert_eq!(dist.mean_ticks_per_stack, 2500);
        assert_eq!(dist.median_ticks_per_stack, 1000);
        assert!(dist.is_highly_concentrated());
    }

    #[test]
    fn test_huge_weights_do_not_overflow() {
        let stacks = vec![
            CollapsedStack::new("a".to_string(), u64::MAX),
            CollapsedStack::new("b".to_string(), 1),
        ];

        let hot = calculate_hot_paths(&stacks, 1.0, 1);
        assert_eq!(hot[0].percentage, 100.0);
        assert_eq!(calculate_time_distribution(&stacks).total_ticks, u64::MAX);
    }

    #[test]
    fn test_time_distribution_empty() {
        let dist = calculate_time_distribution(&[]);
        assert_eq!(dist.total_ticks, 0);
        assert_eq!(dist.stack_count, 0);
        assert!(!dist.is_highly_concentrated());
    }
}
