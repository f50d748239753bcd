//! Plain-text profile summary for terminals.

use crate::aggregator::{build_collapsed_stacks, calculate_time_distribution, Profile};

/// Render a hot-path table followed by a bar chart of the heaviest stacks
///
/// **Public** - used by the `--summary` flag of the CLI commands
pub fn generate_text_summary(profile: &Profile, max_lines: usize) -> String {
    let stacks = build_collapsed_stacks(profile);
    let total_ticks = profile.tree().total_ticks(profile.root()).max(1);
    let mut lines = Vec::new();

    lines.push(format!(
        "  Total time: {:.3} ms ({} samples, {} frames)",
        profile.total_time(),
        profile.stats().samples,
        profile.frame_count()
    ));
    lines.push(format!(
        "  Distribution: {}",
        calculate_time_distribution(&stacks).summary()
    ));
    lines.push(String::new());

    lines.push("  HOT PATHS".to_string());
    lines.push(format!("  {:<48} {:>12} {:>8}", "Stack (hottest first)", "SELF ms", "%"));
    lines.push(format!("  {}", "-".repeat(70)));

    for stack in stacks.iter().take(max_lines) {
        let percentage = (stack.weight as f64 / total_ticks as f64) * 100.0;
        let display_stack = truncate_front(&stack.stack, 48);

        lines.push(format!(
            "  {:<48} {:>12.3} {:>7.1}%",
            display_stack,
            stack.weight as f64 * profile.tick_interval_ms(),
            percentage
        ));
    }

    if stacks.is_empty() {
        lines.push("  (no samples)".to_string());
    }

    lines.push(String::new());
    lines.push("  root ".to_string() + &"#".repeat(50) + " 100%");

    for stack in stacks.iter().take(5) {
        let percentage = (stack.weight as f64 / total_ticks as f64) * 100.0;
        let bar = "#".repeat((percentage / 2.0) as usize);
        lines.push(format!(
            "  └─ {:<20} {:<50} {:>5.1}%",
            truncate_front(stack.leaf(), 20),
            bar,
            percentage
        ));
    }

    lines.join("\n")
}

/// Keep the last `width` characters, prefixing "..." when cut
fn truncate_front(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(3);
    let tail: String = text.chars().skip(count - keep).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_log;

    #[test]
    fn test_summary_lists_hot_paths() {
        let profile = parse_log(
            "code-creation,LazyCompile,0x10,16,\"main\"\n\
             code-creation,LazyCompile,0x20,16,\"layout\"\n\
             tick,0x10,+1,1\ntick,0x20,+1,3\n",
        );
        let summary = generate_text_summary(&profile, 10);

        assert!(summary.contains("main;layout"));
        assert!(summary.contains("75.0%"));
        assert!(summary.contains("Total time: 4.000 ms"));
    }

    #[test]
    fn test_summary_of_empty_profile() {
        let summary = generate_text_summary(&Profile::empty(), 10);
        assert!(summary.contains("(no samples)"));
    }

    #[test]
    fn test_truncate_front() {
        assert_eq!(truncate_front("short", 10), "short");
        assert_eq!(truncate_front("abcdefghij", 6), "...hij");
    }
}
