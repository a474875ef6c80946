//! Human readable change report, logged at the end of a run

use super::{ChannelChange, DiffResult};

const RULE: &str = "============================================================";

/// Render the report lines for a diff, itemizing at most `preview` changes
pub fn render_lines(diff: &DiffResult, preview: usize) -> Vec<String> {
    let mut lines = vec![
        RULE.to_string(),
        "CHANNEL CHANGE REPORT".to_string(),
        RULE.to_string(),
        format!("Total channels: {}", diff.total),
        format!("Added: {}", diff.added),
        format!("Removed: {}", diff.removed),
        format!("Modified: {}", diff.modified),
    ];

    if !diff.details.added_groups.is_empty() {
        lines.push(format!("New groups: {}", diff.details.added_groups.join(", ")));
    }

    if !diff.details.removed_groups.is_empty() {
        lines.push(format!(
            "Removed groups: {}",
            diff.details.removed_groups.join(", ")
        ));
    }

    if !diff.details.changes.is_empty() {
        lines.push(format!(
            "Changes (first {} of {} listed):",
            preview.min(diff.details.changes.len()),
            diff.details.changes.len()
        ));
        lines.extend(diff.details.changes.iter().take(preview).map(render_change));
    }

    lines.push(RULE.to_string());
    lines
}

fn render_change(change: &ChannelChange) -> String {
    match change {
        ChannelChange::Added { group, channel } => format!("  [+] {} - {}", group, channel),
        ChannelChange::Removed { group, channel } => format!("  [-] {} - {}", group, channel),
        ChannelChange::Modified { group, channel, .. } => {
            format!("  [~] {} - {} (URL changed)", group, channel)
        }
    }
}
