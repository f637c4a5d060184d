//! Plain-text comparison report

use chrono::{DateTime, Local};
use std::collections::BTreeMap;

use super::{ComparisonResult, ExclusiveEntry};

const RULE: &str = "============================================================";

/// Render a report stamped with the current local time
pub fn render(result: &ComparisonResult, left_label: &str, right_label: &str) -> String {
    render_at(result, left_label, right_label, Local::now())
}

/// Render a report; entries are grouped by category, categories sorted by name
pub fn render_at(
    result: &ComparisonResult,
    left_label: &str,
    right_label: &str,
    generated_at: DateTime<Local>,
) -> String {
    let mut out = String::new();
    out.push_str("Playlist comparison report\n");
    out.push_str(&format!("{RULE}\n"));
    out.push_str(&format!("Generated: {}\n", generated_at.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format!("Left:  {left_label}\n"));
    out.push_str(&format!("Right: {right_label}\n"));
    out.push('\n');
    out.push_str("Summary:\n");
    out.push_str(&format!("  left channels:  {}\n", result.left_total));
    out.push_str(&format!("  right channels: {}\n", result.right_total));
    out.push_str(&format!("  same URLs:      {}\n", result.same_count()));
    out.push_str(&format!("  different URLs: {}\n", result.differing_count()));
    out.push_str(&format!("  only in left:   {}\n", result.only_in_left_count()));
    out.push_str(&format!("  only in right:  {}\n", result.only_in_right_count()));

    if !result.differing.is_empty() {
        section(&mut out, "Different URLs", result.differing.len());
        let mut by_group: BTreeMap<&str, Vec<_>> = BTreeMap::new();
        for entry in &result.differing {
            by_group.entry(entry.group.as_str()).or_default().push(entry);
        }
        for (group, entries) in by_group {
            out.push_str(&format!("[{}]\n", display_group(group)));
            for entry in entries {
                out.push_str(&format!("  {}\n", entry.name));
                out.push_str("    left:\n");
                for url in &entry.left_urls {
                    out.push_str(&format!("      - {url}\n"));
                }
                out.push_str("    right:\n");
                for url in &entry.right_urls {
                    out.push_str(&format!("      - {url}\n"));
                }
            }
            out.push('\n');
        }
    }

    exclusive_section(&mut out, "Only in left", &result.only_in_left);
    exclusive_section(&mut out, "Only in right", &result.only_in_right);
    out
}

fn section(out: &mut String, title: &str, count: usize) {
    out.push('\n');
    out.push_str(&format!("{RULE}\n"));
    out.push_str(&format!("{title} ({count}):\n"));
    out.push_str(&format!("{RULE}\n"));
}

fn display_group(group: &str) -> &str {
    if group.is_empty() { "N/A" } else { group }
}

fn exclusive_section(out: &mut String, title: &str, entries: &[ExclusiveEntry]) {
    if entries.is_empty() {
        return;
    }
    section(out, title, entries.len());
    let mut by_group: BTreeMap<&str, Vec<&ExclusiveEntry>> = BTreeMap::new();
    for entry in entries {
        by_group.entry(entry.group.as_str()).or_default().push(entry);
    }
    for (group, entries) in by_group {
        out.push_str(&format!("[{}]\n", display_group(group)));
        for entry in entries {
            out.push_str(&format!("  {}: {}\n", entry.name, entry.stream_url));
        }
        out.push('\n');
    }
}
