//! Plain-text rendering for terminal output.

use std::fmt::Write;

use chroma_types::activity::{ActivityLog, ActivityStatus};
use chroma_types::api::{DashboardStats, RecordPage};
use chroma_types::models::{RawRecord, RawScanRecord};

pub fn timeline(entries: &[ActivityLog]) -> String {
    if entries.is_empty() {
        return "No activity yet.\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let status = match entry.status {
            ActivityStatus::Success => "ok",
            ActivityStatus::Failed => "FAILED",
        };
        let _ = writeln!(
            out,
            "{:>12}  {:<6} {:<8} {}",
            entry.display_time, status, entry.actor, entry.description
        );
    }
    out
}

fn scan_line(scan: &RawScanRecord) -> String {
    format!(
        "#{:<5} {:<24} {:>5.1}%  {:<18} {}",
        scan.id,
        scan.tone_result,
        scan.confidence,
        scan.rgb_value.as_deref().unwrap_or("-"),
        scan.created_at.as_deref().unwrap_or("-"),
    )
}

pub fn page(page: &RecordPage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Page {} ({} per page)", page.page + 1, page.page_size);
    if page.records.is_empty() {
        out.push_str("  (no records)\n");
    }
    for record in &page.records {
        let line = match record {
            RawRecord::Scan(scan) => scan_line(scan),
            RawRecord::Palette(p) => format!(
                "#{:<5} {:<24} {}  {}",
                p.id,
                p.season_name,
                p.colors.join(" "),
                p.created_at.as_deref().unwrap_or("-"),
            ),
        };
        let _ = writeln!(out, "  {}", line);
    }
    let prev = if page.has_previous { "[p]rev" } else { "" };
    let next = if page.has_next { "[n]ext" } else { "" };
    let _ = writeln!(out, "{} {}", prev, next);
    out
}

pub fn stats(stats: &DashboardStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total scans:      {}", stats.total_scans);
    let _ = writeln!(out, "Saved palettes:   {}", stats.total_palettes);
    let _ = writeln!(out, "Avg confidence:   {:.1}%", stats.avg_confidence);
    let _ = writeln!(out, "Recent scans:");
    for scan in &stats.recent_scans {
        let _ = writeln!(out, "  {}", scan_line(scan));
    }
    out
}
