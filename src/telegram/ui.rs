//! HTML formatting for bot replies.
//!
//! All replies use HTML parse mode. Operator-supplied values are escaped
//! before interpolation.

use chrono::{DateTime, Utc};

use crate::broadcast::{CampaignSummary, DispatchReport, ScheduledRun};
use crate::types::{CampaignId, CategorySet, Destination, Draft};

/// Escape special HTML characters in user-provided text.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Comma-joined categories, or a placeholder when there are none.
pub fn format_categories(categories: &CategorySet) -> String {
    if categories.is_empty() {
        return "no categories".to_owned();
    }
    escape_html(
        &categories
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Confirmation line for a registered destination.
pub fn format_destination(dest: &Destination) -> String {
    format!(
        "<b>{}</b> <code>{}</code> [{}]",
        escape_html(&dest.title),
        escape_html(dest.id.as_str()),
        format_categories(&dest.categories)
    )
}

/// Short status of a pending draft.
pub fn format_draft(draft: &Draft) -> String {
    let id = draft
        .intended_id
        .as_ref()
        .map(|id| format!("<code>{}</code>", escape_html(id.as_str())))
        .unwrap_or_else(|| "(no id yet)".to_owned());
    let photos = draft
        .media
        .iter()
        .filter(|m| m.kind == crate::types::MediaKind::Photo)
        .count();
    let videos = draft
        .media
        .iter()
        .filter(|m| m.kind == crate::types::MediaKind::Video)
        .count();
    let documents = draft
        .media
        .len()
        .saturating_sub(photos)
        .saturating_sub(videos);
    format!(
        "<b>Draft</b> {id}\nText: {} chars\nMedia: {photos} photo, {videos} video, {documents} document",
        draft.text.chars().count()
    )
}

/// Per-campaign delivery counts.
pub fn format_summary(campaign_id: &CampaignId, summary: &CampaignSummary) -> String {
    format!(
        "<b>Report {}</b>\nOK: {}\nERR: {}",
        escape_html(campaign_id.as_str()),
        summary.success_count,
        summary.failure_count
    )
}

/// Result of one finished dispatch run.
pub fn format_dispatch_report(report: &DispatchReport) -> String {
    format!(
        "<b>Dispatch of {} finished</b>\nTargets: {}\nOK: {}\nERR: {}\nSee /report {}",
        escape_html(report.campaign_id.as_str()),
        report.attempted,
        report.succeeded,
        report.failed,
        escape_html(report.campaign_id.as_str()),
    )
}

/// UTC timestamp as shown to operators.
pub fn format_utc(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// One line per pending scheduled run.
pub fn format_scheduled(runs: &[ScheduledRun]) -> String {
    if runs.is_empty() {
        return "No scheduled dispatches.".to_owned();
    }
    let mut lines = vec![format!("<b>Scheduled ({}):</b>", runs.len())];
    for run in runs {
        let filter = run
            .filter
            .as_ref()
            .map(format_categories)
            .unwrap_or_else(|| "all destinations".to_owned());
        lines.push(format!(
            "  <code>{}</code> at {} [{}]",
            escape_html(run.campaign_id.as_str()),
            format_utc(&run.fire_at),
            filter
        ));
    }
    lines.join("\n")
}
