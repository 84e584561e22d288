//! Tests for `src/telegram/ui.rs`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use herald::broadcast::{CampaignSummary, DispatchReport, ScheduledRun};
use herald::telegram::ui::{
    format_destination, format_dispatch_report, format_draft, format_scheduled, format_summary,
    format_utc,
};
use herald::types::{
    parse_categories, AuthorId, CampaignId, Destination, DestinationId, Draft, MediaRef,
};

fn noon() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

#[test]
fn summary_shows_ok_and_err_counts() {
    let text = format_summary(
        &CampaignId::new("promo"),
        &CampaignSummary {
            success_count: 3,
            failure_count: 1,
        },
    );
    assert_eq!(text, "<b>Report promo</b>\nOK: 3\nERR: 1");
}

#[test]
fn destination_title_is_escaped() {
    let dest = Destination {
        id: DestinationId::new("-100"),
        title: "Tom & Jerry <3".to_owned(),
        categories: parse_categories("fun"),
    };
    assert_eq!(
        format_destination(&dest),
        "<b>Tom &amp; Jerry &lt;3</b> <code>-100</code> [fun]"
    );
}

#[test]
fn draft_counts_media_by_kind() {
    let mut draft = Draft::new(AuthorId(1), Some(CampaignId::new("c")));
    draft.text.push_str("hello");
    draft.media.push(MediaRef::photo("p1"));
    draft.media.push(MediaRef::photo("p2"));
    draft.media.push(MediaRef::document("d1"));

    let text = format_draft(&draft);
    assert!(text.contains("<code>c</code>"));
    assert!(text.contains("Text: 5 chars"));
    assert!(text.contains("2 photo, 0 video, 1 document"));
}

#[test]
fn dispatch_report_mentions_report_command() {
    let text = format_dispatch_report(&DispatchReport {
        campaign_id: CampaignId::new("promo"),
        attempted: 4,
        succeeded: 3,
        failed: 1,
    });
    assert!(text.contains("Targets: 4"));
    assert!(text.contains("/report promo"));
}

#[test]
fn scheduled_listing() {
    assert_eq!(format_scheduled(&[]), "No scheduled dispatches.");

    let runs = vec![
        ScheduledRun {
            id: Uuid::new_v4(),
            campaign_id: CampaignId::new("a"),
            filter: None,
            fire_at: noon(),
        },
        ScheduledRun {
            id: Uuid::new_v4(),
            campaign_id: CampaignId::new("b"),
            filter: Some(parse_categories("news")),
            fire_at: noon(),
        },
    ];
    let text = format_scheduled(&runs);
    assert!(text.starts_with("<b>Scheduled (2):</b>"));
    assert!(text.contains("<code>a</code> at 2024-05-01 12:00:00 UTC [all destinations]"));
    assert!(text.contains("[news]"));
}

#[test]
fn utc_format_is_human_readable() {
    assert_eq!(format_utc(&noon()), "2024-05-01 12:00:00 UTC");
}
