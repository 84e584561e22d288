//! Tests for `src/broadcast/report.rs`: summaries and exports.

use herald::broadcast::report::{
    count_outcomes, export_to_file, summarize, write_csv, write_json_lines,
};
use herald::broadcast::{CampaignSummary, DispatchOutcome, ExportFormat};
use herald::clock::Clock;
use herald::types::{parse_categories, CampaignId, DeliveryRecord, DestinationId};

use crate::mock_transport::{start_time, Fixture, MockTransport};

const HEADER: &str = "campaign_id,destination_id,outcome,error_detail,timestamp";

fn sample_records() -> Vec<DeliveryRecord> {
    vec![
        DeliveryRecord::success(CampaignId::new("c1"), DestinationId::new("-100"), start_time()),
        DeliveryRecord::failure(
            CampaignId::new("c1"),
            DestinationId::new("@chan"),
            "Forbidden: bot was kicked, sorry",
            start_time(),
        ),
    ]
}

#[tokio::test(start_paused = true)]
async fn summary_accumulates_across_runs() {
    let fx = Fixture::new(MockTransport::new().failing_for("b"));
    fx.add_destination("a", "x").await;
    fx.add_destination("b", "y").await;
    fx.add_destination("c", "z").await;
    fx.save_text_campaign("promo", "hi").await;
    fx.save_text_campaign("other", "hi").await;

    let id = CampaignId::new("promo");
    let first = fx.engine.dispatcher.dispatch(&id, None).await.expect("run 1");
    assert!(matches!(first, DispatchOutcome::Completed(_)));
    let filter = parse_categories("x");
    fx.engine
        .dispatcher
        .dispatch(&id, Some(&filter))
        .await
        .expect("run 2");
    fx.engine
        .dispatcher
        .dispatch(&CampaignId::new("other"), None)
        .await
        .expect("other run");

    let summary = summarize(fx.engine.log.as_ref(), &id).await.expect("summary");
    assert_eq!(
        summary,
        CampaignSummary {
            success_count: 3,
            failure_count: 1,
        }
    );
}

#[tokio::test]
async fn unknown_campaign_summary_is_zero() {
    let fx = Fixture::new(MockTransport::new());
    let summary = summarize(fx.engine.log.as_ref(), &CampaignId::new("nothing"))
        .await
        .expect("summary");
    assert_eq!(summary, CampaignSummary::default());
}

#[test]
fn count_outcomes_ignores_other_campaigns() {
    let mut records = sample_records();
    records.push(DeliveryRecord::success(
        CampaignId::new("c2"),
        DestinationId::new("-100"),
        start_time(),
    ));
    let summary = count_outcomes(&records, &CampaignId::new("c1"));
    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.failure_count, 1);
}

#[test]
fn csv_has_header_and_iso_timestamps() {
    let mut out = Vec::new();
    write_csv(&sample_records(), &mut out).expect("write csv");
    let text = String::from_utf8(out).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], HEADER);
    assert_eq!(lines[1], "c1,-100,ok,,2024-05-01T12:00:00.000000Z");
    assert_eq!(
        lines[2],
        "c1,@chan,error,\"Forbidden: bot was kicked, sorry\",2024-05-01T12:00:00.000000Z"
    );
    assert_eq!(lines.len(), 3);
}

#[test]
fn empty_csv_still_has_header() {
    let mut out = Vec::new();
    write_csv(&[], &mut out).expect("write csv");
    assert_eq!(String::from_utf8(out).expect("utf8").trim_end(), HEADER);
}

#[test]
fn json_lines_have_one_object_per_record() {
    let mut out = Vec::new();
    write_json_lines(&sample_records(), &mut out).expect("write jsonl");
    let text = String::from_utf8(out).expect("utf8");

    let rows: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).expect("valid json"))
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["outcome"], "ok");
    assert_eq!(rows[1]["outcome"], "error");
    assert_eq!(rows[1]["destination_id"], "@chan");
    assert_eq!(rows[0]["timestamp"], "2024-05-01T12:00:00.000000Z");
}

#[tokio::test]
async fn export_to_file_writes_timestamped_file() {
    let fx = Fixture::new(MockTransport::new());
    for record in sample_records() {
        fx.engine.log.append(record).await.expect("append");
    }
    let dir = fx.export_dir();

    let csv_path = export_to_file(
        fx.engine.log.as_ref(),
        &dir,
        ExportFormat::Csv,
        fx.clock.as_ref(),
    )
    .await
    .expect("export csv");
    let expected_name = format!("deliveries_{}.csv", fx.clock.now().timestamp());
    assert_eq!(
        csv_path.file_name().and_then(|n| n.to_str()),
        Some(expected_name.as_str())
    );
    let contents = std::fs::read_to_string(&csv_path).expect("read export");
    assert!(contents.starts_with(HEADER));
    assert_eq!(contents.lines().count(), 3);

    let json_path = export_to_file(
        fx.engine.log.as_ref(),
        &dir,
        ExportFormat::JsonLines,
        fx.clock.as_ref(),
    )
    .await
    .expect("export jsonl");
    assert_eq!(json_path.extension().and_then(|e| e.to_str()), Some("jsonl"));
    assert_eq!(
        std::fs::read_to_string(&json_path)
            .expect("read export")
            .lines()
            .count(),
        2
    );
}

#[tokio::test]
async fn exports_in_the_same_second_do_not_overwrite() {
    let fx = Fixture::new(MockTransport::new());
    let dir = fx.export_dir();
    fx.engine
        .log
        .append(sample_records().remove(0))
        .await
        .expect("append");

    let first = export_to_file(
        fx.engine.log.as_ref(),
        &dir,
        ExportFormat::Csv,
        fx.clock.as_ref(),
    )
    .await
    .expect("first export");

    for record in sample_records() {
        fx.engine.log.append(record).await.expect("append");
    }
    let second = export_to_file(
        fx.engine.log.as_ref(),
        &dir,
        ExportFormat::Csv,
        fx.clock.as_ref(),
    )
    .await
    .expect("second export");

    assert_ne!(first, second);
    let expected_second = format!("deliveries_{}_1.csv", fx.clock.now().timestamp());
    assert_eq!(
        second.file_name().and_then(|n| n.to_str()),
        Some(expected_second.as_str())
    );
    let read_lines = |p: &std::path::Path| {
        std::fs::read_to_string(p)
            .expect("read export")
            .lines()
            .count()
    };
    assert_eq!(read_lines(&first), 2);
    assert_eq!(read_lines(&second), 4);
}
