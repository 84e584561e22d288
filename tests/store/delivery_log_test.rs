//! Tests for `src/store/delivery_log.rs`: append order and snapshots.

use chrono::{DateTime, Utc};

use herald::store::{DeliveryLog, InMemoryDeliveryLog};
use herald::types::{CampaignId, DeliveryOutcome, DeliveryRecord, DestinationId};

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("valid timestamp")
}

#[tokio::test]
async fn snapshot_preserves_append_order() {
    let log = InMemoryDeliveryLog::new();
    log.append(DeliveryRecord::success(
        CampaignId::new("c1"),
        DestinationId::new("a"),
        at(10),
    ))
    .await
    .expect("append");
    log.append(DeliveryRecord::failure(
        CampaignId::new("c2"),
        DestinationId::new("b"),
        "chat not found",
        at(5),
    ))
    .await
    .expect("append");

    let all = log.snapshot().await.expect("snapshot");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].campaign_id.as_str(), "c1");
    assert_eq!(all[1].outcome, DeliveryOutcome::Failure);
    assert_eq!(all[1].error_detail, "chat not found");
}

#[tokio::test]
async fn snapshot_is_not_affected_by_later_appends() {
    let log = InMemoryDeliveryLog::new();
    log.append(DeliveryRecord::success(
        CampaignId::new("c1"),
        DestinationId::new("a"),
        at(1),
    ))
    .await
    .expect("append");

    let before = log.snapshot().await.expect("snapshot");
    log.append(DeliveryRecord::success(
        CampaignId::new("c1"),
        DestinationId::new("b"),
        at(2),
    ))
    .await
    .expect("append");

    assert_eq!(before.len(), 1);
    assert_eq!(log.snapshot().await.expect("snapshot").len(), 2);
}

#[tokio::test]
async fn for_campaign_filters_by_id() {
    let log = InMemoryDeliveryLog::new();
    for (campaign, dest) in [("c1", "a"), ("c2", "a"), ("c1", "b")] {
        log.append(DeliveryRecord::success(
            CampaignId::new(campaign),
            DestinationId::new(dest),
            at(1),
        ))
        .await
        .expect("append");
    }

    let c1 = log
        .for_campaign(&CampaignId::new("c1"))
        .await
        .expect("for_campaign");
    let dests: Vec<&str> = c1.iter().map(|r| r.destination_id.as_str()).collect();
    assert_eq!(dests, vec!["a", "b"]);
}
