//! Tests for `src/broadcast/draft.rs`: accumulation and finalize rules.

use herald::broadcast::{BroadcastError, DraftBuilder};
use herald::store::{CampaignStore, InMemoryCampaignStore};
use herald::types::{AuthorId, CampaignId, MediaKind, MediaRef};

const ALICE: AuthorId = AuthorId(1);
const BOB: AuthorId = AuthorId(2);

#[tokio::test]
async fn text_parts_are_joined_with_newlines() {
    let drafts = DraftBuilder::new();
    let store = InMemoryCampaignStore::new();
    drafts.begin(ALICE, Some(CampaignId::new("c1"))).await;
    assert!(drafts.append_text(ALICE, "a").await);
    assert!(drafts.append_text(ALICE, "b").await);

    let campaign = drafts.finalize(ALICE, None, &store).await.expect("finalize");
    assert_eq!(campaign.text, "a\nb");
    assert_eq!(campaign.id.as_str(), "c1");
    assert!(campaign.categories.is_empty());
}

#[tokio::test]
async fn media_order_is_preserved() {
    let drafts = DraftBuilder::new();
    let store = InMemoryCampaignStore::new();
    drafts.begin(ALICE, Some(CampaignId::new("album"))).await;
    drafts.append_media(ALICE, MediaRef::video("v")).await;
    drafts.append_media(ALICE, MediaRef::photo("p")).await;
    drafts.append_media(ALICE, MediaRef::document("d")).await;

    let campaign = drafts.finalize(ALICE, None, &store).await.expect("finalize");
    let kinds: Vec<MediaKind> = campaign.media.iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![MediaKind::Video, MediaKind::Photo, MediaKind::Document]);
    assert!(campaign.text.is_empty());
}

#[tokio::test]
async fn appends_without_a_draft_are_ignored() {
    let drafts = DraftBuilder::new();
    assert!(!drafts.append_text(ALICE, "stray").await);
    assert!(!drafts.append_media(ALICE, MediaRef::photo("p")).await);
    assert!(drafts.pending(ALICE).await.is_none());
}

#[tokio::test]
async fn drafts_are_isolated_per_author() {
    let drafts = DraftBuilder::new();
    drafts.begin(ALICE, Some(CampaignId::new("a"))).await;
    drafts.begin(BOB, Some(CampaignId::new("b"))).await;
    drafts.append_text(ALICE, "from alice").await;

    let bob = drafts.pending(BOB).await.expect("bob draft");
    assert!(bob.text.is_empty());
    let alice = drafts.pending(ALICE).await.expect("alice draft");
    assert_eq!(alice.text, "from alice");
}

#[tokio::test]
async fn begin_again_discards_previous_draft() {
    let drafts = DraftBuilder::new();
    let first = drafts.begin(ALICE, Some(CampaignId::new("one"))).await;
    assert!(!first.replaced);
    drafts.append_text(ALICE, "old").await;

    let second = drafts.begin(ALICE, Some(CampaignId::new("two"))).await;
    assert!(second.replaced);
    assert_eq!(second.discarded.map(|d| d.text), Some("old".to_owned()));

    let pending = drafts.pending(ALICE).await.expect("draft");
    assert!(pending.text.is_empty());
    assert_eq!(pending.intended_id, Some(CampaignId::new("two")));
}

#[tokio::test]
async fn finalize_without_draft_fails() {
    let drafts = DraftBuilder::new();
    let store = InMemoryCampaignStore::new();
    let err = drafts
        .finalize(ALICE, Some(CampaignId::new("c")), &store)
        .await
        .expect_err("no draft");
    assert!(matches!(err, BroadcastError::NoDraft));
    assert!(store.ids().await.expect("ids").is_empty());
}

#[tokio::test]
async fn finalize_needs_some_campaign_id() {
    let drafts = DraftBuilder::new();
    let store = InMemoryCampaignStore::new();
    drafts.begin(ALICE, None).await;
    drafts.append_text(ALICE, "x").await;

    let err = drafts
        .finalize(ALICE, None, &store)
        .await
        .expect_err("missing id");
    assert!(matches!(err, BroadcastError::MissingCampaignId));

    let campaign = drafts
        .finalize(ALICE, Some(CampaignId::new("late")), &store)
        .await
        .expect("finalize with id");
    assert_eq!(campaign.id.as_str(), "late");
}

#[tokio::test]
async fn explicit_id_overrides_intended_id() {
    let drafts = DraftBuilder::new();
    let store = InMemoryCampaignStore::new();
    drafts.begin(ALICE, Some(CampaignId::new("draft-id"))).await;
    drafts.append_text(ALICE, "x").await;

    drafts
        .finalize(ALICE, Some(CampaignId::new("final-id")), &store)
        .await
        .expect("finalize");
    assert!(store
        .get(&CampaignId::new("final-id"))
        .await
        .expect("get")
        .is_some());
    assert!(store
        .get(&CampaignId::new("draft-id"))
        .await
        .expect("get")
        .is_none());
}

#[tokio::test]
async fn empty_draft_is_rejected_and_kept() {
    let drafts = DraftBuilder::new();
    let store = InMemoryCampaignStore::new();
    drafts.begin(ALICE, Some(CampaignId::new("empty"))).await;

    let err = drafts
        .finalize(ALICE, None, &store)
        .await
        .expect_err("empty draft");
    assert!(matches!(err, BroadcastError::InvalidCampaign(_)));
    assert!(drafts.pending(ALICE).await.is_some());
    assert!(store.ids().await.expect("ids").is_empty());
}

#[tokio::test]
async fn finalize_clears_draft_and_overwrites_campaign() {
    let drafts = DraftBuilder::new();
    let store = InMemoryCampaignStore::new();

    drafts.begin(ALICE, Some(CampaignId::new("promo"))).await;
    drafts.append_text(ALICE, "v1").await;
    drafts.finalize(ALICE, None, &store).await.expect("first save");
    assert!(drafts.pending(ALICE).await.is_none());

    drafts.begin(ALICE, Some(CampaignId::new("promo"))).await;
    drafts.append_text(ALICE, "v2").await;
    drafts.finalize(ALICE, None, &store).await.expect("second save");

    let saved = store
        .get(&CampaignId::new("promo"))
        .await
        .expect("get")
        .expect("present");
    assert_eq!(saved.text, "v2");
}
