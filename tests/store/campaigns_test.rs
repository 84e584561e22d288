//! Tests for `src/store/campaigns.rs`: last write wins.

use herald::store::{CampaignStore, InMemoryCampaignStore};
use herald::types::{Campaign, CampaignId, CategorySet, MediaRef};

fn campaign(id: &str, text: &str) -> Campaign {
    Campaign {
        id: CampaignId::new(id),
        text: text.to_owned(),
        media: Vec::new(),
        categories: CategorySet::new(),
    }
}

#[tokio::test]
async fn save_then_get_round_trips() {
    let store = InMemoryCampaignStore::new();
    let mut promo = campaign("promo", "<b>Sale</b>");
    promo.media.push(MediaRef::photo("AgAD1"));

    let replaced = store.save(promo.clone()).await.expect("save");
    assert!(!replaced);
    let loaded = store.get(&CampaignId::new("promo")).await.expect("get");
    assert_eq!(loaded, Some(promo));
}

#[tokio::test]
async fn saving_same_id_overwrites() {
    let store = InMemoryCampaignStore::new();
    store.save(campaign("promo", "first")).await.expect("save 1");
    let replaced = store.save(campaign("promo", "second")).await.expect("save 2");
    assert!(replaced);

    let loaded = store
        .get(&CampaignId::new("promo"))
        .await
        .expect("get")
        .expect("present");
    assert_eq!(loaded.text, "second");
    assert_eq!(store.ids().await.expect("ids").len(), 1);
}

#[tokio::test]
async fn ids_are_sorted() {
    let store = InMemoryCampaignStore::new();
    for id in ["zeta", "alpha", "mid"] {
        store.save(campaign(id, "x")).await.expect("save");
    }
    let ids: Vec<String> = store
        .ids()
        .await
        .expect("ids")
        .iter()
        .map(|id| id.as_str().to_owned())
        .collect();
    assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
}

#[tokio::test]
async fn unknown_id_is_none() {
    let store = InMemoryCampaignStore::new();
    assert!(store
        .get(&CampaignId::new("nope"))
        .await
        .expect("get")
        .is_none());
}
