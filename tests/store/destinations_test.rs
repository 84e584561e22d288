//! Tests for `src/store/destinations.rs`: registration order and upserts.

use herald::store::{DestinationRegistry, InMemoryDestinationRegistry};
use herald::types::{parse_categories, DestinationId};

#[tokio::test]
async fn all_returns_registration_order() {
    let registry = InMemoryDestinationRegistry::new();
    for id in ["-1003", "-1001", "@news"] {
        registry
            .register(DestinationId::new(id), None, parse_categories("x"))
            .await
            .expect("register");
    }

    let ids: Vec<String> = registry
        .all()
        .await
        .expect("all")
        .into_iter()
        .map(|d| d.id.as_str().to_owned())
        .collect();
    assert_eq!(ids, vec!["-1003", "-1001", "@news"]);
}

#[tokio::test]
async fn reregister_updates_in_place_and_keeps_position() {
    let registry = InMemoryDestinationRegistry::new();
    registry
        .register(DestinationId::new("a"), Some("Alpha".into()), parse_categories("x"))
        .await
        .expect("register a");
    registry
        .register(DestinationId::new("b"), None, parse_categories("y"))
        .await
        .expect("register b");

    let updated = registry
        .register(DestinationId::new("a"), Some("Alpha 2".into()), parse_categories("z, w"))
        .await
        .expect("re-register a");
    assert_eq!(updated.title, "Alpha 2");
    assert_eq!(updated.categories, parse_categories("w,z"));

    assert_eq!(registry.count().await.expect("count"), 2);
    let all = registry.all().await.expect("all");
    assert_eq!(all[0].id.as_str(), "a");
    assert_eq!(all[0].categories, parse_categories("z,w"));
    assert_eq!(all[1].id.as_str(), "b");
}

#[tokio::test]
async fn get_returns_none_for_unknown_id() {
    let registry = InMemoryDestinationRegistry::new();
    let found = registry
        .get(&DestinationId::new("missing"))
        .await
        .expect("get");
    assert!(found.is_none());
    assert_eq!(registry.count().await.expect("count"), 0);
}

#[tokio::test]
async fn empty_categories_are_allowed() {
    let registry = InMemoryDestinationRegistry::new();
    let dest = registry
        .register(DestinationId::new("-100"), Some("Lobby".into()), parse_categories(" , "))
        .await
        .expect("register");
    assert!(dest.categories.is_empty());
    assert_eq!(dest.title, "Lobby");
}
