//! Campaign store: campaign id -> saved payload.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{Campaign, CampaignId};

use super::StoreError;

/// Storage for finalized campaigns.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Save a campaign, overwriting any campaign with the same id.
    ///
    /// Returns `true` when an existing campaign was replaced.
    async fn save(&self, campaign: Campaign) -> Result<bool, StoreError>;

    /// Fetch a campaign by id.
    async fn get(&self, id: &CampaignId) -> Result<Option<Campaign>, StoreError>;

    /// All campaign ids, sorted.
    async fn ids(&self) -> Result<Vec<CampaignId>, StoreError>;
}

/// In-memory campaign store.
#[derive(Debug, Default)]
pub struct InMemoryCampaignStore {
    campaigns: Arc<RwLock<HashMap<CampaignId, Campaign>>>,
}

impl InMemoryCampaignStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CampaignStore for InMemoryCampaignStore {
    async fn save(&self, campaign: Campaign) -> Result<bool, StoreError> {
        let id = campaign.id.clone();
        let replaced = self
            .campaigns
            .write()
            .await
            .insert(id.clone(), campaign)
            .is_some();
        debug!(campaign = %id, replaced, "campaign saved");
        Ok(replaced)
    }

    async fn get(&self, id: &CampaignId) -> Result<Option<Campaign>, StoreError> {
        Ok(self.campaigns.read().await.get(id).cloned())
    }

    async fn ids(&self) -> Result<Vec<CampaignId>, StoreError> {
        let mut ids: Vec<CampaignId> = self.campaigns.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
