//! Append-only delivery log.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::types::{CampaignId, DeliveryRecord};

use super::StoreError;

/// Ordered log of delivery attempts. Records are never mutated or removed.
#[async_trait]
pub trait DeliveryLog: Send + Sync {
    /// Append one record.
    async fn append(&self, record: DeliveryRecord) -> Result<(), StoreError>;

    /// Snapshot of every record in append order.
    async fn snapshot(&self) -> Result<Vec<DeliveryRecord>, StoreError>;

    /// Records for one campaign in append order.
    async fn for_campaign(&self, id: &CampaignId) -> Result<Vec<DeliveryRecord>, StoreError>;
}

/// In-memory delivery log.
#[derive(Debug, Default)]
pub struct InMemoryDeliveryLog {
    records: Arc<RwLock<Vec<DeliveryRecord>>>,
}

impl InMemoryDeliveryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeliveryLog for InMemoryDeliveryLog {
    async fn append(&self, record: DeliveryRecord) -> Result<(), StoreError> {
        trace!(
            campaign = %record.campaign_id,
            destination = %record.destination_id,
            outcome = record.outcome.as_str(),
            "delivery recorded"
        );
        self.records.write().await.push(record);
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<DeliveryRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn for_campaign(&self, id: &CampaignId) -> Result<Vec<DeliveryRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| &r.campaign_id == id)
            .cloned()
            .collect())
    }
}
