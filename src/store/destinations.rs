//! Destination registry: chat id -> title and category tags.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{CategorySet, Destination, DestinationId};

use super::StoreError;

/// Registry of outbound destinations.
#[async_trait]
pub trait DestinationRegistry: Send + Sync {
    /// Insert or replace a destination.
    ///
    /// Re-registering an id replaces its title and categories (last write
    /// wins) but keeps its original registration position. A missing title
    /// falls back to the id.
    async fn register(
        &self,
        id: DestinationId,
        title: Option<String>,
        categories: CategorySet,
    ) -> Result<Destination, StoreError>;

    /// Snapshot of all destinations in registration order.
    async fn all(&self) -> Result<Vec<Destination>, StoreError>;

    /// Look up a single destination.
    async fn get(&self, id: &DestinationId) -> Result<Option<Destination>, StoreError>;

    /// Number of registered destinations.
    async fn count(&self) -> Result<usize, StoreError>;
}

#[derive(Debug, Default)]
struct Inner {
    order: Vec<DestinationId>,
    entries: HashMap<DestinationId, Destination>,
}

/// In-memory registry that keeps insertion order.
#[derive(Debug, Default)]
pub struct InMemoryDestinationRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryDestinationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DestinationRegistry for InMemoryDestinationRegistry {
    async fn register(
        &self,
        id: DestinationId,
        title: Option<String>,
        categories: CategorySet,
    ) -> Result<Destination, StoreError> {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| id.to_string());
        let destination = Destination {
            id: id.clone(),
            title,
            categories,
        };

        let mut inner = self.inner.write().await;
        if inner.entries.insert(id.clone(), destination.clone()).is_none() {
            inner.order.push(id);
        }
        debug!(destination = %destination.id, title = %destination.title, "destination registered");
        Ok(destination)
    }

    async fn all(&self) -> Result<Vec<Destination>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.entries.get(id).cloned())
            .collect())
    }

    async fn get(&self, id: &DestinationId) -> Result<Option<Destination>, StoreError> {
        Ok(self.inner.read().await.entries.get(id).cloned())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().await.order.len())
    }
}
