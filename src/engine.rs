//! Wiring of stores, dispatcher and scheduler into one owned service object.
//!
//! The front-end and the binary hold an `Arc<Engine>`; tests build one over
//! a fake transport and a manual clock.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::broadcast::{Dispatcher, DraftBuilder, Scheduler};
use crate::clock::Clock;
use crate::store::{
    CampaignStore, DeliveryLog, DestinationRegistry, InMemoryCampaignStore, InMemoryDeliveryLog,
    InMemoryDestinationRegistry,
};
use crate::transport::Transport;

/// Every broadcast component, shared by reference.
pub struct Engine {
    /// Registered destinations.
    pub destinations: Arc<dyn DestinationRegistry>,
    /// Saved campaigns.
    pub campaigns: Arc<dyn CampaignStore>,
    /// Delivery attempts.
    pub log: Arc<dyn DeliveryLog>,
    /// Pending drafts per author.
    pub drafts: DraftBuilder,
    /// Fan-out sender.
    pub dispatcher: Arc<Dispatcher>,
    /// Deferred runs.
    pub scheduler: Scheduler,
    /// Chat platform client.
    pub transport: Arc<dyn Transport>,
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
    /// Where exports are written.
    pub export_dir: PathBuf,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("dispatcher", &self.dispatcher)
            .field("export_dir", &self.export_dir)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Build an engine over explicit stores.
    pub fn with_stores(
        destinations: Arc<dyn DestinationRegistry>,
        campaigns: Arc<dyn CampaignStore>,
        log: Arc<dyn DeliveryLog>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        send_interval: Duration,
        export_dir: PathBuf,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&campaigns),
            Arc::clone(&destinations),
            Arc::clone(&log),
            Arc::clone(&transport),
            Arc::clone(&clock),
            send_interval,
        ));
        let scheduler = Scheduler::new(Arc::clone(&dispatcher), Arc::clone(&clock));
        Self {
            destinations,
            campaigns,
            log,
            drafts: DraftBuilder::new(),
            dispatcher,
            scheduler,
            transport,
            clock,
            export_dir,
        }
    }

    /// Build an engine with fresh in-memory stores.
    pub fn in_memory(
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        send_interval: Duration,
        export_dir: PathBuf,
    ) -> Self {
        Self::with_stores(
            Arc::new(InMemoryDestinationRegistry::new()),
            Arc::new(InMemoryCampaignStore::new()),
            Arc::new(InMemoryDeliveryLog::new()),
            transport,
            clock,
            send_interval,
            export_dir,
        )
    }
}
