//! Repositories for destinations, campaigns and the delivery log.
//!
//! Each store is a trait with an in-memory implementation. Components receive
//! `Arc<dyn ...>` handles, so a persistent backend can be dropped in without
//! touching dispatch or reporting code.
//!
//! # Locking
//!
//! Entries are keyed independently and the delivery log is append-only, so
//! every operation takes its lock for a single read or write and releases it
//! before returning. Concurrent dispatch runs interleave freely.

pub mod campaigns;
pub mod delivery_log;
pub mod destinations;

pub use campaigns::{CampaignStore, InMemoryCampaignStore};
pub use delivery_log::{DeliveryLog, InMemoryDeliveryLog};
pub use destinations::{DestinationRegistry, InMemoryDestinationRegistry};

/// Errors from a store backend.
///
/// The in-memory stores never fail; persistent backends report here.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be read or written.
    #[error("store backend error: {0}")]
    Backend(String),
}
