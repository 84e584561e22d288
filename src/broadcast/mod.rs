//! Broadcast core: drafts, target resolution, dispatch, scheduling, reporting.
//!
//! ```text
//! DraftBuilder --finalize--> CampaignStore
//!                                 |
//!        Scheduler --(timer)--> Dispatcher --Transport--> chats
//!                                 |
//!                            DeliveryLog --> report::{summarize, export}
//! ```

pub mod dispatcher;
pub mod draft;
pub mod payload;
pub mod report;
pub mod resolver;
pub mod scheduler;

pub use dispatcher::{DispatchOutcome, DispatchReport, Dispatcher};
pub use draft::{BeginOutcome, DraftBuilder};
pub use payload::{build_payload, OutboundPayload};
pub use report::{CampaignSummary, ExportFormat};
pub use resolver::resolve_targets;
pub use scheduler::{ScheduledRun, Scheduler};

use crate::store::StoreError;
use crate::types::CampaignId;

/// Errors surfaced to the operator by the broadcast core.
///
/// Per-target transport failures are not here: they are written to the
/// delivery log and never abort a run.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    /// `finalize` was called with no pending draft for the author.
    #[error("no pending draft")]
    NoDraft,

    /// Neither the save call nor the draft named a campaign id.
    #[error("no campaign id given")]
    MissingCampaignId,

    /// The campaign has neither text nor media.
    #[error("campaign {0} is empty: add text or media before sending")]
    InvalidCampaign(CampaignId),

    /// A store backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Writing an export file failed.
    #[error("export failed: {0}")]
    Export(String),
}
