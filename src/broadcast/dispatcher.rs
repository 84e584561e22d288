//! Rate-limited fan-out of one campaign to its resolved targets.
//!
//! Targets are addressed one at a time. Every attempt is logged; a failed
//! target never stops the run. Between targets the loop sleeps for the
//! configured send interval to stay under the platform's rate limits.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::store::{CampaignStore, DeliveryLog, DestinationRegistry};
use crate::transport::{ParseFormat, Transport};
use crate::types::{CampaignId, CategorySet, DeliveryRecord, DestinationId};

use super::payload::{build_payload, OutboundPayload};
use super::resolver::resolve_targets;
use super::BroadcastError;

/// Minimum pause between two sends of the same run.
pub const MIN_SEND_INTERVAL: Duration = Duration::from_millis(400);

/// Counts for one completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Campaign that was sent.
    pub campaign_id: CampaignId,
    /// Number of targets addressed.
    pub attempted: usize,
    /// Targets that acknowledged.
    pub succeeded: usize,
    /// Targets that failed.
    pub failed: usize,
}

/// Result of a dispatch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No campaign with that id exists; nothing was sent or logged.
    UnknownCampaign,
    /// Every resolved target was attempted.
    Completed(DispatchReport),
}

/// Orchestrates dispatch runs.
#[derive(Clone)]
pub struct Dispatcher {
    campaigns: Arc<dyn CampaignStore>,
    destinations: Arc<dyn DestinationRegistry>,
    log: Arc<dyn DeliveryLog>,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    send_interval: Duration,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("send_interval", &self.send_interval)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Build a dispatcher over the given stores and transport.
    ///
    /// `send_interval` is raised to [`MIN_SEND_INTERVAL`] when lower.
    pub fn new(
        campaigns: Arc<dyn CampaignStore>,
        destinations: Arc<dyn DestinationRegistry>,
        log: Arc<dyn DeliveryLog>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        send_interval: Duration,
    ) -> Self {
        Self {
            campaigns,
            destinations,
            log,
            transport,
            clock,
            send_interval: send_interval.max(MIN_SEND_INTERVAL),
        }
    }

    /// Effective pause between sends.
    pub fn send_interval(&self) -> Duration {
        self.send_interval
    }

    /// Send a campaign to every matching destination.
    ///
    /// `filter` overrides the campaign's stored categories when non-empty.
    ///
    /// # Errors
    ///
    /// - [`BroadcastError::InvalidCampaign`] when the campaign is empty;
    ///   nothing is sent and nothing is logged.
    /// - [`BroadcastError::Store`] when a store fails. Records written
    ///   before the failure stay in the log.
    pub async fn dispatch(
        &self,
        campaign_id: &CampaignId,
        filter: Option<&CategorySet>,
    ) -> Result<DispatchOutcome, BroadcastError> {
        let Some(campaign) = self.campaigns.get(campaign_id).await? else {
            info!(campaign = %campaign_id, "dispatch skipped: unknown campaign");
            return Ok(DispatchOutcome::UnknownCampaign);
        };

        let payload = match build_payload(&campaign) {
            Ok(p) => p,
            Err(e) => {
                warn!(campaign = %campaign_id, "dispatch refused: empty campaign");
                return Err(e);
            }
        };

        let effective = filter
            .filter(|f| !f.is_empty())
            .unwrap_or(&campaign.categories);
        let destinations = self.destinations.all().await?;
        let targets = resolve_targets(&destinations, Some(effective));

        info!(
            campaign = %campaign_id,
            targets = targets.len(),
            filter = ?effective,
            "dispatch started"
        );

        let mut report = DispatchReport {
            campaign_id: campaign_id.clone(),
            attempted: 0,
            succeeded: 0,
            failed: 0,
        };

        for (i, target) in targets.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.send_interval).await;
            }

            report.attempted = report.attempted.saturating_add(1);
            let record = match self.send(target, &payload).await {
                Ok(()) => {
                    report.succeeded = report.succeeded.saturating_add(1);
                    debug!(campaign = %campaign_id, destination = %target, "delivered");
                    DeliveryRecord::success(campaign_id.clone(), target.clone(), self.clock.now())
                }
                Err(detail) => {
                    report.failed = report.failed.saturating_add(1);
                    warn!(
                        campaign = %campaign_id,
                        destination = %target,
                        error = %detail,
                        "delivery failed"
                    );
                    DeliveryRecord::failure(
                        campaign_id.clone(),
                        target.clone(),
                        detail,
                        self.clock.now(),
                    )
                }
            };
            self.log.append(record).await?;
        }

        info!(
            campaign = %campaign_id,
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            "dispatch finished"
        );
        Ok(DispatchOutcome::Completed(report))
    }

    /// One transport call; the error is flattened to its display text.
    async fn send(&self, target: &DestinationId, payload: &OutboundPayload) -> Result<(), String> {
        let result = match payload {
            OutboundPayload::Text { text } => {
                self.transport
                    .send_text(target, text, ParseFormat::Html)
                    .await
            }
            OutboundPayload::MediaGroup { media, caption } => {
                self.transport
                    .send_media_group(target, media, caption.as_deref(), ParseFormat::Html)
                    .await
            }
        };
        result.map_err(|e| e.to_string())
    }
}
