//! One-shot deferred dispatch.
//!
//! Each scheduled run is a detached Tokio task: timer, then a single
//! [`Dispatcher::dispatch`] call. The caller gets the absolute fire time
//! back and nothing else; the run's outcome shows up in the delivery log.
//! Waiting uses `tokio::time`, so tests drive it with paused time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::types::{CampaignId, CategorySet};

use super::dispatcher::{DispatchOutcome, Dispatcher};

/// A run waiting for its timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledRun {
    /// Run identifier, for logs.
    pub id: Uuid,
    /// Campaign to dispatch.
    pub campaign_id: CampaignId,
    /// Category filter passed to the dispatcher.
    pub filter: Option<CategorySet>,
    /// When the run fires (UTC).
    pub fire_at: DateTime<Utc>,
}

/// Defers dispatcher invocations to a future time.
pub struct Scheduler {
    dispatcher: Arc<Dispatcher>,
    clock: Arc<dyn Clock>,
    pending: Arc<Mutex<HashMap<Uuid, ScheduledRun>>>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler").finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Create a scheduler firing through `dispatcher`.
    pub fn new(dispatcher: Arc<Dispatcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dispatcher,
            clock,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Schedule a dispatch of `campaign_id` after `delay`.
    ///
    /// Must be called from within a Tokio runtime. The run cannot be
    /// withdrawn once scheduled.
    pub async fn schedule_in(
        &self,
        campaign_id: CampaignId,
        delay: Duration,
        filter: Option<CategorySet>,
    ) -> ScheduledRun {
        let now = self.clock.now();
        let fire_at = chrono::Duration::from_std(delay)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let run = ScheduledRun {
            id: Uuid::new_v4(),
            campaign_id,
            filter: filter.filter(|f| !f.is_empty()),
            fire_at,
        };
        self.pending.lock().await.insert(run.id, run.clone());

        info!(
            run = %run.id,
            campaign = %run.campaign_id,
            fire_at = %run.fire_at.to_rfc3339(),
            "dispatch scheduled"
        );

        let dispatcher = Arc::clone(&self.dispatcher);
        let pending = Arc::clone(&self.pending);
        let task = run.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            pending.lock().await.remove(&task.id);

            match dispatcher
                .dispatch(&task.campaign_id, task.filter.as_ref())
                .await
            {
                Ok(DispatchOutcome::Completed(report)) => info!(
                    run = %task.id,
                    campaign = %task.campaign_id,
                    succeeded = report.succeeded,
                    failed = report.failed,
                    "scheduled dispatch completed"
                ),
                Ok(DispatchOutcome::UnknownCampaign) => warn!(
                    run = %task.id,
                    campaign = %task.campaign_id,
                    "scheduled dispatch found no campaign"
                ),
                Err(e) => warn!(
                    run = %task.id,
                    campaign = %task.campaign_id,
                    error = %e,
                    "scheduled dispatch failed"
                ),
            }
        });

        run
    }

    /// Schedule a dispatch `minutes` from now.
    pub async fn schedule_in_minutes(
        &self,
        campaign_id: CampaignId,
        minutes: u32,
        filter: Option<CategorySet>,
    ) -> ScheduledRun {
        let delay = Duration::from_secs(u64::from(minutes).saturating_mul(60));
        self.schedule_in(campaign_id, delay, filter).await
    }

    /// Runs that have not fired yet, earliest first.
    pub async fn pending(&self) -> Vec<ScheduledRun> {
        let mut runs: Vec<ScheduledRun> = self.pending.lock().await.values().cloned().collect();
        runs.sort_by_key(|r| r.fire_at);
        runs
    }
}
