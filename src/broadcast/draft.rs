//! Per-author draft accumulation.
//!
//! Each author has at most one pending draft. Text and media arriving while
//! a draft is pending are appended to it; `finalize` moves it into the
//! campaign store.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::store::CampaignStore;
use crate::types::{AuthorId, Campaign, CampaignId, CategorySet, Draft, MediaRef};

use super::BroadcastError;

/// Result of starting a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeginOutcome {
    /// A previous pending draft was discarded.
    pub replaced: bool,
    /// The discarded draft, if there was one.
    pub discarded: Option<Draft>,
}

/// Pending drafts keyed by author.
#[derive(Debug, Default)]
pub struct DraftBuilder {
    pending: Mutex<HashMap<AuthorId, Draft>>,
}

impl DraftBuilder {
    /// Create a builder with no pending drafts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh draft, replacing any draft already pending for `author`.
    pub async fn begin(&self, author: AuthorId, intended_id: Option<CampaignId>) -> BeginOutcome {
        let draft = Draft::new(author, intended_id);
        let discarded = self.pending.lock().await.insert(author, draft);
        match discarded {
            Some(ref old) => {
                warn!(
                    author = %author,
                    text_len = old.text.len(),
                    media = old.media.len(),
                    "pending draft replaced"
                );
            }
            None => debug!(author = %author, "draft started"),
        }
        BeginOutcome {
            replaced: discarded.is_some(),
            discarded,
        }
    }

    /// Append text to the author's draft. Returns `false` when none is pending.
    pub async fn append_text(&self, author: AuthorId, text: &str) -> bool {
        let mut pending = self.pending.lock().await;
        let Some(draft) = pending.get_mut(&author) else {
            return false;
        };
        if !draft.text.is_empty() {
            draft.text.push('\n');
        }
        draft.text.push_str(text);
        true
    }

    /// Append an attachment to the author's draft. Returns `false` when none is pending.
    pub async fn append_media(&self, author: AuthorId, media: MediaRef) -> bool {
        let mut pending = self.pending.lock().await;
        let Some(draft) = pending.get_mut(&author) else {
            return false;
        };
        debug!(author = %author, kind = media.kind.as_str(), "media appended to draft");
        draft.media.push(media);
        true
    }

    /// Copy of the author's pending draft.
    pub async fn pending(&self, author: AuthorId) -> Option<Draft> {
        self.pending.lock().await.get(&author).cloned()
    }

    /// Save the author's draft as a campaign.
    ///
    /// `campaign_id` overrides the id given when the draft was started. An
    /// existing campaign with the same id is overwritten.
    ///
    /// # Errors
    ///
    /// - [`BroadcastError::NoDraft`] when nothing is pending.
    /// - [`BroadcastError::MissingCampaignId`] when no id is known.
    /// - [`BroadcastError::InvalidCampaign`] when the draft is empty; the
    ///   draft stays pending.
    /// - [`BroadcastError::Store`] when the store rejects the write; the
    ///   draft stays pending.
    pub async fn finalize(
        &self,
        author: AuthorId,
        campaign_id: Option<CampaignId>,
        store: &dyn CampaignStore,
    ) -> Result<Campaign, BroadcastError> {
        let mut pending = self.pending.lock().await;
        let draft = pending.get(&author).ok_or(BroadcastError::NoDraft)?;

        let id = campaign_id
            .or_else(|| draft.intended_id.clone())
            .ok_or(BroadcastError::MissingCampaignId)?;

        if draft.is_empty() {
            return Err(BroadcastError::InvalidCampaign(id));
        }

        let campaign = Campaign {
            id,
            text: draft.text.clone(),
            media: draft.media.clone(),
            categories: CategorySet::new(),
        };
        let replaced = store.save(campaign.clone()).await?;
        pending.remove(&author);

        info!(
            author = %author,
            campaign = %campaign.id,
            media = campaign.media.len(),
            replaced,
            "campaign saved"
        );
        Ok(campaign)
    }
}
