//! Outbound payload construction.

use crate::types::{Campaign, MediaRef};

use super::BroadcastError;

/// What gets sent to every target of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundPayload {
    /// Formatted text message.
    Text {
        /// HTML body.
        text: String,
    },
    /// Ordered media album; the caption belongs to the first item only.
    MediaGroup {
        /// Attachments in draft order.
        media: Vec<MediaRef>,
        /// HTML caption for the first item.
        caption: Option<String>,
    },
}

/// Build the payload for a campaign.
///
/// # Errors
///
/// Returns [`BroadcastError::InvalidCampaign`] when the campaign has neither
/// text nor media.
pub fn build_payload(campaign: &Campaign) -> Result<OutboundPayload, BroadcastError> {
    if !campaign.media.is_empty() {
        let caption = Some(campaign.text.clone()).filter(|t| !t.is_empty());
        return Ok(OutboundPayload::MediaGroup {
            media: campaign.media.clone(),
            caption,
        });
    }
    if !campaign.text.is_empty() {
        return Ok(OutboundPayload::Text {
            text: campaign.text.clone(),
        });
    }
    Err(BroadcastError::InvalidCampaign(campaign.id.clone()))
}
