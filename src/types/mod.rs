//! Core data model shared by the stores, the dispatcher and the front-end.
//!
//! Identifiers are newtypes so a campaign id can never be passed where a
//! destination id is expected. All types serialize with serde so stores can
//! be swapped for persistent ones without touching the dispatch logic.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Opaque identifier of a destination chat or channel.
///
/// Either a numeric Telegram chat id (`-1001234567890`) or a public
/// username (`@channel`). Kept verbatim as entered by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationId(String);

impl DestinationId {
    /// Wrap a raw destination identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DestinationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Operator-chosen campaign identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(String);

impl CampaignId {
    /// Wrap a raw campaign identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CampaignId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Telegram user id of the operator composing a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(pub i64);

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Set of free-form category tags.
pub type CategorySet = BTreeSet<String>;

/// Split a comma-separated category string into a set.
///
/// Tokens are trimmed and empty tokens are dropped, so `"news, , promo"`
/// yields `{"news", "promo"}`.
pub fn parse_categories(raw: &str) -> CategorySet {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

// ---------------------------------------------------------------------------
// Destinations
// ---------------------------------------------------------------------------

/// A registered outbound chat or channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Chat identifier.
    pub id: DestinationId,
    /// Display name; the id itself when no name could be resolved.
    pub title: String,
    /// Category tags used by the target resolver.
    pub categories: CategorySet,
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// Media type captured when the attachment was added to a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Still image.
    Photo,
    /// Video clip.
    Video,
    /// Any other file.
    Document,
}

impl MediaKind {
    /// Lowercase name used in replies and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Document => "document",
        }
    }
}

/// Opaque transport file handle tagged with its media kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// Media type supplied by the caller at append time.
    pub kind: MediaKind,
    /// Previously uploaded file token; never inspected.
    pub file_id: String,
}

impl MediaRef {
    /// Photo attachment.
    pub fn photo(file_id: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Photo,
            file_id: file_id.into(),
        }
    }

    /// Video attachment.
    pub fn video(file_id: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Video,
            file_id: file_id.into(),
        }
    }

    /// Document attachment.
    pub fn document(file_id: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Document,
            file_id: file_id.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Drafts and campaigns
// ---------------------------------------------------------------------------

/// An in-progress campaign accumulated for one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    /// Composing operator.
    pub author: AuthorId,
    /// Campaign id named when the draft was started, if any.
    pub intended_id: Option<CampaignId>,
    /// Accumulated HTML text, possibly empty.
    pub text: String,
    /// Ordered attachments, possibly empty.
    pub media: Vec<MediaRef>,
}

impl Draft {
    /// Empty draft for an author.
    pub fn new(author: AuthorId, intended_id: Option<CampaignId>) -> Self {
        Self {
            author,
            intended_id,
            text: String::new(),
            media: Vec::new(),
        }
    }

    /// True when there is neither text nor media.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.media.is_empty()
    }
}

/// A saved, reusable broadcast payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    /// Campaign identifier.
    pub id: CampaignId,
    /// HTML text body; used as the caption when media is present.
    pub text: String,
    /// Ordered attachments.
    pub media: Vec<MediaRef>,
    /// Stored category restriction; empty on creation.
    pub categories: CategorySet,
}

impl Campaign {
    /// A campaign with no text and no media cannot be sent.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.media.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Delivery log
// ---------------------------------------------------------------------------

/// Result of one send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryOutcome {
    /// The transport acknowledged the message.
    #[serde(rename = "ok")]
    Success,
    /// The transport rejected the message or was unreachable.
    #[serde(rename = "error")]
    Failure,
}

impl DeliveryOutcome {
    /// Wire name used in exports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "ok",
            Self::Failure => "error",
        }
    }
}

/// Immutable log entry for one (campaign, destination) send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// Campaign that was dispatched.
    pub campaign_id: CampaignId,
    /// Destination that was addressed.
    pub destination_id: DestinationId,
    /// Attempt outcome.
    pub outcome: DeliveryOutcome,
    /// Transport error text; empty on success.
    pub error_detail: String,
    /// When the attempt finished.
    pub timestamp: DateTime<Utc>,
}

impl DeliveryRecord {
    /// Successful attempt.
    pub fn success(
        campaign_id: CampaignId,
        destination_id: DestinationId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            campaign_id,
            destination_id,
            outcome: DeliveryOutcome::Success,
            error_detail: String::new(),
            timestamp,
        }
    }

    /// Failed attempt with the transport's error detail.
    pub fn failure(
        campaign_id: CampaignId,
        destination_id: DestinationId,
        error_detail: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            campaign_id,
            destination_id,
            outcome: DeliveryOutcome::Failure,
            error_detail: error_detail.into(),
            timestamp,
        }
    }
}
