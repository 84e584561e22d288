//! Outbound transport abstraction.
//!
//! The dispatcher talks to the chat platform only through [`Transport`].
//! [`telegram::TelegramTransport`] is the production implementation; tests
//! supply scripted fakes.

use async_trait::async_trait;

use crate::types::{DestinationId, MediaRef};

pub mod telegram;

/// Inline formatting mode for outbound text and captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseFormat {
    /// Telegram HTML subset. Draft text is captured in this form.
    #[default]
    Html,
    /// Unformatted text.
    Plain,
}

/// Errors reported by a transport call.
///
/// The dispatcher records the display text as the failure detail and moves
/// on to the next target; it never retries.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The destination identifier cannot be addressed.
    #[error("invalid destination: {0}")]
    InvalidDestination(String),
    /// The platform asked us to slow down.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the platform asked us to wait.
        retry_after_secs: u64,
    },
    /// Any other API or network failure.
    #[error("transport error: {0}")]
    Api(String),
}

/// Chat platform client used by the dispatcher and the front-end.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Resolve a human-readable name for a destination.
    async fn resolve_display_name(&self, destination: &DestinationId)
        -> Result<String, TransportError>;

    /// Send a formatted text message.
    async fn send_text(
        &self,
        destination: &DestinationId,
        text: &str,
        format: ParseFormat,
    ) -> Result<(), TransportError>;

    /// Send an ordered group of media with an optional caption on the first item.
    async fn send_media_group(
        &self,
        destination: &DestinationId,
        media: &[MediaRef],
        caption: Option<&str>,
        format: ParseFormat,
    ) -> Result<(), TransportError>;
}
