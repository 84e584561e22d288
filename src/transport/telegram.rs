//! Telegram Bot API transport built on teloxide.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    InputFile, InputMedia, InputMediaDocument, InputMediaPhoto, InputMediaVideo, ParseMode,
    Recipient,
};
use teloxide::{ApiError, RequestError};
use tracing::debug;

use crate::types::{DestinationId, MediaKind, MediaRef};

use super::{ParseFormat, Transport, TransportError};

/// Telegram rejects media groups larger than this.
const MAX_GROUP_SIZE: usize = 10;

/// [`Transport`] that talks to the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport").finish_non_exhaustive()
    }
}

impl TelegramTransport {
    /// Wrap a bot handle.
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Map a destination id onto a Bot API recipient.
///
/// Numeric ids become chat ids; anything else is treated as a public
/// username and gets a leading `@` when it is missing.
pub fn recipient_for(destination: &DestinationId) -> Result<Recipient, TransportError> {
    let raw = destination.as_str().trim();
    if raw.is_empty() {
        return Err(TransportError::InvalidDestination(
            "empty destination id".to_owned(),
        ));
    }
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }
    if raw.chars().any(char::is_whitespace) {
        return Err(TransportError::InvalidDestination(raw.to_owned()));
    }
    let username = if raw.starts_with('@') {
        raw.to_owned()
    } else {
        format!("@{raw}")
    };
    Ok(Recipient::ChannelUsername(username))
}

fn parse_mode(format: ParseFormat) -> Option<ParseMode> {
    match format {
        ParseFormat::Html => Some(ParseMode::Html),
        ParseFormat::Plain => None,
    }
}

fn map_request_error(err: RequestError) -> TransportError {
    match err {
        RequestError::RetryAfter(secs) => TransportError::RateLimited {
            retry_after_secs: u64::from(secs.seconds()),
        },
        RequestError::Api(ApiError::ChatNotFound) => {
            TransportError::InvalidDestination("chat not found".to_owned())
        }
        other => TransportError::Api(other.to_string()),
    }
}

/// Build one album entry, attaching the caption when given.
fn input_media(item: &MediaRef, caption: Option<&str>, format: ParseFormat) -> InputMedia {
    let file = InputFile::file_id(item.file_id.clone());
    let mode = parse_mode(format);
    match item.kind {
        MediaKind::Photo => {
            let mut media = InputMediaPhoto::new(file);
            if let Some(text) = caption {
                media = media.caption(text.to_owned());
                if let Some(mode) = mode {
                    media = media.parse_mode(mode);
                }
            }
            InputMedia::Photo(media)
        }
        MediaKind::Video => {
            let mut media = InputMediaVideo::new(file);
            if let Some(text) = caption {
                media = media.caption(text.to_owned());
                if let Some(mode) = mode {
                    media = media.parse_mode(mode);
                }
            }
            InputMedia::Video(media)
        }
        MediaKind::Document => {
            let mut media = InputMediaDocument::new(file);
            if let Some(text) = caption {
                media = media.caption(text.to_owned());
                if let Some(mode) = mode {
                    media = media.parse_mode(mode);
                }
            }
            InputMedia::Document(media)
        }
    }
}

/// One Bot API call worth of media.
#[derive(Debug, PartialEq, Eq)]
enum Batch<'a> {
    /// Sent with `send_photo`, `send_video` or `send_document`.
    Single(&'a MediaRef),
    /// Sent with `send_media_group`; always 2 to 10 items.
    Album(Vec<&'a MediaRef>),
}

/// Split media into calls Telegram accepts.
///
/// Documents cannot share an album with photos or videos, so the two
/// families are sent separately, each keeping draft order. The family of
/// the first item goes first so the caption stays on it. Each family is
/// cut into evenly sized albums of at most ten, which never leaves a
/// one-item album behind.
fn plan_batches(media: &[MediaRef]) -> Vec<Batch<'_>> {
    let (documents, visual): (Vec<&MediaRef>, Vec<&MediaRef>) = media
        .iter()
        .partition(|m| m.kind == MediaKind::Document);
    let families = match media.first() {
        Some(first) if first.kind == MediaKind::Document => [documents, visual],
        _ => [visual, documents],
    };

    let mut batches = Vec::new();
    for family in families {
        let count = family.len();
        if count == 0 {
            continue;
        }
        let albums = count.div_ceil(MAX_GROUP_SIZE);
        let base = count.checked_div(albums).unwrap_or(count);
        let larger = count.checked_rem(albums).unwrap_or(0);

        let mut rest = family.as_slice();
        for i in 0..albums {
            let size = if i < larger { base.saturating_add(1) } else { base };
            let (head, tail) = rest.split_at(size.min(rest.len()));
            rest = tail;
            match head {
                [single] => batches.push(Batch::Single(*single)),
                _ => batches.push(Batch::Album(head.to_vec())),
            }
        }
    }
    batches
}

impl TelegramTransport {
    /// Send a lone attachment. Telegram refuses albums with fewer than two items.
    async fn send_single(
        &self,
        recipient: Recipient,
        item: &MediaRef,
        caption: Option<&str>,
        format: ParseFormat,
    ) -> Result<(), RequestError> {
        let file = InputFile::file_id(item.file_id.clone());
        let mode = parse_mode(format);
        match item.kind {
            MediaKind::Photo => {
                let mut req = self.bot.send_photo(recipient, file);
                if let Some(text) = caption {
                    req = req.caption(text.to_owned());
                    if let Some(mode) = mode {
                        req = req.parse_mode(mode);
                    }
                }
                req.await?;
            }
            MediaKind::Video => {
                let mut req = self.bot.send_video(recipient, file);
                if let Some(text) = caption {
                    req = req.caption(text.to_owned());
                    if let Some(mode) = mode {
                        req = req.parse_mode(mode);
                    }
                }
                req.await?;
            }
            MediaKind::Document => {
                let mut req = self.bot.send_document(recipient, file);
                if let Some(text) = caption {
                    req = req.caption(text.to_owned());
                    if let Some(mode) = mode {
                        req = req.parse_mode(mode);
                    }
                }
                req.await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn resolve_display_name(
        &self,
        destination: &DestinationId,
    ) -> Result<String, TransportError> {
        let recipient = recipient_for(destination)?;
        let chat = self
            .bot
            .get_chat(recipient)
            .await
            .map_err(map_request_error)?;
        let name = chat
            .title()
            .or_else(|| chat.username())
            .map(str::to_owned)
            .unwrap_or_else(|| chat.id.to_string());
        Ok(name)
    }

    async fn send_text(
        &self,
        destination: &DestinationId,
        text: &str,
        format: ParseFormat,
    ) -> Result<(), TransportError> {
        let recipient = recipient_for(destination)?;
        let mut req = self.bot.send_message(recipient, text);
        if let Some(mode) = parse_mode(format) {
            req = req.parse_mode(mode);
        }
        req.await.map_err(map_request_error)?;
        Ok(())
    }

    async fn send_media_group(
        &self,
        destination: &DestinationId,
        media: &[MediaRef],
        caption: Option<&str>,
        format: ParseFormat,
    ) -> Result<(), TransportError> {
        let recipient = recipient_for(destination)?;

        let mut caption = caption;
        for batch in plan_batches(media) {
            let batch_caption = caption.take();
            match batch {
                Batch::Single(item) => {
                    self.send_single(recipient.clone(), item, batch_caption, format)
                        .await
                        .map_err(map_request_error)?;
                }
                Batch::Album(items) => {
                    let group: Vec<InputMedia> = items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| {
                            input_media(item, if i == 0 { batch_caption } else { None }, format)
                        })
                        .collect();
                    debug!(destination = %destination, items = group.len(), "sending media group");
                    self.bot
                        .send_media_group(recipient.clone(), group)
                        .await
                        .map_err(map_request_error)?;
                }
            }
        }
        Ok(())
    }
}
