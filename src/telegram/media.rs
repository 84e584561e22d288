//! Extraction of draft content from inbound Telegram messages.
//!
//! Media is tagged with its kind here, from the message type, so the
//! dispatcher never has to guess what a file id refers to. Text is captured
//! as Telegram HTML rebuilt from the message entities, so formatting
//! survives and plain `<`/`&` characters are escaped.

use teloxide::types::{Message, MessageEntity, MessageEntityKind};

use crate::types::MediaRef;

use super::ui::escape_html;

/// Attachment carried by a message, if it is a photo, video or document.
///
/// Photos use the largest size (last in the array by Telegram convention).
pub fn media_ref(msg: &Message) -> Option<MediaRef> {
    if let Some(photos) = msg.photo() {
        return photos.last().map(|p| MediaRef::photo(p.file.id.clone()));
    }
    if let Some(video) = msg.video() {
        return Some(MediaRef::video(video.file.id.clone()));
    }
    if let Some(document) = msg.document() {
        return Some(MediaRef::document(document.file.id.clone()));
    }
    None
}

/// Text or caption of a message rendered as Telegram HTML.
///
/// Returns `None` when the message has no text or only whitespace.
pub fn html_text(msg: &Message) -> Option<String> {
    let (text, entities) = match (msg.text(), msg.caption()) {
        (Some(text), _) => (text, msg.entities()),
        (None, Some(caption)) => (caption, msg.caption_entities()),
        (None, None) => return None,
    };
    if text.trim().is_empty() {
        return None;
    }
    Some(render_html(text, entities.unwrap_or_default()))
}

/// A formatting entity resolved to byte offsets and HTML tags.
struct Span {
    start: usize,
    end: usize,
    open: String,
    close: String,
}

/// Opening and closing tags for an entity kind.
///
/// Entities Telegram detects on its own (mentions, hashtags, plain URLs)
/// need no markup and yield `None`.
fn tags(kind: &MessageEntityKind) -> Option<(String, String)> {
    let simple = |tag: &str| Some((format!("<{tag}>"), format!("</{tag}>")));
    match kind {
        MessageEntityKind::Bold => simple("b"),
        MessageEntityKind::Italic => simple("i"),
        MessageEntityKind::Underline => simple("u"),
        MessageEntityKind::Strikethrough => simple("s"),
        MessageEntityKind::Spoiler => simple("tg-spoiler"),
        MessageEntityKind::Code => simple("code"),
        MessageEntityKind::Pre { language: None } => simple("pre"),
        MessageEntityKind::Pre {
            language: Some(lang),
        } => Some((
            format!("<pre><code class=\"language-{}\">", escape_attr(lang)),
            "</code></pre>".to_owned(),
        )),
        MessageEntityKind::TextLink { url } => Some((
            format!("<a href=\"{}\">", escape_attr(url.as_str())),
            "</a>".to_owned(),
        )),
        MessageEntityKind::TextMention { user } => Some((
            format!("<a href=\"tg://user?id={}\">", user.id.0),
            "</a>".to_owned(),
        )),
        _ => None,
    }
}

fn escape_attr(value: &str) -> String {
    escape_html(value).replace('"', "&quot;")
}

/// Byte offset of a UTF-16 offset; offsets inside a character round up.
fn byte_offset(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0usize;
    for (byte, ch) in text.char_indices() {
        if units >= utf16_offset {
            return byte;
        }
        units = units.saturating_add(ch.len_utf16());
    }
    text.len()
}

/// Render `text` with its entities as Telegram HTML.
///
/// Unformatted spans are escaped. Entity offsets are UTF-16 code units, as
/// sent by the Bot API.
pub fn render_html(text: &str, entities: &[MessageEntity]) -> String {
    let mut spans: Vec<Span> = entities
        .iter()
        .filter_map(|entity| {
            let (open, close) = tags(&entity.kind)?;
            let start = byte_offset(text, entity.offset);
            let end = byte_offset(text, entity.offset.saturating_add(entity.length));
            (start < end).then_some(Span {
                start,
                end,
                open,
                close,
            })
        })
        .collect();
    // Outer entities open first.
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut cuts: Vec<usize> = spans.iter().flat_map(|s| [s.start, s.end]).collect();
    cuts.push(0);
    cuts.push(text.len());
    cuts.sort_unstable();
    cuts.dedup();

    let mut out = String::with_capacity(text.len());
    let mut open: Vec<&Span> = Vec::new();
    let mut next = spans.iter().peekable();

    for window in cuts.windows(2) {
        let (from, to) = (window[0], window[1]);
        close_until(&mut out, &mut open, from);
        while let Some(span) = next.next_if(|s| s.start <= from) {
            out.push_str(&span.open);
            open.push(span);
        }
        out.push_str(&escape_html(&text[from..to]));
    }
    close_until(&mut out, &mut open, text.len());
    while let Some(span) = open.pop() {
        out.push_str(&span.close);
    }
    out
}

/// Close every innermost open span ending at or before `pos`.
fn close_until(out: &mut String, open: &mut Vec<&Span>, pos: usize) {
    while open.last().is_some_and(|s| s.end <= pos) {
        if let Some(span) = open.pop() {
            out.push_str(&span.close);
        }
    }
}
