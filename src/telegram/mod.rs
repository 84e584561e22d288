//! Telegram front-end: access control, command routing and draft capture.
//!
//! Slash commands go to [`commands`]. Any other text, photo, video or
//! document from an operator with a pending draft is appended to it.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::Engine;
use crate::types::AuthorId;

pub mod commands;
pub mod media;
pub mod ui;

use self::commands::{CommandAction, CommandReply};

// ---------------------------------------------------------------------------
// Shared state for handler injection
// ---------------------------------------------------------------------------

/// Dependencies injected into teloxide handlers via `dptree::deps!`.
#[derive(Clone)]
struct SharedState {
    config: Arc<Config>,
    engine: Arc<Engine>,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Run the bot until Ctrl+C.
///
/// # Errors
///
/// Currently never fails; the signature leaves room for startup checks.
pub async fn run_telegram(bot: Bot, config: Arc<Config>, engine: Arc<Engine>) -> anyhow::Result<()> {
    if config.telegram.allowed_users.is_empty() {
        warn!("telegram.allowed_users is empty: every user can operate the bot");
    }

    let shared = SharedState { config, engine };
    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    info!("telegram dispatcher starting");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![shared])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("telegram dispatcher stopped");
    Ok(())
}

// ---------------------------------------------------------------------------
// Message handler
// ---------------------------------------------------------------------------

async fn handle_message(bot: Bot, msg: Message, state: SharedState) -> ResponseResult<()> {
    let user_id = match msg.from {
        Some(ref user) => i64::try_from(user.id.0).unwrap_or(0),
        None => return Ok(()),
    };

    if !state.config.is_allowed(user_id) {
        warn!(user_id, "message dropped: user not in allowed_users");
        return Ok(());
    }
    let author = AuthorId(user_id);

    if let Some(text) = msg.text() {
        if let Some(action) = commands::execute(&state.engine, author, text).await {
            return run_action(&bot, &msg, &state, action).await;
        }
    }

    let drafts = &state.engine.drafts;
    if let Some(item) = media::media_ref(&msg) {
        if !drafts.append_media(author, item).await {
            debug!(user_id, "media ignored: no pending draft");
            return Ok(());
        }
        if let Some(caption) = media::html_text(&msg) {
            drafts.append_text(author, &caption).await;
        }
        return Ok(());
    }

    if let Some(text) = media::html_text(&msg) {
        if !drafts.append_text(author, &text).await {
            debug!(user_id, "text ignored: no pending draft");
        }
    }

    Ok(())
}

async fn run_action(
    bot: &Bot,
    msg: &Message,
    state: &SharedState,
    action: CommandAction,
) -> ResponseResult<()> {
    match action {
        CommandAction::Reply(reply) => send_reply(bot, msg.chat.id, reply).await,
        CommandAction::SendNow {
            campaign_id,
            filter,
        } => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "Dispatch of <code>{}</code> started.",
                    ui::escape_html(campaign_id.as_str())
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;

            let engine = Arc::clone(&state.engine);
            let bot = bot.clone();
            let chat_id = msg.chat.id;
            tokio::spawn(async move {
                let text = commands::run_send_now(&engine, &campaign_id, filter.as_ref()).await;
                if let Err(e) = bot
                    .send_message(chat_id, text)
                    .parse_mode(ParseMode::Html)
                    .await
                {
                    warn!(error = %e, "failed to send dispatch result");
                }
            });
            Ok(())
        }
    }
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: CommandReply) -> ResponseResult<()> {
    match reply.document {
        Some(path) => {
            bot.send_document(chat_id, InputFile::file(path))
                .caption(reply.text)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        None => {
            bot.send_message(chat_id, reply.text)
                .parse_mode(ParseMode::Html)
                .await?;
        }
    }
    Ok(())
}
