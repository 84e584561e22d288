//! Slash command parsing and handlers.
//!
//! Handlers take the [`Engine`] and return HTML replies, so they can be
//! exercised without a live bot. The only command that does not reply
//! synchronously is `/send_now`, which the bot runs in a background task.

use std::path::PathBuf;

use tracing::debug;

use crate::broadcast::{BroadcastError, DispatchOutcome, ExportFormat};
use crate::engine::Engine;
use crate::types::{parse_categories, AuthorId, CampaignId, CategorySet, DestinationId};

use super::ui::{
    escape_html, format_destination, format_dispatch_report, format_draft, format_scheduled,
    format_summary, format_utc,
};

/// A reply to send back to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    /// HTML text.
    pub text: String,
    /// File to attach after the text.
    pub document: Option<PathBuf>,
}

impl CommandReply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            document: None,
        }
    }
}

/// What the bot should do with a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    /// Reply right away.
    Reply(CommandReply),
    /// Start a dispatch run in the background and report when it finishes.
    SendNow {
        /// Campaign to send.
        campaign_id: CampaignId,
        /// Optional category restriction.
        filter: Option<CategorySet>,
    },
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

/// Split `/cmd@bot args` into the lowercase command name and its argument string.
///
/// Returns `None` for text that is not a command.
pub fn split_command(text: &str) -> Option<(String, &str)> {
    let without_slash = text.trim_start().strip_prefix('/')?;
    let (full_command, args) = match without_slash.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (without_slash, ""),
    };
    let command = full_command.split('@').next().unwrap_or(full_command);
    if command.is_empty() {
        return None;
    }
    Some((command.to_lowercase(), args))
}

/// Split off the first whitespace-delimited token.
fn next_token(args: &str) -> (Option<&str>, &str) {
    let args = args.trim();
    if args.is_empty() {
        return (None, "");
    }
    match args.split_once(char::is_whitespace) {
        Some((head, rest)) => (Some(head), rest.trim()),
        None => (Some(args), ""),
    }
}

/// Strip one layer of surrounding quotes from a category argument.
pub fn strip_quotes(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '\u{201C}' | '\u{201D}' | '\u{AB}' | '\u{BB}'))
        .trim()
}

/// Parse an optional trailing category argument.
///
/// Absent or blank arguments mean "no filter".
pub fn parse_filter(raw: &str) -> Option<CategorySet> {
    let cats = parse_categories(strip_quotes(raw));
    (!cats.is_empty()).then_some(cats)
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Execute a slash command for `author`.
///
/// Returns `None` when `text` is not a command.
pub async fn execute(engine: &Engine, author: AuthorId, text: &str) -> Option<CommandAction> {
    let (command, args) = split_command(text)?;
    debug!(author = %author, command = %command, "command received");

    let reply = match command.as_str() {
        "start" | "help" => handle_help(),
        "add_dest" => handle_add_dest(engine, args).await,
        "dests" => handle_dests(engine).await,
        "new" => handle_new(engine, author, args).await,
        "draft" => handle_draft(engine, author).await,
        "save" => handle_save(engine, author, args).await,
        "send_now" => {
            let (id, rest) = next_token(args);
            return Some(match id {
                Some(id) => CommandAction::SendNow {
                    campaign_id: CampaignId::new(id),
                    filter: parse_filter(rest),
                },
                None => CommandAction::Reply(CommandReply::text(
                    "Usage: /send_now &lt;campaign_id&gt; [\"cat1,cat2\"]",
                )),
            });
        }
        "schedule_in" => handle_schedule_in(engine, args).await,
        "scheduled" => CommandReply::text(format_scheduled(&engine.scheduler.pending().await)),
        "report" => handle_report(engine, args).await,
        "export_csv" => handle_export(engine, ExportFormat::Csv).await,
        "export_json" => handle_export(engine, ExportFormat::JsonLines).await,
        other => CommandReply::text(format!("Unknown command: /{}", escape_html(other))),
    };
    Some(CommandAction::Reply(reply))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// List all available commands.
pub fn handle_help() -> CommandReply {
    CommandReply::text(
        [
            "<b>Broadcast bot</b>",
            "",
            "/add_dest &lt;chat_id&gt; \"cat1,cat2\" - register a destination",
            "/dests - list destinations",
            "/new &lt;campaign_id&gt; - start a draft, then send text and media",
            "/draft - show the pending draft",
            "/save [campaign_id] - save the draft as a campaign",
            "/send_now &lt;campaign_id&gt; [\"cat1,cat2\"] - send now",
            "/schedule_in &lt;campaign_id&gt; &lt;minutes&gt; [\"cat1,cat2\"] - send later",
            "/scheduled - list scheduled sends",
            "/report &lt;campaign_id&gt; - delivery counts",
            "/export_csv, /export_json - download the delivery log",
        ]
        .join("\n"),
    )
}

/// Register or update a destination.
///
/// The display name is looked up through the transport; on failure the id
/// is used as the title.
pub async fn handle_add_dest(engine: &Engine, args: &str) -> CommandReply {
    let (Some(raw_id), rest) = next_token(args) else {
        return CommandReply::text("Usage: /add_dest &lt;chat_id&gt; \"cat1,cat2\"");
    };
    let id = DestinationId::new(raw_id);
    let categories = parse_categories(strip_quotes(rest));

    let title = match engine.transport.resolve_display_name(&id).await {
        Ok(name) => Some(name),
        Err(e) => {
            debug!(destination = %id, error = %e, "display name lookup failed, using id");
            None
        }
    };

    match engine.destinations.register(id, title, categories).await {
        Ok(dest) => CommandReply::text(format!("Added: {}", format_destination(&dest))),
        Err(e) => CommandReply::text(format!("Failed to add: {}", escape_html(&e.to_string()))),
    }
}

/// List registered destinations.
pub async fn handle_dests(engine: &Engine) -> CommandReply {
    match engine.destinations.all().await {
        Ok(dests) if dests.is_empty() => CommandReply::text("No destinations registered."),
        Ok(dests) => {
            let mut lines = vec![format!("<b>Destinations ({}):</b>", dests.len())];
            lines.extend(dests.iter().map(|d| format!("  {}", format_destination(d))));
            CommandReply::text(lines.join("\n"))
        }
        Err(e) => CommandReply::text(format!("Error: {}", escape_html(&e.to_string()))),
    }
}

/// Start a new draft for the author.
pub async fn handle_new(engine: &Engine, author: AuthorId, args: &str) -> CommandReply {
    let (Some(raw_id), _) = next_token(args) else {
        return CommandReply::text("Usage: /new &lt;campaign_id&gt;");
    };
    let id = CampaignId::new(raw_id);
    let outcome = engine.drafts.begin(author, Some(id.clone())).await;

    let mut text = String::new();
    if outcome.replaced {
        text.push_str("Previous unsaved draft was discarded.\n");
    }
    text.push_str(&format!(
        "Draft for campaign <code>{id}</code>. Send text and/or media, then /save {id}",
        id = escape_html(id.as_str())
    ));
    CommandReply::text(text)
}

/// Show the author's pending draft.
pub async fn handle_draft(engine: &Engine, author: AuthorId) -> CommandReply {
    match engine.drafts.pending(author).await {
        Some(draft) => CommandReply::text(format_draft(&draft)),
        None => CommandReply::text("No draft. Start one with /new &lt;campaign_id&gt;."),
    }
}

/// Save the author's draft as a campaign.
pub async fn handle_save(engine: &Engine, author: AuthorId, args: &str) -> CommandReply {
    let (raw_id, _) = next_token(args);
    let id = raw_id.map(CampaignId::new);

    match engine
        .drafts
        .finalize(author, id, engine.campaigns.as_ref())
        .await
    {
        Ok(campaign) => {
            let id = escape_html(campaign.id.as_str());
            CommandReply::text(format!(
                "Saved <code>{id}</code>. /send_now {id} or /schedule_in {id} 15"
            ))
        }
        Err(BroadcastError::NoDraft) => {
            CommandReply::text("No draft. Start one with /new &lt;campaign_id&gt;.")
        }
        Err(BroadcastError::MissingCampaignId) => {
            CommandReply::text("Usage: /save &lt;campaign_id&gt;")
        }
        Err(BroadcastError::InvalidCampaign(_)) => {
            CommandReply::text("The draft is empty. Send some text or media first.")
        }
        Err(e) => CommandReply::text(format!("Save failed: {}", escape_html(&e.to_string()))),
    }
}

/// Run a dispatch to completion and describe the result.
pub async fn run_send_now(
    engine: &Engine,
    campaign_id: &CampaignId,
    filter: Option<&CategorySet>,
) -> String {
    match engine.dispatcher.dispatch(campaign_id, filter).await {
        Ok(DispatchOutcome::Completed(report)) => format_dispatch_report(&report),
        Ok(DispatchOutcome::UnknownCampaign) => format!(
            "No campaign <code>{}</code>. Nothing was sent.",
            escape_html(campaign_id.as_str())
        ),
        Err(BroadcastError::InvalidCampaign(_)) => format!(
            "Campaign <code>{}</code> is empty. Nothing was sent.",
            escape_html(campaign_id.as_str())
        ),
        Err(e) => format!("Dispatch failed: {}", escape_html(&e.to_string())),
    }
}

/// Schedule a campaign for later.
pub async fn handle_schedule_in(engine: &Engine, args: &str) -> CommandReply {
    const USAGE: &str = "Usage: /schedule_in &lt;campaign_id&gt; &lt;minutes&gt; [\"cat1,cat2\"]";

    let (raw_id, rest) = next_token(args);
    let (raw_minutes, rest) = next_token(rest);
    let (Some(raw_id), Some(raw_minutes)) = (raw_id, raw_minutes) else {
        return CommandReply::text(USAGE);
    };
    let Ok(minutes) = raw_minutes.parse::<u32>() else {
        return CommandReply::text(format!(
            "Minutes must be a whole number ≥ 0, got <code>{}</code>.\n{USAGE}",
            escape_html(raw_minutes)
        ));
    };

    let id = CampaignId::new(raw_id);
    let known = matches!(engine.campaigns.get(&id).await, Ok(Some(_)));
    let run = engine
        .scheduler
        .schedule_in_minutes(id, minutes, parse_filter(rest))
        .await;

    let mut text = format!("Scheduled for {}", format_utc(&run.fire_at));
    if !known {
        text.push_str(&format!(
            "\nNote: campaign <code>{}</code> is not saved yet; the run will send nothing unless it is saved before then.",
            escape_html(run.campaign_id.as_str())
        ));
    }
    CommandReply::text(text)
}

/// Delivery counts for a campaign.
pub async fn handle_report(engine: &Engine, args: &str) -> CommandReply {
    let (Some(raw_id), _) = next_token(args) else {
        return CommandReply::text("Usage: /report &lt;campaign_id&gt;");
    };
    let id = CampaignId::new(raw_id);
    match crate::broadcast::report::summarize(engine.log.as_ref(), &id).await {
        Ok(summary) => CommandReply::text(format_summary(&id, &summary)),
        Err(e) => CommandReply::text(format!("Report failed: {}", escape_html(&e.to_string()))),
    }
}

/// Export the whole delivery log to a file and attach it.
pub async fn handle_export(engine: &Engine, format: ExportFormat) -> CommandReply {
    match crate::broadcast::report::export_to_file(
        engine.log.as_ref(),
        &engine.export_dir,
        format,
        engine.clock.as_ref(),
    )
    .await
    {
        Ok(path) => CommandReply {
            text: "Delivery log export".to_owned(),
            document: Some(path),
        },
        Err(e) => CommandReply::text(format!("Export failed: {}", escape_html(&e.to_string()))),
    }
}
