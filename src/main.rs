//! Herald CLI entry point.
//!
//! `start` runs the bot until Ctrl+C; `check` validates the config and
//! credentials and prints the runtime paths.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use teloxide::Bot;
use tracing::info;

use herald::clock::SystemClock;
use herald::config::{load_default_config, runtime_paths};
use herald::credentials::load_default_credentials;
use herald::engine::Engine;
use herald::logging::{self, LogMode};
use herald::telegram::run_telegram;
use herald::transport::telegram::TelegramTransport;

/// Herald - broadcast campaigns to Telegram channels and groups.
#[derive(Parser)]
#[command(name = "herald", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Run the bot.
    Start,
    /// Validate config and credentials, then exit.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Start => handle_start().await,
        Command::Check => handle_check(),
    }
}

/// Run the bot until interrupted.
async fn handle_start() -> anyhow::Result<()> {
    let paths = runtime_paths()?;
    let _logging_guard = logging::init(&LogMode::Daemon {
        logs_dir: paths.logs_dir.clone(),
    })?;

    let config = load_default_config()
        .with_context(|| format!("failed to load {}", paths.config_toml.display()))?;
    let credentials = load_default_credentials()
        .with_context(|| format!("failed to load {}", paths.env_file.display()))?;
    let token = credentials.require(&config.telegram.bot_token_env)?;

    let export_dir = config.export_dir(&paths);
    std::fs::create_dir_all(&export_dir)
        .with_context(|| format!("failed to create {}", export_dir.display()))?;

    let bot = Bot::new(token);
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let engine = Arc::new(Engine::in_memory(
        transport,
        Arc::new(SystemClock),
        config.dispatch.send_interval(),
        export_dir,
    ));

    info!(
        version = env!("CARGO_PKG_VERSION"),
        send_interval_ms = engine.dispatcher.send_interval().as_millis(),
        export_dir = %engine.export_dir.display(),
        "herald starting"
    );

    run_telegram(bot, Arc::new(config), engine).await
}

/// Validate config and credentials without contacting Telegram.
fn handle_check() -> anyhow::Result<()> {
    let _logging_guard = logging::init(&LogMode::Cli)?;
    let paths = runtime_paths()?;

    let config = load_default_config()
        .with_context(|| format!("failed to load {}", paths.config_toml.display()))?;
    let credentials = load_default_credentials()
        .with_context(|| format!("failed to load {}", paths.env_file.display()))?;
    credentials.require(&config.telegram.bot_token_env)?;

    println!("config:       {}", paths.config_toml.display());
    println!("credentials:  {}", paths.env_file.display());
    println!("logs:         {}", paths.logs_dir.display());
    println!("exports:      {}", config.export_dir(&paths).display());
    println!(
        "send interval: {} ms",
        config.dispatch.send_interval().as_millis()
    );
    if config.telegram.allowed_users.is_empty() {
        println!("allowed users: everyone");
    } else {
        println!("allowed users: {:?}", config.telegram.allowed_users);
    }
    println!("ok");
    Ok(())
}
