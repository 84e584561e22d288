//! Herald: a Telegram broadcast engine.
//!
//! Operators register destination chats with category tags, compose
//! campaigns (text plus photos, videos and documents) through the bot, and
//! send them to every matching destination immediately or after a delay.
//! Every delivery attempt is logged and can be summarized or exported.
//!
//! See `DESIGN.md` for the module layout.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod broadcast;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod engine;
pub mod logging;
pub mod store;
pub mod telegram;
pub mod transport;
pub mod types;
