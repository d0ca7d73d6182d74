//! # Hark
//!
//! Pattern-routed event dispatch for real-time chat bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐ Event ┌──────────────┐ Context ┌────────┐ first match ┌─────────┐
//! │ Connection │──────▶│ Bot (loop)   │────────▶│ Router │────────────▶│ Handler │
//! │  (platform)│◀──────│ reply / post │◀────────┴────────┴─────────────│         │
//! └────────────┘       └──────────────┘                                └─────────┘
//! ```
//!
//! - **Connection**: the platform client, plugged in through a trait
//! - **Bot**: receive loop, self-message suppression, reply primitives
//! - **Router**: ordered regex routes; the first matching route wins
//! - **Handlers**: async functions whose parameters are pulled from the
//!   per-event [`Context`](prelude::Context)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hark::prelude::*;
//!
//! async fn greet(bot: Arc<Bot>, msg: Arc<MessageEvent>, caps: Arc<Captures>) {
//!     let name = caps.get(1).unwrap_or("stranger");
//!     let _ = bot.reply(&msg, &format!("hello, {name}"), Typing::With).await;
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = HarkRuntime::new()?;
//!     let mut bot = runtime.bot(Arc::new(my_connection()));
//!     bot.hear(r"(?i)^hi,? (\w+)")?.message_handler(greet);
//!     runtime.run(bot).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default): `hark.toml` configuration files
//! - `yaml-config`: `hark.yaml` configuration files
//! - `json-log`: JSON log output

pub use hark_core as core;
pub use hark_framework as framework;
pub use hark_runtime as runtime;

/// Commonly used types for writing bots.
///
/// ```rust,ignore
/// use hark::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Runtime and engine
    pub use hark_runtime::{Bot, BotContextExt, HarkConfig, HarkRuntime, Typing};

    // Routing and handler parameters
    pub use hark_framework::{Captures, Context, FromContext, Router};

    // Events and payloads
    pub use hark_core::{
        Attachment, AttachmentField, BoxedConnection, Connection, Event, EventKind, MessageEvent,
    };

    pub use hark_runtime::prelude::*;
}
