//! Hark Runtime - the engine layer of the Hark chat-bot dispatcher.
//!
//! This crate provides:
//! - The bot engine ([`Bot`]): receive loop, self-message suppression and
//!   reply primitives with optional typing simulation
//! - Process wiring ([`HarkRuntime`]): configuration, logging, shutdown
//! - Layered configuration ([`config`]) via figment
//! - Logging setup ([`logging`]) via tracing-subscriber
//!
//! ```ignore
//! use std::sync::Arc;
//! use hark_runtime::{HarkRuntime, Typing};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = HarkRuntime::new()?;
//!     let mut bot = runtime.bot(Arc::new(connection));
//!
//!     bot.hear("(?i)^ping")?.message_handler(|bot: Arc<Bot>, msg: Arc<MessageEvent>| async move {
//!         let _ = bot.reply(&msg, "pong", Typing::With).await;
//!     });
//!
//!     runtime.run(bot).await?;
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use bot::{Bot, BotContextExt, Typing};
pub use config::{ConfigError, ConfigLoader, ConfigResult, HarkConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{HarkRuntime, RuntimeBuilder};

pub use tracing;
pub use tracing_subscriber;

/// Logging macros, for handlers that want them without a direct `tracing`
/// dependency.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
