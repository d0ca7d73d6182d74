//! Configuration for the Hark runtime.
//!
//! Settings are layered with figment: defaults, then config files, then
//! `HARK_*` environment variables. See [`ConfigLoader`].

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config};
pub use schema::{
    AttachmentDelay, BotSettings, HarkConfig, LogFormat, LogLevel, LogOutput, LoggingConfig,
    SendErrors, SpanEventConfig, TypingConfig,
};
pub use validation::validate_config;
