//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;
use hark_core::ApiError;
use hark_framework::FrameworkError;

/// Errors that can occur while running a bot.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The platform rejected the bot's credentials; the receive loop stopped.
    #[error("Invalid authentication")]
    InvalidAuth,

    /// A reply could not be delivered.
    #[error("Send failed: {0}")]
    Send(#[from] ApiError),

    /// Route registration failed.
    #[error("Framework error: {0}")]
    Framework(#[from] FrameworkError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
