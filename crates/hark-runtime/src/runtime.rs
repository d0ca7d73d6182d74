//! Process wiring: configuration, logging and shutdown around one [`Bot`].
//!
//! ```rust,ignore
//! use hark_runtime::HarkRuntime;
//!
//! let runtime = HarkRuntime::builder()
//!     .config_file("config/hark.toml")
//!     .profile("production")
//!     .build()?;
//!
//! let mut bot = runtime.bot(connection);
//! bot.hear("(?i)^ping")?.message_handler(pong);
//!
//! // Returns on Ctrl+C/SIGTERM, stream closure or invalid auth.
//! runtime.run(bot).await?;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use hark_core::BoxedConnection;
use tokio::signal;
use tracing::{error, info};

use crate::bot::Bot;
use crate::config::{ConfigLoader, HarkConfig};
use crate::error::RuntimeResult;
use crate::logging;

/// Owns the loaded configuration and drives a bot until shutdown.
#[derive(Debug, Clone)]
pub struct HarkRuntime {
    config: HarkConfig,
}

impl HarkRuntime {
    /// Loads configuration from the current directory and the environment.
    pub fn new() -> RuntimeResult<Self> {
        Self::builder().build()
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration and installs
    /// the global log subscriber.
    pub fn from_config(config: HarkConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            send_errors = ?config.bot.send_errors,
            max_typing_ms = config.typing.max_delay_ms,
            "Runtime initialized from configuration"
        );

        Self { config }
    }

    pub fn config(&self) -> &HarkConfig {
        &self.config
    }

    /// Creates a bot configured from this runtime's settings.
    pub fn bot(&self, connection: BoxedConnection) -> Bot {
        Bot::with_config(connection, &self.config)
    }

    /// Runs `bot` until its receive loop ends or a shutdown signal arrives.
    pub async fn run(&self, bot: Bot) -> RuntimeResult<()> {
        info!("Bot running, press Ctrl+C to stop");
        self.run_until(bot, wait_for_shutdown()).await
    }

    /// Runs `bot` until its receive loop ends or `shutdown` completes.
    pub async fn run_until<F>(&self, bot: Bot, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let bot = Arc::new(bot);
        tokio::select! {
            result = bot.run() => result,
            () = shutdown => {
                info!("Shutdown requested, stopping bot");
                Ok(())
            }
        }
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                error!(error = %e, "Failed to register SIGTERM handler");
                return ctrl_c().await;
            }
        };
        tokio::select! {
            () = ctrl_c() => {}
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

/// Builder for a [`HarkRuntime`] with custom configuration sources.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new()
                .with_current_dir()
                .with_user_config_dir(),
        }
    }

    /// Loads this file instead of searching the current and user config
    /// directories.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Overrides every other configuration source.
    pub fn merge(mut self, config: HarkConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    pub fn build(self) -> RuntimeResult<HarkRuntime> {
        let config = self.config_loader.load()?;
        Ok(HarkRuntime::from_config(config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SendErrors;
    use crate::error::RuntimeError;
    use hark_core::{Event, memory_connection};

    #[tokio::test]
    async fn test_run_until_stops_on_shutdown() {
        let runtime = HarkRuntime::from_config(HarkConfig::default());
        let (connection, remote) = memory_connection();
        let bot = runtime.bot(Arc::new(connection));

        // The inbound stream stays open; only the shutdown future ends the run.
        let result = runtime.run_until(bot, async {}).await;
        assert!(result.is_ok());
        drop(remote);
    }

    #[tokio::test]
    async fn test_run_until_reports_invalid_auth() {
        let runtime = HarkRuntime::from_config(HarkConfig::default());
        let (connection, remote) = memory_connection();
        remote.send(Event::InvalidAuth).unwrap();

        let result = runtime
            .run_until(runtime.bot(Arc::new(connection)), std::future::pending())
            .await;
        assert!(matches!(result, Err(RuntimeError::InvalidAuth)));
    }

    #[test]
    fn test_builder_applies_overrides() {
        let mut overrides = HarkConfig::default();
        overrides.bot.send_errors = SendErrors::Surface;

        let runtime = HarkRuntime::builder()
            .search_path(std::env::temp_dir().join("hark-runtime-no-config"))
            .without_env()
            .merge(overrides)
            .build()
            .unwrap();

        let (connection, _remote) = memory_connection();
        let bot = runtime.bot(Arc::new(connection));
        assert_eq!(bot.settings().send_errors, SendErrors::Surface);
    }

    #[test]
    fn test_builder_reports_missing_file() {
        let result = HarkRuntime::builder()
            .config_file("/nonexistent/hark.toml")
            .without_env()
            .build();
        assert!(matches!(result, Err(RuntimeError::Config(_))));
    }
}
