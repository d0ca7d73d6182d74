//! Configuration validation.

use tracing::warn;

use super::error::{ConfigError, ConfigResult};
use super::schema::{HarkConfig, LogFormat, LogOutput};

/// Longest typing pause accepted, in milliseconds.
const MAX_TYPING_DELAY_MS: u64 = 60_000;

/// Validates a loaded configuration.
///
/// Rejects values that would stall or break the receive loop; merely odd
/// settings are only warned about.
pub fn validate_config(config: &HarkConfig) -> ConfigResult<()> {
    if config.bot.event_buffer == 0 {
        return Err(ConfigError::validation("bot.event_buffer must be at least 1"));
    }

    if config.typing.max_delay_ms > MAX_TYPING_DELAY_MS {
        return Err(ConfigError::validation(format!(
            "typing.max_delay_ms must not exceed {MAX_TYPING_DELAY_MS}, got {}",
            config.typing.max_delay_ms
        )));
    }

    if config.logging.output == LogOutput::File && config.logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is 'file'",
        ));
    }

    if config.logging.format == LogFormat::Json && !cfg!(feature = "json-log") {
        warn!("JSON log format requested but the json-log feature is disabled");
    }

    if config.typing.units_per_minute == 0 {
        warn!("typing.units_per_minute is 0, typing delays are disabled");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&HarkConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_event_buffer_is_rejected() {
        let mut config = HarkConfig::default();
        config.bot.event_buffer = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_excessive_typing_delay_is_rejected() {
        let mut config = HarkConfig::default();
        config.typing.max_delay_ms = 120_000;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_file_output_requires_path() {
        let mut config = HarkConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("hark.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
