//! Layered configuration loading with figment.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. [`HarkConfig::default`]
//! 2. `hark.{profile}.<ext>` next to the main file
//! 3. the main file (`hark.<ext>` or `config.<ext>`), or the one passed to
//!    [`ConfigLoader::file`]
//! 4. `HARK_*` environment variables, `__` separating nested keys
//! 5. [`ConfigLoader::merge`]
//!
//! TOML files need the `toml-config` feature, YAML files `yaml-config`.
//!
//! ```text
//! HARK_LOGGING__LEVEL=debug       logging.level = "debug"
//! HARK_BOT__SEND_ERRORS=surface   bot.send_errors = "surface"
//! HARK_TYPING__MAX_DELAY_MS=500   typing.max_delay_ms = 500
//! ```
//!
//! ```rust,ignore
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./config/hark.toml")
//!     .load()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Serialized};
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
use figment::providers::Format;
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::HarkConfig;
use super::validation::validate_config;

const ENV_PREFIX: &str = "HARK_";
const PROFILE_VAR: &str = "HARK_PROFILE";
const BASE_NAMES: [&str; 2] = ["hark", "config"];

/// Selects the `hark.{profile}.<ext>` overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name; `dev` and `prod` are accepted as short forms.
    pub fn parse(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "dev" | "development" => Self::Development,
            "prod" | "production" => Self::Production,
            _ => Self::Custom(name),
        }
    }

    /// Reads `HARK_PROFILE`, falling back to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|name| Self::parse(&name))
            .unwrap_or_default()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Config file formats compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    #[cfg(feature = "toml-config")]
    Toml,
    #[cfg(feature = "yaml-config")]
    Yaml,
}

impl FileFormat {
    /// Search order: TOML before YAML.
    const ENABLED: &'static [FileFormat] = &[
        #[cfg(feature = "toml-config")]
        FileFormat::Toml,
        #[cfg(feature = "yaml-config")]
        FileFormat::Yaml,
    ];

    fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => &["toml"],
            #[cfg(feature = "yaml-config")]
            Self::Yaml => &["yaml", "yml"],
        }
    }

    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ENABLED
            .iter()
            .copied()
            .find(|format| format.extensions().contains(&ext))
    }

    fn merge_into(self, figment: Figment, path: &Path) -> Figment {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => figment.merge(figment::providers::Toml::file(path)),
            #[cfg(feature = "yaml-config")]
            Self::Yaml => figment.merge(figment::providers::Yaml::file(path)),
        }
    }
}

/// Builder over the configuration sources.
#[derive(Debug)]
pub struct ConfigLoader {
    profile: Profile,
    search_paths: Vec<PathBuf>,
    explicit_file: Option<PathBuf>,
    use_env: bool,
    overrides: Vec<HarkConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Profile from `HARK_PROFILE`, environment variables enabled, and no
    /// explicit search paths (the working directory and the user config
    /// directory are searched).
    pub fn new() -> Self {
        Self {
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            explicit_file: None,
            use_env: true,
            overrides: Vec::new(),
        }
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a directory to search for config files, in order.
    pub fn search_path<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.search_paths.push(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    /// Adds `<user config dir>/hark`, e.g. `~/.config/hark`.
    pub fn with_user_config_dir(self) -> Self {
        match user_config_dir() {
            Some(dir) => self.search_path(dir),
            None => self,
        }
    }

    /// Loads exactly this file instead of searching. It must exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.explicit_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Overrides every other source with `config`.
    pub fn merge(mut self, config: HarkConfig) -> Self {
        self.overrides.push(config);
        self
    }

    /// Loads and validates the configuration.
    pub fn load(self) -> ConfigResult<HarkConfig> {
        let figment = self.figment()?;
        let config: HarkConfig = figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        validate_config(&config)?;

        debug!(
            profile = %self.profile,
            level = %config.logging.level,
            event_buffer = config.bot.event_buffer,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(HarkConfig::default()));

        figment = match &self.explicit_file {
            Some(path) => self.merge_explicit(figment, path)?,
            None => self.merge_discovered(figment),
        };

        if self.use_env {
            trace!(prefix = ENV_PREFIX, "Merging environment variables");
            let env = Env::prefixed(ENV_PREFIX).ignore(&["PROFILE"]).split("__");
            figment = figment.merge(env);
        }

        for config in &self.overrides {
            figment = figment.merge(Serialized::defaults(config));
        }
        Ok(figment)
    }

    fn merge_explicit(&self, figment: Figment, path: &Path) -> ConfigResult<Figment> {
        if !path.is_file() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let format = FileFormat::from_path(path).ok_or_else(|| {
            ConfigError::ParseError(format!(
                "{}: unsupported file type or format feature disabled",
                path.display()
            ))
        })?;

        info!(path = %path.display(), "Loading configuration file");
        Ok(format.merge_into(figment, path))
    }

    /// Merges the profile overlay and main file from the first directory
    /// that has a main file, per format.
    fn merge_discovered(&self, mut figment: Figment) -> Figment {
        let dirs = if self.search_paths.is_empty() {
            default_search_paths()
        } else {
            self.search_paths.clone()
        };

        let mut found = false;
        for &format in FileFormat::ENABLED {
            if let Some((overlay, main)) = self.discover(format, &dirs) {
                if let Some(overlay) = overlay {
                    debug!(path = %overlay.display(), "Loading profile configuration");
                    figment = format.merge_into(figment, &overlay);
                }
                info!(path = %main.display(), "Loading configuration file");
                figment = format.merge_into(figment, &main);
                found = true;
            }
        }

        if !found {
            warn!("No configuration file found, using defaults");
        }
        figment
    }

    /// Returns `(profile overlay, main file)` for the first directory holding
    /// a main file in `format`.
    fn discover(
        &self,
        format: FileFormat,
        dirs: &[PathBuf],
    ) -> Option<(Option<PathBuf>, PathBuf)> {
        for dir in dirs {
            for base in BASE_NAMES {
                for ext in format.extensions() {
                    let main = dir.join(format!("{base}.{ext}"));
                    if main.is_file() {
                        let overlay = dir.join(format!("{base}.{}.{ext}", self.profile));
                        return Some((overlay.is_file().then_some(overlay), main));
                    }
                }
            }
        }
        None
    }
}

fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hark"))
}

fn default_search_paths() -> Vec<PathBuf> {
    std::env::current_dir()
        .ok()
        .into_iter()
        .chain(user_config_dir())
        .collect()
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<HarkConfig> {
    ConfigLoader::new().load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogLevel, SendErrors};
    use figment::Jail;

    #[test]
    fn test_default_config() {
        Jail::expect_with(|jail| {
            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .load()
                .unwrap();

            assert_eq!(config.logging.level.as_str(), "info");
            assert_eq!(config.bot.event_buffer, 64);
            assert_eq!(config.typing.max_delay_ms, 2000);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("HARK_LOGGING__LEVEL", "debug");
            jail.set_env("HARK_BOT__SEND_ERRORS", "surface");
            jail.set_env("HARK_TYPING__MAX_DELAY_MS", "500");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .unwrap();

            assert_eq!(config.logging.level, LogLevel::Debug);
            assert_eq!(config.bot.send_errors, SendErrors::Surface);
            assert_eq!(config.typing.max_delay_ms, 500);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_env_value_fails_validation() {
        Jail::expect_with(|jail| {
            jail.set_env("HARK_BOT__EVENT_BUFFER", "0");

            let result = ConfigLoader::new().search_path(jail.directory()).load();
            assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_programmatic_merge_wins() {
        Jail::expect_with(|jail| {
            jail.set_env("HARK_BOT__ISOLATE_PANICS", "true");

            let mut overrides = HarkConfig::default();
            overrides.bot.isolate_panics = false;

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .merge(overrides)
                .load()
                .unwrap();

            assert!(!config.bot.isolate_panics);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_is_reported() {
        let result = ConfigLoader::new()
            .without_env()
            .file("/definitely/not/here/hark.toml")
            .load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_profile_file_is_merged_before_base() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "hark.production.toml",
                "[typing]\nmax_delay_ms = 100\nunits_per_minute = 600\n",
            )?;
            jail.create_file("hark.toml", "[typing]\nmax_delay_ms = 300\n")?;

            let config = ConfigLoader::new()
                .profile("prod")
                .search_path(jail.directory())
                .without_env()
                .load()
                .unwrap();

            assert_eq!(config.typing.max_delay_ms, 300);
            assert_eq!(config.typing.units_per_minute, 600);
            Ok(())
        });
    }

    #[test]
    fn test_profile_parse() {
        assert!(matches!(Profile::parse("PROD"), Profile::Production));
        assert!(matches!(Profile::parse("dev"), Profile::Development));
        assert_eq!(Profile::parse("staging").as_str(), "staging");
    }
}
