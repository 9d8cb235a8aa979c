//! Configuration module for `mentorhub`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default CLI configuration loaded based on build profile.
/// Uses release defaults in release mode, debug defaults in debug mode.
#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("../../assets/DefaultCLIConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("../../assets/DefaultCLIConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

/// Path prefix every REST endpoint lives under
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Backend origin used by the development profile
pub const DEV_ORIGIN: &str = "http://localhost:8080";

/// Environment variable that overrides the resolved API base
pub const API_BASE_ENV: &str = "MENTORHUB_API_BASE";

/// Environment variable that relocates the `$MENTORHUB` directory
pub const HOME_ENV: &str = "MENTORHUB_HOME";

const DEFAULT_TOKEN_TTL_HOURS: u32 = 10;

/// Build profile used to compute the API base when no explicit base is set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Local backend on `http://localhost:8080`
    Development,
    /// Backend served from the configured origin and base path
    Production,
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("Unknown profile: '{other}'")),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Backend location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Explicit API base; wins over everything else when non-empty
    #[serde(default)]
    pub base: String,
    /// Origin the production build is served from
    #[serde(default)]
    pub origin: String,
    /// Path the app is deployed under (e.g. `/mentoring`)
    #[serde(default)]
    pub base_path: String,
    /// `development` or `production`
    #[serde(default)]
    pub profile: String,
}

/// Session persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of the persisted token, in hours
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
        }
    }
}

const fn default_token_ttl_hours() -> u32 {
    DEFAULT_TOKEN_TTL_HOURS
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Backend settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Session settings
    #[serde(default)]
    pub session: SessionConfig,
    /// `--api-base` from the command line; beats the environment
    #[serde(skip)]
    cli_api_base: Option<String>,
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override API base
    pub api_base: Option<String>,
    /// Override profile
    pub profile: Option<String>,
}

/// Resolve the base URL every endpoint path is appended to.
///
/// An explicit base wins. Otherwise the development profile targets
/// `http://localhost:8080/api/v1` and production targets
/// `{origin}{base_path}/api/v1`.
#[must_use]
pub fn resolve_api_base(
    explicit: Option<&str>,
    profile: Profile,
    origin: &str,
    base_path: &str,
) -> String {
    if let Some(base) = explicit.map(str::trim).filter(|b| !b.is_empty()) {
        return base.trim_end_matches('/').to_string();
    }
    match profile {
        Profile::Development => format!("{DEV_ORIGIN}{DEFAULT_API_PREFIX}"),
        Profile::Production => format!(
            "{}{}{DEFAULT_API_PREFIX}",
            origin.trim().trim_end_matches('/'),
            normalize_base_path(base_path)
        ),
    }
}

fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

impl Config {
    /// Get the `$MENTORHUB` directory path
    ///
    /// `MENTORHUB_HOME` wins when set. Otherwise:
    /// - Linux: `~/.config/mentorhub`
    /// - macOS: `~/Library/Application Support/mentorhub`
    /// - Windows: `%APPDATA%\mentorhub`
    #[must_use]
    pub fn get_mentorhub_dir() -> PathBuf {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(home);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mentorhub")
    }

    /// Merge missing fields from defaults into this config
    ///
    /// Only fields that are empty here and non-empty in `defaults` are copied, so
    /// upgrading picks up new keys without touching user settings.
    ///
    /// # Returns
    ///
    /// `true` if any fields were added/changed, `false` otherwise
    #[allow(clippy::useless_let_if_seq)]
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let mut changed = false;

        if self.logging.level.is_empty() && !defaults.logging.level.is_empty() {
            self.logging.level.clone_from(&defaults.logging.level);
            changed = true;
        }
        if self.logging.file.is_empty() && !defaults.logging.file.is_empty() {
            self.logging.file.clone_from(&defaults.logging.file);
            changed = true;
        }

        if self.api.base.is_empty() && !defaults.api.base.is_empty() {
            self.api.base.clone_from(&defaults.api.base);
            changed = true;
        }
        if self.api.origin.is_empty() && !defaults.api.origin.is_empty() {
            self.api.origin.clone_from(&defaults.api.origin);
            changed = true;
        }
        if self.api.base_path.is_empty() && !defaults.api.base_path.is_empty() {
            self.api.base_path.clone_from(&defaults.api.base_path);
            changed = true;
        }
        if self.api.profile.is_empty() && !defaults.api.profile.is_empty() {
            self.api.profile.clone_from(&defaults.api.profile);
            changed = true;
        }

        if self.session.token_ttl_hours == 0 {
            self.session.token_ttl_hours = defaults.session.token_ttl_hours;
            changed = true;
        }

        changed
    }

    /// Apply CLI-provided overrides onto the loaded configuration
    ///
    /// Overrides last for this run only; the config file is not modified.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file.clone_from(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }
        if let Some(base) = &overrides.api_base {
            self.api.base.clone_from(base);
            self.cli_api_base = Some(base.clone());
        }
        if let Some(profile) = &overrides.profile {
            self.api.profile.clone_from(profile);
        }
    }

    /// Get the user config file path
    ///
    /// - `config.toml` for release builds
    /// - `dconfig.toml` for debug builds (allows separate debug config)
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_mentorhub_dir().join(CONFIG_FILE_NAME)
    }

    /// Path of the persisted token jar
    #[must_use]
    pub fn get_token_file_path() -> PathBuf {
        Self::get_mentorhub_dir().join("token.json")
    }

    /// Path of the persisted local storage
    #[must_use]
    pub fn get_storage_file_path() -> PathBuf {
        Self::get_mentorhub_dir().join("storage.json")
    }

    /// Expand `$MENTORHUB` in a string to the config directory
    #[must_use]
    fn expand_variables(value: &str) -> String {
        if value.contains("$MENTORHUB") {
            let dir = Self::get_mentorhub_dir();
            value.replace("$MENTORHUB", dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Initialize config from a TOML string
    ///
    /// Missing fields use their serde defaults; `$MENTORHUB` is expanded.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed or doesn't match the expected schema
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;

        config.logging.file = Self::expand_variables(&config.logging.file);
        config.api.base = Self::expand_variables(&config.api.base);

        Ok(config)
    }

    /// Load configuration from embedded defaults
    ///
    /// # Panics
    /// Panics if the embedded default configuration is invalid TOML.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).expect("Failed to parse compiled-in default configuration")
    }

    /// Load configuration from the user config file, creating it on first run
    #[must_use]
    pub fn load() -> Self {
        Self::load_from(&Self::get_config_file_path())
    }

    /// Load configuration from `config_file`, creating it from defaults when absent
    ///
    /// Falls back to defaults when the file cannot be read or parsed.
    #[must_use]
    pub fn load_from(config_file: &Path) -> Self {
        let defaults = Self::from_defaults();

        if config_file.exists() {
            if let Ok(content) = fs::read_to_string(config_file) {
                if let Ok(mut config) = Self::from_toml(&content) {
                    if config.merge_defaults(&defaults) {
                        let _ = config.save_to(config_file);
                    }
                    return config;
                }
            }
        } else {
            let _ = defaults.save_to(config_file);
        }

        defaults
    }

    /// Save configuration to the user config file
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the file written
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::get_config_file_path())
    }

    /// Save configuration to `config_file`
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the file written
    pub fn save_to(&self, config_file: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(config_file, toml_str)?;
        Ok(())
    }

    /// Profile parsed from `api.profile`; unknown values mean production
    #[must_use]
    pub fn profile(&self) -> Profile {
        self.api.profile.parse().unwrap_or(Profile::Production)
    }

    /// Effective API base: `--api-base`, then `MENTORHUB_API_BASE`, then
    /// `api.base`, then computed from the profile
    #[must_use]
    pub fn api_base(&self) -> String {
        self.api_base_with_env(std::env::var(API_BASE_ENV).ok().as_deref())
    }

    fn api_base_with_env(&self, env_base: Option<&str>) -> String {
        let explicit = self
            .cli_api_base
            .as_deref()
            .into_iter()
            .chain(env_base)
            .find(|b| !b.trim().is_empty())
            .unwrap_or(&self.api.base);
        resolve_api_base(
            Some(explicit),
            self.profile(),
            &self.api.origin,
            &self.api.base_path,
        )
    }

    /// Get a configuration value by key
    ///
    /// Supported keys: `level`, `file`, `verbose`, `api_base`, `origin`,
    /// `base_path`, `profile`, `token_ttl_hours`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "level" => Some(self.logging.level.clone()),
            "file" => Some(self.logging.file.clone()),
            "verbose" => Some(self.logging.verbose.to_string()),
            "api_base" | "api-base" => Some(self.api.base.clone()),
            "origin" => Some(self.api.origin.clone()),
            "base_path" | "base-path" => Some(self.api.base_path.clone()),
            "profile" => Some(self.api.profile.clone()),
            "token_ttl_hours" | "token-ttl-hours" => {
                Some(self.session.token_ttl_hours.to_string())
            }
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// Updates the in-memory config only; call [`save()`](Config::save) to persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value cannot be parsed
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "level" => {
                value.parse::<crate::logger::Level>()?;
                self.logging.level = value.to_ascii_lowercase();
            }
            "file" => self.logging.file = value.to_string(),
            "verbose" => {
                self.logging.verbose = value
                    .parse::<bool>()
                    .map_err(|_| format!("Invalid boolean value for 'verbose': '{value}'"))?;
            }
            "api_base" | "api-base" => self.api.base = value.to_string(),
            "origin" => self.api.origin = value.to_string(),
            "base_path" | "base-path" => self.api.base_path = value.to_string(),
            "profile" => self.api.profile = value.parse::<Profile>()?.to_string(),
            "token_ttl_hours" | "token-ttl-hours" => {
                let hours = value
                    .parse::<u32>()
                    .ok()
                    .filter(|h| *h > 0)
                    .ok_or_else(|| format!("Invalid hour count for 'token_ttl_hours': '{value}'"))?;
                self.session.token_ttl_hours = hours;
            }
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Unset a configuration value by key (reset to default)
    ///
    /// # Errors
    /// Returns an error if the key is not recognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        match key {
            "level" => self.logging.level.clone_from(&defaults.logging.level),
            "file" => self.logging.file.clone_from(&defaults.logging.file),
            "verbose" => self.logging.verbose = defaults.logging.verbose,
            "api_base" | "api-base" => self.api.base.clone_from(&defaults.api.base),
            "origin" => self.api.origin.clone_from(&defaults.api.origin),
            "base_path" | "base-path" => self.api.base_path.clone_from(&defaults.api.base_path),
            "profile" => self.api.profile.clone_from(&defaults.api.profile),
            "token_ttl_hours" | "token-ttl-hours" => {
                self.session.token_ttl_hours = defaults.session.token_ttl_hours;
            }
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Reset all configuration to defaults
    ///
    /// Deletes the configuration file; the next [`load()`](Config::load)
    /// recreates it from defaults.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be deleted
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        writeln!(f, "\n[api]")?;
        writeln!(f, "  base = \"{}\"", self.api.base)?;
        writeln!(f, "  origin = \"{}\"", self.api.origin)?;
        writeln!(f, "  base_path = \"{}\"", self.api.base_path)?;
        writeln!(f, "  profile = \"{}\"", self.api.profile)?;
        writeln!(f, "  (resolved) = \"{}\"", self.api_base())?;

        writeln!(f, "\n[session]")?;
        writeln!(f, "  token_ttl_hours = {}", self.session.token_ttl_hours)?;

        Ok(())
    }
}
