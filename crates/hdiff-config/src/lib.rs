//! Configuration management for hdiff.
//!
//! Parses `hdiff.toml` files with serde and provides auto-discovery of the
//! config file in parent directories. CLI settings can be applied during
//! load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values support `${VAR}` and `${VAR:-default}`. Expanded fields:
//! - `engine.default`
//! - `sanitizer.cache_dir`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "hdiff.toml";

/// Name of the engine used when none is requested.
pub const DEFAULT_ENGINE: &str = "caxy_htmldiff";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the default engine name.
    pub engine: Option<String>,
    /// Override the block match threshold (percent).
    pub match_threshold: Option<u32>,
    /// Override table diffing.
    pub use_table_diffing: Option<bool>,
    /// Override sanitizer caching.
    pub cache_enabled: Option<bool>,
    /// Override the sanitizer cache directory.
    pub cache_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diff engine defaults.
    pub engine: EngineConfig,
    /// Sanitizer configuration as written in the file.
    sanitizer: SanitizerConfigRaw,

    /// Resolved sanitizer configuration (set after loading).
    #[serde(skip)]
    pub sanitizer_resolved: SanitizerConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Diff engine defaults.
///
/// Per-request options take precedence over these values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine used when a caller does not name one.
    pub default: String,
    /// Minimum word similarity (percent) for two blocks to be diffed in place.
    pub match_threshold: u32,
    /// Whether tables are diffed cell by cell.
    pub use_table_diffing: bool,
    /// Whether a space separates the deleted and inserted halves of a replacement.
    pub insert_space_in_replace: bool,
    /// Characters that always form a token of their own.
    pub special_case_chars: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default: DEFAULT_ENGINE.to_owned(),
            match_threshold: 80,
            use_table_diffing: true,
            insert_space_in_replace: true,
            special_case_chars: [".", ",", "(", ")", "'", ":", "-", "_"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl EngineConfig {
    /// Special case characters as `char`s.
    ///
    /// Entries that are not a single character are skipped; [`Config::validate`]
    /// rejects them when loading from a file.
    #[must_use]
    pub fn special_chars(&self) -> Vec<char> {
        self.special_case_chars
            .iter()
            .filter_map(|s| {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            })
            .collect()
    }
}

/// Raw sanitizer configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SanitizerConfigRaw {
    cache_enabled: Option<bool>,
    cache_dir: Option<String>,
    tag_transforms: Option<BTreeMap<String, String>>,
}

/// Resolved sanitizer configuration with absolute paths.
#[derive(Debug, Clone)]
pub struct SanitizerConfig {
    /// Whether sanitized output is cached on disk.
    pub cache_enabled: bool,
    /// Cache directory.
    pub cache_dir: PathBuf,
    /// Element renames applied during sanitization (`b` → `strong`).
    pub tag_transforms: BTreeMap<String, String>,
}

impl SanitizerConfig {
    /// Cache directory if caching is enabled.
    #[must_use]
    pub fn active_cache_dir(&self) -> Option<&Path> {
        self.cache_enabled.then_some(self.cache_dir.as_path())
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            cache_enabled: false,
            cache_dir: base.join(".hdiff").join("cache"),
            tag_transforms: default_tag_transforms(),
        }
    }
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

fn default_tag_transforms() -> BTreeMap<String, String> {
    [("b", "strong"), ("i", "em")]
        .into_iter()
        .map(|(from, to)| (from.to_owned(), to.to_owned()))
        .collect()
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`sanitizer.cache_dir`").
        field: String,
        /// Error message (e.g., "${`CACHE_ROOT`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_tag_name(value: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(value, field)?;
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "{field} must be a plain element name, got \"{value}\""
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `hdiff.toml` in the current directory and its parents, falling back
    /// to defaults. CLI settings are applied last.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(engine) = &settings.engine {
            self.engine.default.clone_from(engine);
        }
        if let Some(threshold) = settings.match_threshold {
            self.engine.match_threshold = threshold;
        }
        if let Some(use_table_diffing) = settings.use_table_diffing {
            self.engine.use_table_diffing = use_table_diffing;
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.sanitizer_resolved.cache_enabled = cache_enabled;
        }
        if let Some(cache_dir) = &settings.cache_dir {
            self.sanitizer_resolved.cache_dir.clone_from(cache_dir);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            engine: EngineConfig::default(),
            sanitizer: SanitizerConfigRaw::default(),
            sanitizer_resolved: SanitizerConfig::default_with_base(base),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_engine()?;
        self.validate_sanitizer()?;
        Ok(())
    }

    fn validate_engine(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.engine.default, "engine.default")?;

        if self.engine.match_threshold > 100 {
            return Err(ConfigError::Validation(
                "engine.match_threshold cannot exceed 100".to_owned(),
            ));
        }

        if let Some(bad) = self
            .engine
            .special_case_chars
            .iter()
            .find(|s| s.chars().count() != 1)
        {
            return Err(ConfigError::Validation(format!(
                "engine.special_case_chars entries must be single characters, got \"{bad}\""
            )));
        }

        Ok(())
    }

    fn validate_sanitizer(&self) -> Result<(), ConfigError> {
        for (from, to) in &self.sanitizer_resolved.tag_transforms {
            require_tag_name(from, "sanitizer.tag_transforms key")?;
            require_tag_name(to, &format!("sanitizer.tag_transforms.{from}"))?;
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.engine.default = expand::expand_env(&self.engine.default, "engine.default")?;

        if let Some(ref dir) = self.sanitizer.cache_dir {
            self.sanitizer.cache_dir = Some(expand::expand_env(dir, "sanitizer.cache_dir")?);
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve(&mut self, config_dir: &Path) {
        let defaults = SanitizerConfig::default_with_base(config_dir);
        self.sanitizer_resolved = SanitizerConfig {
            cache_enabled: self.sanitizer.cache_enabled.unwrap_or(defaults.cache_enabled),
            cache_dir: self
                .sanitizer
                .cache_dir
                .as_deref()
                .map_or(defaults.cache_dir, |dir| config_dir.join(dir)),
            tag_transforms: self
                .sanitizer
                .tag_transforms
                .clone()
                .unwrap_or(defaults.tag_transforms),
        };
    }
}
