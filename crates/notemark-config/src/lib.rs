//! Configuration management for notemark.
//!
//! Parses `notemark.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Path Expansion
//!
//! `library.titles_file` supports `${VAR}`, `${VAR:-default}` and a leading
//! `~`. Relative paths resolve against the directory holding the config file.

mod expand;

use std::path::{Path, PathBuf};

use notemark_cache::{ContentHash, DEFAULT_CAPACITY};
use notemark_renderer::{KnownTitles, RenderOptions};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the known titles file.
    pub titles_file: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override cache capacity.
    pub cache_capacity: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "notemark.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Render feature switches.
    pub render: RenderOptions,
    /// Parse cache configuration.
    pub cache: CacheConfig,
    /// Note library configuration (paths are unexpanded strings from TOML).
    library: LibraryConfigRaw,

    /// Resolved library configuration (set after loading).
    #[serde(skip)]
    pub library_resolved: LibraryConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Parse cache configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether rendered previews are cached.
    pub enabled: bool,
    /// Maximum number of cached renders.
    pub capacity: usize,
    /// Content hash used for cache keys.
    pub hash: ContentHash,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CAPACITY,
            hash: ContentHash::default(),
        }
    }
}

/// Raw library configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LibraryConfigRaw {
    titles_file: Option<String>,
}

/// Resolved library configuration with absolute paths.
#[derive(Debug, Default)]
pub struct LibraryConfig {
    /// File listing known note titles, one per line.
    pub titles_file: Option<PathBuf>,
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
        /// Config field path (e.g., "`library.titles_file`").
        field: String,
        /// Error message (e.g., "${`NOTES_DIR`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `notemark.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
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
            tracing::debug!("No config file found, using defaults");
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(titles_file) = &settings.titles_file {
            self.library_resolved.titles_file = Some(titles_file.clone());
        }
        if let Some(enabled) = settings.cache_enabled {
            self.cache.enabled = enabled;
        }
        if let Some(capacity) = settings.cache_capacity {
            self.cache.capacity = capacity;
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.capacity == 0 {
            return Err(ConfigError::Validation(
                "cache.capacity must be greater than 0".to_owned(),
            ));
        }
        if let Some(path) = &self.library_resolved.titles_file
            && path.as_os_str().is_empty()
        {
            return Err(ConfigError::Validation(
                "library.titles_file cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand and resolve library paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let titles_file = match self.library.titles_file.as_deref() {
            Some(raw) => {
                let expanded = expand::expand_path(raw, "library.titles_file")?;
                if expanded.is_empty() {
                    return Err(ConfigError::Validation(
                        "library.titles_file cannot be empty".to_owned(),
                    ));
                }
                Some(config_dir.join(expanded))
            }
            None => None,
        };

        self.library_resolved = LibraryConfig { titles_file };
        Ok(())
    }

    /// Read the known titles file, if one is configured.
    ///
    /// Returns an empty set when no titles file is configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the configured file cannot be read.
    pub fn load_known_titles(&self) -> Result<KnownTitles, ConfigError> {
        let Some(path) = &self.library_resolved.titles_file else {
            return Ok(KnownTitles::new());
        };
        let content = std::fs::read_to_string(path)?;
        let titles = parse_titles(&content);
        tracing::debug!(path = %path.display(), count = titles.len(), "Loaded known titles");
        Ok(titles)
    }
}

/// Parse a titles list: one title per line, blank lines and `#` comments skipped.
#[must_use]
pub fn parse_titles(content: &str) -> KnownTitles {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}
