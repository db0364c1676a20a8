use content_blocks_engine::FallbackPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid include pattern `{pattern}`: {source}")]
    PatternError {
        pattern: String,
        source: glob::PatternError,
    },
}

fn default_include() -> String {
    "**/*.html".to_string()
}

fn default_tick_ms() -> u64 {
    50
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub content_path: PathBuf,
    /// Glob, relative to `content_path`, selecting stored documents.
    #[serde(default = "default_include")]
    pub include: String,
    /// What `render` does with fragments that fail to load.
    #[serde(default)]
    pub on_malformed: FallbackPolicy,
    /// Poll interval of the terminal counter, in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Config {
    pub fn new(content_path: impl Into<PathBuf>) -> Self {
        Self {
            content_path: content_path.into(),
            include: default_include(),
            on_malformed: FallbackPolicy::default(),
            tick_ms: default_tick_ms(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the content path
        config.content_path =
            Self::expand_path(&config.content_path).unwrap_or(config.content_path);

        log::debug!("loaded config from {}", config_path.display());
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(Self::config_path())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/content-blocks");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Files under `content_path` matching `include`, sorted. Unreadable
    /// entries are skipped.
    pub fn content_files(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let pattern = self.content_path.join(&self.include);
        let pattern = pattern.to_string_lossy();
        let entries = glob::glob(&pattern).map_err(|source| ConfigError::PatternError {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(path) => path.is_file().then_some(path),
                Err(e) => {
                    log::warn!("skipping {}: {}", e.path().display(), e.error());
                    None
                }
            })
            .collect();
        files.sort();
        Ok(files)
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
