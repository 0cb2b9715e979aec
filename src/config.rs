//! Runtime configuration: TOML file, environment overrides, validation

use crate::storage::is_valid_graph_name;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const CONFIG_FILE_NAME: &str = "taxograph.toml";
pub const DEFAULT_GRAPH_NAME: &str = "animal_kingdom";
pub const DEFAULT_ROOT_KINGDOM: &str = "Animalia";
pub const DEFAULT_SEED_URL: &str = "https://en.wikipedia.org/wiki/Animal";
pub const DEFAULT_ALLOWED_DOMAIN: &str = "en.wikipedia.org";
/// Article pages only: namespaced pages (`File:`, `Category:`, ...) contain a colon
pub const DEFAULT_URL_FILTER: &str = r"^https?://en\.wikipedia\.org/wiki/[^:]+$";
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaxographConfig {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub seed_url: String,
    /// Exact host a URL must have to be visited
    pub allowed_domain: String,
    /// Regex a URL must match to be visited
    pub url_filter: String,
    /// Deepest level visited; the seed is level 1 and 0 means unlimited
    pub max_depth: u32,
    /// Pages processed concurrently
    pub parallelism: usize,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: DEFAULT_SEED_URL.to_string(),
            allowed_domain: DEFAULT_ALLOWED_DOMAIN.to_string(),
            url_filter: DEFAULT_URL_FILTER.to_string(),
            max_depth: 0,
            parallelism: 4,
            user_agent: format!("taxograph/{}", crate::VERSION),
            request_timeout_secs: 30,
        }
    }
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// SQLite file; falls back to the platform data dir when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub name: String,
    pub root_kingdom: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_GRAPH_NAME.to_string(),
            root_kingdom: DEFAULT_ROOT_KINGDOM.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            retry_backoff_ms: 250,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl TaxographConfig {
    /// Load from `path` (defaults if the file does not exist), then apply
    /// environment overrides and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the TOML file without overrides or validation
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    ///
    /// `PORT` replaces only the port of the bind address.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("CRAWLER_SEED_URL") {
            self.crawler.seed_url = v;
        }
        if let Some(v) = lookup("CRAWLER_ALLOWED_DOMAIN") {
            self.crawler.allowed_domain = v;
        }
        if let Some(v) = lookup("CRAWLER_REGEX_URL_WIKI_NO_FILES") {
            self.crawler.url_filter = v;
        }
        if let Some(v) = lookup("CRAWLER_MAX_TREE_DEPTH") {
            self.crawler.max_depth = parse_number("CRAWLER_MAX_TREE_DEPTH", &v)?;
        }
        if let Some(v) = lookup("CRAWLER_PARALLELISM") {
            self.crawler.parallelism = parse_number("CRAWLER_PARALLELISM", &v)?;
        }
        if let Some(v) = lookup("DATABASE_PATH") {
            self.database.path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("GRAPH_NAME") {
            self.graph.name = v;
        }
        if let Some(v) = lookup("KINGDOM_NAME") {
            self.graph.root_kingdom = v;
        }
        if let Some(v) = lookup("PORT") {
            let port: u16 = parse_number("PORT", &v)?;
            let host = self
                .server
                .bind
                .rsplit_once(':')
                .map(|(host, _)| host)
                .unwrap_or("0.0.0.0");
            self.server.bind = format!("{host}:{port}");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_graph_name(&self.graph.name) {
            return Err(ConfigError::invalid(
                "graph.name",
                format!(
                    "'{}' must be a SQL identifier distinct from the rank tables",
                    self.graph.name
                ),
            ));
        }
        if self.graph.root_kingdom.trim().is_empty() {
            return Err(ConfigError::invalid("graph.root_kingdom", "must not be empty"));
        }
        if self.crawler.parallelism == 0 {
            return Err(ConfigError::invalid("crawler.parallelism", "must be at least 1"));
        }
        if self.ingest.max_attempts == 0 {
            return Err(ConfigError::invalid("ingest.max_attempts", "must be at least 1"));
        }
        Regex::new(&self.crawler.url_filter)
            .map_err(|e| ConfigError::invalid("crawler.url_filter", e.to_string()))?;
        Url::parse(&self.crawler.seed_url)
            .map_err(|e| ConfigError::invalid("crawler.seed_url", e.to_string()))?;
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, format!("'{raw}' is not a valid number")))
}

/// Default SQLite path under the platform data dir
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taxograph")
        .join("taxograph.db")
}
