use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Main configuration structure for Agent-Atlas
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site and its path conventions
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Origin root URL; also the main listing
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Path of the page listing every category
    #[serde(rename = "category-index-path", default = "default_category_index_path")]
    pub category_index_path: String,

    /// Path segment identifying item detail links
    #[serde(rename = "item-path-segment", default = "default_item_path_segment")]
    pub item_path_segment: String,

    /// Path segment identifying category links
    #[serde(rename = "category-path-segment", default = "default_category_path_segment")]
    pub category_path_segment: String,

    /// Path segment identifying tag links
    #[serde(rename = "tag-path-segment", default = "default_tag_path_segment")]
    pub tag_path_segment: String,
}

impl SiteConfig {
    /// Site rooted at `root_url` with the default path conventions
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            category_index_path: default_category_index_path(),
            item_path_segment: default_item_path_segment(),
            category_path_segment: default_category_path_segment(),
            tag_path_segment: default_tag_path_segment(),
        }
    }

    /// Parsed origin root URL
    pub fn root(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.root_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root-url '{}': {}", self.root_url, e)))
    }

    /// URL of the category index page
    pub fn category_index_url(&self) -> Result<Url, ConfigError> {
        self.root()?.join(&self.category_index_path).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid category-index-path '{}': {}",
                self.category_index_path, e
            ))
        })
    }
}

/// Pacing profile; supplies delay and timeout defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// 1-3 s between requests, 30 s timeout
    #[default]
    Thorough,
    /// 0.5-1.5 s between requests, 15 s timeout
    Fast,
}

impl Profile {
    fn delay_ms(self) -> (u64, u64) {
        match self {
            Self::Thorough => (1000, 3000),
            Self::Fast => (500, 1500),
        }
    }

    fn timeout_secs(self) -> u64 {
        match self {
            Self::Thorough => 30,
            Self::Fast => 15,
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "thorough" => Ok(Self::Thorough),
            "fast" => Ok(Self::Fast),
            other => Err(format!(
                "Invalid profile '{}'. Valid options: thorough, fast",
                other
            )),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thorough => write!(f, "thorough"),
            Self::Fast => write!(f, "fast"),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    #[serde(default)]
    pub profile: Profile,

    /// Lower bound of the politeness delay (milliseconds); profile default if unset
    #[serde(rename = "min-delay-ms")]
    pub min_delay_ms: Option<u64>,

    /// Upper bound of the politeness delay (milliseconds); profile default if unset
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: Option<u64>,

    /// Per-request timeout (seconds); profile default if unset
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: Option<u64>,

    /// Hard ceiling on listing pages per traversal root
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Maximum number of records enriched from detail pages
    #[serde(rename = "enrich-limit", default = "default_enrich_limit")]
    pub enrich_limit: usize,

    /// Enricher iterations between progress checkpoints
    #[serde(rename = "checkpoint-every", default = "default_checkpoint_every")]
    pub checkpoint_every: usize,
}

impl CrawlerConfig {
    /// Resolved politeness delay bounds
    pub fn delay_range(&self) -> (Duration, Duration) {
        let (min, max) = self.profile.delay_ms();
        (
            Duration::from_millis(self.min_delay_ms.unwrap_or(min)),
            Duration::from_millis(self.max_delay_ms.unwrap_or(max)),
        )
    }

    /// Resolved request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or_else(|| self.profile.timeout_secs()),
        )
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            min_delay_ms: None,
            max_delay_ms: None,
            request_timeout_secs: None,
            max_pages: default_max_pages(),
            enrich_limit: default_enrich_limit(),
            checkpoint_every: default_checkpoint_every(),
        }
    }
}

/// Request header configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding the database and checkpoints
    #[serde(rename = "data-dir", default = "default_data_dir")]
    pub data_dir: String,

    /// File stem of the final database
    #[serde(rename = "database-name", default = "default_database_name")]
    pub database_name: String,

    /// File stem prefix of progress checkpoints
    #[serde(rename = "checkpoint-prefix", default = "default_checkpoint_prefix")]
    pub checkpoint_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_name: default_database_name(),
            checkpoint_prefix: default_checkpoint_prefix(),
        }
    }
}

fn default_category_index_path() -> String {
    "/categories".to_string()
}

fn default_item_path_segment() -> String {
    "/agent/".to_string()
}

fn default_category_path_segment() -> String {
    "/categories/".to_string()
}

fn default_tag_path_segment() -> String {
    "/tags/".to_string()
}

fn default_max_pages() -> u32 {
    50
}

fn default_enrich_limit() -> usize {
    100
}

fn default_checkpoint_every() -> usize {
    50
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.5".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_database_name() -> String {
    "ai_agents_database".to_string()
}

fn default_checkpoint_prefix() -> String {
    "ai_agents_progress".to_string()
}
