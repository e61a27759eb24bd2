use crate::cli::Cli;
use crate::error::{BoardError, BoardResult};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::Deserialize;
use std::{path::Path, path::PathBuf, time::Duration};
use tracing::Level;

const TRACE_LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
const LOCAL_SETTINGS_YAML_FILE: &str = ".env.local.yaml";

// Settings are loaded once at startup and handed to the components as
// explicit configs. All settings may be configured via environment
// variables. Example:
// ROSTER_URL="https://..." would set roster_url to that value.
#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    #[serde(default = "default_trace_level")]
    trace_level: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub once: bool,
    // Roster is read from a local JSON file, or from an HTTP endpoint serving the same JSON
    pub roster_file: Option<PathBuf>,
    pub roster_url: Option<String>,
    #[serde(default = "default_roster_name_column")]
    pub roster_name_column: String,
    #[serde(default = "default_roster_url_column")]
    pub roster_url_column: String,
    // Both must be set for the REST key-value store to be used
    pub kv_rest_api_url: Option<String>,
    pub kv_rest_api_token: Option<String>,
    #[serde(default)]
    pub memory_cache: bool,
    #[serde(default = "default_cache_ttl_sec")]
    pub cache_ttl_sec: u64,
    #[serde(default = "default_cache_key")]
    pub cache_key: String,
    #[serde(default = "default_scrape_concurrency")]
    pub scrape_concurrency: usize,
    #[serde(default = "default_scrape_timeout_sec")]
    pub scrape_timeout_sec: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_badge_selector")]
    pub badge_selector: String,
    #[serde(default = "default_badge_title_selector")]
    pub badge_title_selector: String,
    #[serde(default = "default_completion_badge_marker")]
    pub completion_badge_marker: String,
}

/// Where the participants roster comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterOrigin {
    File(PathBuf),
    Http(String),
}

#[derive(Debug, Clone)]
pub struct RosterSettings {
    /// `None` when no roster was configured; refreshes then fail.
    pub origin: Option<RosterOrigin>,
    pub name_column: String,
    pub url_column: String,
    pub timeout: Duration,
}

/// Which key-value store backs the leaderboard cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheSettings {
    Disabled,
    Memory,
    Rest { url: String, token: String },
}

#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub timeout: Duration,
    pub user_agent: String,
    pub badge_selector: String,
    pub badge_title_selector: String,
    pub completion_badge_marker: String,
}

impl Settings {
    pub fn new(cli: &Cli) -> BoardResult<Self> {
        let mut figment = Figment::new();
        if Path::new(LOCAL_SETTINGS_YAML_FILE).exists() {
            println!(
                "\n######################################\n\
                   ##   Found '.env.local.yaml' file,  ##\n\
                   ##   loading local configuration.   ##\n\
                   ######################################\n\
                "
            );
            figment = figment.merge(Yaml::file(LOCAL_SETTINGS_YAML_FILE));
        }
        Self::from_figment(figment.merge(Env::raw()).merge(Serialized::defaults(cli)))
    }

    pub fn from_figment(figment: Figment) -> BoardResult<Self> {
        let settings: Settings = figment.extract()?;
        if settings.scrape_concurrency == 0 {
            return Err(BoardError::InvalidConcurrency);
        }
        Ok(settings)
    }

    pub fn get_trace_level(&self) -> Level {
        get_trace_level(&self.trace_level)
    }

    pub fn roster(&self) -> RosterSettings {
        let origin = match (&self.roster_url, &self.roster_file) {
            (Some(url), _) if !url.trim().is_empty() => Some(RosterOrigin::Http(url.clone())),
            (_, Some(path)) => Some(RosterOrigin::File(path.clone())),
            _ => None,
        };
        RosterSettings {
            origin,
            name_column: self.roster_name_column.clone(),
            url_column: self.roster_url_column.clone(),
            timeout: Duration::from_secs(self.scrape_timeout_sec),
        }
    }

    pub fn cache(&self) -> CacheSettings {
        match (&self.kv_rest_api_url, &self.kv_rest_api_token) {
            (Some(url), Some(token)) if !url.is_empty() && !token.is_empty() => CacheSettings::Rest {
                url: url.clone(),
                token: token.clone(),
            },
            _ if self.memory_cache => CacheSettings::Memory,
            _ => CacheSettings::Disabled,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_sec)
    }

    pub fn scraper(&self) -> ScraperSettings {
        ScraperSettings {
            timeout: Duration::from_secs(self.scrape_timeout_sec),
            user_agent: self.user_agent.clone(),
            badge_selector: self.badge_selector.clone(),
            badge_title_selector: self.badge_title_selector.clone(),
            completion_badge_marker: self.completion_badge_marker.clone(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ScraperSettings {
    fn default() -> Self {
        ScraperSettings {
            timeout: Duration::from_secs(default_scrape_timeout_sec()),
            user_agent: default_user_agent(),
            badge_selector: default_badge_selector(),
            badge_title_selector: default_badge_title_selector(),
            completion_badge_marker: default_completion_badge_marker(),
        }
    }
}

fn get_trace_level(level_str: &str) -> Level {
    match level_str {
        level if level == TRACE_LEVELS[0] => Level::TRACE,
        level if level == TRACE_LEVELS[1] => Level::DEBUG,
        level if level == TRACE_LEVELS[2] => Level::INFO,
        level if level == TRACE_LEVELS[3] => Level::WARN,
        level if level == TRACE_LEVELS[4] => Level::ERROR,
        // Default trace level
        _ => Level::INFO,
    }
}

fn default_trace_level() -> String {
    "INFO".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_roster_name_column() -> String {
    "User Name".to_string()
}

fn default_roster_url_column() -> String {
    "Google Cloud Skills Boost Profile URL".to_string()
}

fn default_cache_ttl_sec() -> u64 {
    1800
}

fn default_cache_key() -> String {
    "leaderboard_data".to_string()
}

fn default_scrape_concurrency() -> usize {
    5
}

fn default_scrape_timeout_sec() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

fn default_badge_selector() -> String {
    "div.profile-badge".to_string()
}

fn default_badge_title_selector() -> String {
    "span.ql-title-medium".to_string()
}

fn default_completion_badge_marker() -> String {
    "The Arcade".to_string()
}
