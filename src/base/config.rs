//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc, time::Duration};

use serde::Deserialize;

use super::types::{MissPolicy, Res};

/// Default GitHub API endpoint.
fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

/// Default cache entry lifetime (one hour).
fn default_cache_ttl_secs() -> u64 {
    60 * 60
}

/// Default interval between cache sweeps.
fn default_cache_sweep_secs() -> u64 {
    30
}

/// Default interval between scheduled refreshes (hourly).
fn default_refresh_interval_secs() -> u64 {
    60 * 60
}

/// Default display name for posted cards.
fn default_bot_username() -> String {
    "hashtag-bot".to_string()
}

/// Default icon for posted cards.
fn default_bot_icon_emoji() -> String {
    ":hash:".to_string()
}

/// Configuration for the hashtag-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Slack app token (`SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// GitHub access token (`GITHUB_TOKEN`).
    pub github_token: String,
    /// Owner of the watched repository (`GITHUB_OWNER`).
    #[serde(default)]
    pub github_owner: String,
    /// Name of the watched repository (`GITHUB_REPO`).
    #[serde(default)]
    pub github_repo: String,
    /// GitHub API base URL (`GITHUB_API_BASE`).
    #[serde(default = "default_github_api_base")]
    pub github_api_base: String,
    /// Lifetime of a cached issue in seconds (`CACHE_TTL_SECS`).
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Seconds between sweeps of expired cache entries (`CACHE_SWEEP_SECS`).
    #[serde(default = "default_cache_sweep_secs")]
    pub cache_sweep_secs: u64,
    /// Seconds between scheduled full refreshes (`REFRESH_INTERVAL_SECS`).
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Behavior when a mention cannot be resolved (`MISS_POLICY`): `ignore` or `notify`.
    #[serde(default)]
    pub miss_policy: MissPolicy,
    /// Username shown on posted cards (`BOT_USERNAME`).
    #[serde(default = "default_bot_username")]
    pub bot_username: String,
    /// Emoji icon shown on posted cards (`BOT_ICON_EMOJI`).
    #[serde(default = "default_bot_icon_emoji")]
    pub bot_icon_emoji: String,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            slack_app_token: String::new(),
            slack_bot_token: String::new(),
            github_token: String::new(),
            github_owner: String::new(),
            github_repo: String::new(),
            github_api_base: default_github_api_base(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_sweep_secs: default_cache_sweep_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            miss_policy: MissPolicy::default(),
            bot_username: default_bot_username(),
            bot_icon_emoji: default_bot_icon_emoji(),
        }
    }
}

impl ConfigInner {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl Config {
    /// Load the configuration from the environment and an optional TOML file.
    ///
    /// `owner` and `repo` take precedence over every other source when given.
    pub fn load(explicit_path: Option<&std::path::Path>, owner: Option<String>, repo: Option<String>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("HASHTAG_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        cfg = cfg.set_override_option("github_owner", owner)?.set_override_option("github_repo", repo)?;

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check the numeric settings for sane values.
    pub fn validate(&self) -> Res<()> {
        if self.cache_ttl_secs == 0 {
            return Err(anyhow::anyhow!("Cache TTL must be greater than zero."));
        }

        if self.cache_sweep_secs == 0 {
            return Err(anyhow::anyhow!("Cache sweep interval must be greater than zero."));
        }

        if self.refresh_interval_secs == 0 {
            return Err(anyhow::anyhow!("Refresh interval must be greater than zero."));
        }

        Ok(())
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

// Tests.
