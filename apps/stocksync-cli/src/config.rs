//! Configuration file loading.
//!
//! The TOML file is read once at startup, secrets may be overridden from the
//! environment, and everything is validated before any network call. The
//! result is a set of immutable values handed to the clients and the engine.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stocksync_client::auth::{CatalogCredentials, FeedApiKey};
use stocksync_client::feed::DEFAULT_FEED_REQUESTS_PER_SECOND;
use stocksync_client::retry::RetryPolicy;
use stocksync_client::{CatalogClientConfig, FeedClientConfig};
use stocksync_engine::config::{DEFAULT_COST_PRICE_FIELD, DEFAULT_MAX_CONCURRENCY};
use stocksync_engine::{Blacklist, ExecutorConfig, SyncConfig, SyncSettings};
use thiserror::Error;
use url::Url;

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "stocksync.toml";

pub const ENV_WOO_CONSUMER_KEY: &str = "STOCKSYNC_WOO_CONSUMER_KEY";
pub const ENV_WOO_CONSUMER_SECRET: &str = "STOCKSYNC_WOO_CONSUMER_SECRET";
pub const ENV_BLUEFIN_API_KEY: &str = "STOCKSYNC_BLUEFIN_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

// ── File layout ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    woocommerce: Option<WooCommerceSection>,
    bluefin: Option<BluefinSection>,
    #[serde(default)]
    settings: SettingsSection,
    #[serde(default)]
    sync: SyncSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct WooCommerceSection {
    url: String,
    #[serde(default)]
    consumer_key: String,
    #[serde(default)]
    consumer_secret: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BluefinSection {
    url: String,
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    lang_id: i32,
    #[serde(default)]
    price_drop: i32,
    #[serde(default = "default_feed_rps")]
    requests_per_second: u32,
}

fn default_feed_rps() -> u32 {
    DEFAULT_FEED_REQUESTS_PER_SECOND
}

fn default_true() -> bool {
    true
}

fn default_cost_field() -> String {
    DEFAULT_COST_PRICE_FIELD.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    #[serde(default = "default_true")]
    add_photos: bool,
    #[serde(default = "default_true")]
    set_missing_sku_to_zero: bool,
    #[serde(default = "default_true")]
    set_no_sku_to_zero: bool,
    #[serde(default = "default_true")]
    add_short_description: bool,
    #[serde(default = "default_true")]
    add_long_description: bool,
    #[serde(default)]
    blacklist_skus: String,
    #[serde(default = "default_true")]
    track_cost_price: bool,
    #[serde(default = "default_cost_field")]
    cost_price_field: String,
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            add_photos: true,
            set_missing_sku_to_zero: true,
            set_no_sku_to_zero: true,
            add_short_description: true,
            add_long_description: true,
            blacklist_skus: String::new(),
            track_cost_price: true,
            cost_price_field: default_cost_field(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SyncSection {
    max_concurrency: usize,
    request_timeout_secs: u64,
    max_attempts: u32,
    backoff_base_ms: u64,
    /// 0 disables downstream write limiting.
    downstream_requests_per_second: u32,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout_secs: 30,
            max_attempts: 3,
            backoff_base_ms: 1000,
            downstream_requests_per_second: 0,
        }
    }
}

// ── Resolved configuration ────────────────────────────────────────────────

/// Validated configuration. Client configs are only present when their
/// section was in the file, so feed-only commands work without store
/// credentials.
#[derive(Debug)]
pub struct AppConfig {
    feed: Option<FeedClientConfig>,
    catalog: Option<CatalogClientConfig>,
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Read and validate the file at `path`, applying environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents, |name| std::env::var(name).ok())
    }

    /// Parse a TOML document; `env` looks up override variables.
    pub fn from_toml(
        contents: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut file: FileConfig = toml::from_str(contents)?;

        if let Some(woo) = file.woocommerce.as_mut() {
            if let Some(key) = env(ENV_WOO_CONSUMER_KEY) {
                woo.consumer_key = key;
            }
            if let Some(secret) = env(ENV_WOO_CONSUMER_SECRET) {
                woo.consumer_secret = secret;
            }
        }
        if let Some(bluefin) = file.bluefin.as_mut() {
            if let Some(key) = env(ENV_BLUEFIN_API_KEY) {
                bluefin.api_key = key;
            }
        }

        Self::resolve(file)
    }

    fn resolve(file: FileConfig) -> Result<Self, ConfigError> {
        let sync = &file.sync;
        if sync.request_timeout_secs == 0 {
            return Err(invalid("sync.request_timeout_secs", "must be at least 1"));
        }
        if sync.max_concurrency == 0 {
            return Err(invalid("sync.max_concurrency", "must be at least 1"));
        }
        if sync.max_attempts == 0 {
            return Err(invalid("sync.max_attempts", "must be at least 1"));
        }
        let timeout = Duration::from_secs(sync.request_timeout_secs);

        let feed = file
            .bluefin
            .map(|section| -> Result<_, ConfigError> {
                validate_url("bluefin.url", &section.url)?;
                require("bluefin.api_key", &section.api_key)?;
                if section.requests_per_second == 0 {
                    return Err(invalid("bluefin.requests_per_second", "must be at least 1"));
                }
                Ok(FeedClientConfig {
                    base_url: section.url,
                    api_key: FeedApiKey::new(section.api_key),
                    lang_id: section.lang_id,
                    price_drop: section.price_drop,
                    requests_per_second: section.requests_per_second,
                    timeout,
                })
            })
            .transpose()?;

        let catalog = file
            .woocommerce
            .map(|section| -> Result<_, ConfigError> {
                validate_url("woocommerce.url", &section.url)?;
                require("woocommerce.consumer_key", &section.consumer_key)?;
                require("woocommerce.consumer_secret", &section.consumer_secret)?;
                Ok(CatalogClientConfig {
                    store_url: section.url,
                    credentials: CatalogCredentials::new(
                        section.consumer_key,
                        section.consumer_secret,
                    ),
                    timeout,
                })
            })
            .transpose()?;

        let settings = file.settings;
        if settings.track_cost_price && settings.cost_price_field.trim().is_empty() {
            return Err(invalid("settings.cost_price_field", "must not be empty"));
        }

        let retry = RetryPolicy::new(
            file.sync.max_attempts,
            Duration::from_millis(file.sync.backoff_base_ms),
        );

        Ok(Self {
            feed,
            catalog,
            sync: SyncConfig {
                settings: SyncSettings {
                    add_photos: settings.add_photos,
                    set_missing_sku_to_zero: settings.set_missing_sku_to_zero,
                    set_no_sku_to_zero: settings.set_no_sku_to_zero,
                    add_short_description: settings.add_short_description,
                    add_long_description: settings.add_long_description,
                    blacklist: Blacklist::parse(&settings.blacklist_skus),
                    track_cost_price: settings.track_cost_price,
                    cost_price_field: settings.cost_price_field,
                },
                executor: ExecutorConfig {
                    max_concurrency: file.sync.max_concurrency,
                    update_retry: retry.clone(),
                    downstream_requests_per_second: (file.sync.downstream_requests_per_second > 0)
                        .then_some(file.sync.downstream_requests_per_second),
                },
                fetch_retry: retry,
            },
        })
    }

    /// Feed client settings; fails if the file has no `[bluefin]` section.
    pub fn feed(&self) -> Result<&FeedClientConfig, ConfigError> {
        self.feed
            .as_ref()
            .ok_or_else(|| ConfigError::Missing("[bluefin] section".to_string()))
    }

    /// Catalog client settings; fails if the file has no `[woocommerce]` section.
    pub fn catalog(&self) -> Result<&CatalogClientConfig, ConfigError> {
        self.catalog
            .as_ref()
            .ok_or_else(|| ConfigError::Missing("[woocommerce] section".to_string()))
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn require(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing(field.to_string()));
    }
    Ok(())
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| invalid(field, &e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field, "scheme must be http or https"));
    }
    Ok(())
}
