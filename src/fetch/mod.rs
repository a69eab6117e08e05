//! HTTP fetching with caching.
//!
//! Raw API responses are cached on disk keyed by URL hash, with a metadata
//! sidecar recording when they were fetched. Parsed snapshots are cached in
//! memory by [`store::SnapshotStore`].

pub mod fpl;
pub mod store;

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

pub use fpl::{FplClient, SnapshotSource};
pub use store::{SnapshotStore, StoreStatus};

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Content too large: {size} bytes (max {max_size})")]
    ContentTooLarge { size: usize, max_size: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of a fetch operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    /// Original URL that was fetched
    pub url: Url,

    /// Path where content is cached
    pub cache_path: PathBuf,

    /// Content length in bytes
    pub content_length: usize,

    /// When the content was fetched
    pub fetched_at: DateTime<Utc>,

    /// Whether this was served from cache
    pub from_cache: bool,

    /// Whether the cached copy was past its TTL when served
    pub stale: bool,
}

/// Metadata stored alongside cached content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub content_length: usize,
    pub etag: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Directory to cache raw responses
    pub cache_dir: PathBuf,

    /// How long cached content is considered fresh
    pub cache_ttl: Duration,

    /// Maximum response size (default 20MB)
    pub max_content_size: usize,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./data/raw"),
            cache_ttl: Duration::from_secs(300), // 5 minutes
            max_content_size: 20 * 1024 * 1024,
            timeout: Duration::from_secs(15),
            user_agent: format!("fpl-analytics/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP fetcher with local caching.
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Fetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("fpl-analytics")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a fetcher with default configuration.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(FetcherConfig::default())
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetch a URL, using cache if available and fresh.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError> {
        if let Some(result) = self.check_cache(url, false).await? {
            return Ok(result);
        }
        self.fetch_and_cache(url).await
    }

    /// Force fetch from network, ignoring cache.
    pub async fn fetch_fresh(&self, url: &Url) -> Result<FetchResult, FetchError> {
        self.fetch_and_cache(url).await
    }

    /// Get fresh content from cache without network fallback.
    pub async fn get_cached(&self, url: &Url) -> Option<FetchResult> {
        self.check_cache(url, false).await.ok().flatten()
    }

    /// Get cached content regardless of age.
    pub async fn get_stale(&self, url: &Url) -> Option<FetchResult> {
        self.check_cache(url, true).await.ok().flatten()
    }

    /// Fetch and decode JSON. When the network fails, a cached copy of any
    /// age is used instead and a warning is logged.
    ///
    /// With `force` the network is the only source: a failed request is an
    /// error even if a cached copy exists.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        force: bool,
    ) -> Result<(T, FetchResult), FetchError> {
        let result = if force {
            self.fetch_fresh(url).await?
        } else {
            match self.fetch(url).await {
                Ok(result) => result,
                Err(e) => match self.get_stale(url).await {
                    Some(stale) => {
                        warn!(
                            "Fetching {} failed ({}), using cached copy from {}",
                            url, e, stale.fetched_at
                        );
                        stale
                    }
                    None => return Err(e),
                },
            }
        };

        let text = self.read_cached_text(&result).await?;
        let value = serde_json::from_str(&text)?;
        Ok((value, result))
    }

    /// Check if content is cached and, unless `allow_stale`, fresh.
    async fn check_cache(
        &self,
        url: &Url,
        allow_stale: bool,
    ) -> Result<Option<FetchResult>, FetchError> {
        let cache_path = self.cache_path_for_url(url);
        let meta_path = self.meta_path_for_url(url);
        if !cache_path.exists() || !meta_path.exists() {
            return Ok(None);
        }

        let meta_content = fs::read_to_string(&meta_path).await?;
        let meta: CacheMetadata = match serde_json::from_str(&meta_content) {
            Ok(m) => m,
            Err(_) => return Ok(None),
        };

        let stale = self.is_expired(meta.fetched_at, Utc::now());
        if stale && !allow_stale {
            debug!("Cache expired for {}", url);
            return Ok(None);
        }

        debug!("Serving {} from cache", url);
        Ok(Some(FetchResult {
            url: url.clone(),
            cache_path,
            content_length: meta.content_length,
            fetched_at: meta.fetched_at,
            from_cache: true,
            stale,
        }))
    }

    fn is_expired(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(fetched_at);
        age.num_seconds() >= self.config.cache_ttl.as_secs() as i64
    }

    /// Fetch from network and cache the result.
    async fn fetch_and_cache(&self, url: &Url) -> Result<FetchResult, FetchError> {
        info!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(FetchError::RateLimited {
                host: url.host_str().unwrap_or("unknown").to_string(),
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let etag = response
            .headers()
            .get("etag")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let content = response.bytes().await?;

        if content.len() > self.config.max_content_size {
            return Err(FetchError::ContentTooLarge {
                size: content.len(),
                max_size: self.config.max_content_size,
            });
        }

        let fetched_at = Utc::now();
        let cache_path = self.cache_path_for_url(url);
        self.write_cache(url, &content, etag, fetched_at).await?;

        Ok(FetchResult {
            url: url.clone(),
            cache_path,
            content_length: content.len(),
            fetched_at,
            from_cache: false,
            stale: false,
        })
    }

    async fn write_cache(
        &self,
        url: &Url,
        content: &[u8],
        etag: Option<String>,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), FetchError> {
        let cache_path = self.cache_path_for_url(url);
        let meta_path = self.meta_path_for_url(url);

        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&cache_path).await?;
        file.write_all(content).await?;
        file.flush().await?;

        let meta = CacheMetadata {
            url: url.to_string(),
            fetched_at,
            content_length: content.len(),
            etag,
            expires_at: Some(
                fetched_at + chrono::Duration::seconds(self.config.cache_ttl.as_secs() as i64),
            ),
        };

        let meta_json = serde_json::to_string_pretty(&meta)?;
        fs::write(meta_path, meta_json).await?;
        Ok(())
    }

    /// Generate a cache path for a URL.
    fn cache_path_for_url(&self, url: &Url) -> PathBuf {
        self.host_dir(url).join(format!("{}.json", Self::url_hash(url)))
    }

    /// Generate a metadata path for a URL.
    fn meta_path_for_url(&self, url: &Url) -> PathBuf {
        self.host_dir(url)
            .join(format!("{}.meta.json", Self::url_hash(url)))
    }

    fn host_dir(&self, url: &Url) -> PathBuf {
        self.config
            .cache_dir
            .join(url.host_str().unwrap_or("unknown"))
    }

    /// Hash a URL to a short string.
    fn url_hash(url: &Url) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }

    /// Read cached content as string.
    pub async fn read_cached_text(&self, result: &FetchResult) -> Result<String, FetchError> {
        Ok(fs::read_to_string(&result.cache_path).await?)
    }
}
