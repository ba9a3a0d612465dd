use super::{ensure_compatible, RegistryError, RegistrySource};
use crate::domain::entities::{Registry, REGISTRY_API_VERSION};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Registry location used when neither the config file nor the CLI names one
pub const DEFAULT_REGISTRY_URL: &str = "https://h5p.org/registry.json";

/// Settings for [`RegistryClient`]
#[derive(Debug, Clone)]
pub struct RegistryClientConfig {
    /// `http(s)://` URL or path of a local JSON file
    pub url: String,

    /// HTTP timeout in seconds
    pub timeout_seconds: u64,

    /// API version this build understands
    pub expected_api_version: u32,
}

impl Default for RegistryClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY_URL.to_string(),
            timeout_seconds: 30,
            expected_api_version: REGISTRY_API_VERSION,
        }
    }
}

impl RegistryClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Fetches the library catalog once and serves it from memory afterwards.
///
/// Build a single client per process; every later `fetch` on it returns the
/// same catalog without touching the network again.
pub struct RegistryClient {
    config: RegistryClientConfig,
    http_client: reqwest::Client,
    cache: OnceCell<Arc<Registry>>,
}

impl RegistryClient {
    /// Create a new client
    pub fn new(config: RegistryClientConfig) -> Result<Self, RegistryError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("libws/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::Network {
                url: config.url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            config,
            http_client,
            cache: OnceCell::new(),
        })
    }

    /// Registry location
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Parse and validate a catalog document
    pub fn parse_registry(
        url: &str,
        body: &str,
        expected_api_version: u32,
    ) -> Result<Registry, RegistryError> {
        let registry: Registry = serde_json::from_str(body).map_err(|e| RegistryError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        ensure_compatible(&registry, expected_api_version)?;
        Ok(registry)
    }

    async fn load(&self) -> Result<Arc<Registry>, RegistryError> {
        info!("Fetching library registry from {}", self.config.url);
        let body = self.read_catalog().await?;
        let registry =
            Self::parse_registry(&self.config.url, &body, self.config.expected_api_version)?;
        debug!("Registry lists {} libraries", registry.len());
        Ok(Arc::new(registry))
    }

    async fn read_catalog(&self) -> Result<String, RegistryError> {
        let url = &self.config.url;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            // ローカルファイルとして扱う
            let path = url.strip_prefix("file://").unwrap_or(url);
            return tokio::fs::read_to_string(path)
                .await
                .map_err(|e| RegistryError::Network {
                    url: url.clone(),
                    reason: e.to_string(),
                });
        }

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| RegistryError::Network {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Protocol {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| RegistryError::Network {
            url: url.clone(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl RegistrySource for RegistryClient {
    async fn fetch(&self) -> Result<Arc<Registry>, RegistryError> {
        if let Some(registry) = self.cache.get() {
            debug!("Using cached registry");
            return Ok(Arc::clone(registry));
        }
        self.cache
            .get_or_try_init(|| self.load())
            .await
            .map(Arc::clone)
    }
}
