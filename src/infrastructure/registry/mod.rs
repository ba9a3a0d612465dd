pub mod registry_client;

pub use registry_client::{RegistryClient, RegistryClientConfig};

use crate::domain::entities::Registry;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors that abort a registry fetch. None of them leave a usable catalog.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Could not reach registry at {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Registry at {url} answered HTTP {status}")]
    Protocol { url: String, status: u16 },

    #[error("Registry at {url} returned malformed data: {reason}")]
    Parse { url: String, reason: String },

    #[error("Registry API version {found} is not supported (expected {expected}); update libws")]
    VersionMismatch { expected: u32, found: u32 },
}

impl RegistryError {
    /// Location the error refers to, when there is one
    pub fn url(&self) -> Option<&str> {
        match self {
            RegistryError::Network { url, .. }
            | RegistryError::Protocol { url, .. }
            | RegistryError::Parse { url, .. } => Some(url),
            RegistryError::VersionMismatch { .. } => None,
        }
    }
}

/// Refuse a catalog whose API version differs from the one this build speaks
pub fn ensure_compatible(registry: &Registry, expected: u32) -> Result<(), RegistryError> {
    if registry.api_version != expected {
        return Err(RegistryError::VersionMismatch {
            expected,
            found: registry.api_version,
        });
    }
    Ok(())
}

/// Something that can hand out the library catalog
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Fetch (or return the already fetched) catalog
    async fn fetch(&self) -> Result<Arc<Registry>, RegistryError>;
}

/// In-memory catalog, used for offline resolution and tests
#[derive(Debug, Clone)]
pub struct StaticRegistry {
    registry: Arc<Registry>,
}

impl StaticRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

#[async_trait]
impl RegistrySource for StaticRegistry {
    async fn fetch(&self) -> Result<Arc<Registry>, RegistryError> {
        Ok(Arc::clone(&self.registry))
    }
}
