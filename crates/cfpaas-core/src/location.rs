//! PaaS location configuration and the client cache

use crate::client::PaasClient;
use crate::error::{PaasError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Target of a Cloud Foundry session
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationConfig {
    /// API endpoint (e.g. https://api.run.example.com)
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub org: String,

    #[serde(default)]
    pub space: String,

    /// User name for the password grant
    #[serde(default)]
    pub identity: String,

    /// Password for the password grant
    #[serde(default)]
    pub credential: String,

    #[serde(default)]
    pub skip_ssl_validation: bool,
}

impl std::fmt::Debug for LocationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationConfig")
            .field("endpoint", &self.endpoint)
            .field("org", &self.org)
            .field("space", &self.space)
            .field("identity", &self.identity)
            .field("credential", &"<redacted>")
            .field("skip_ssl_validation", &self.skip_ssl_validation)
            .finish()
    }
}

impl LocationConfig {
    /// Every field but `skip_ssl_validation` is required
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("endpoint", &self.endpoint),
            ("org", &self.org),
            ("space", &self.space),
            ("identity", &self.identity),
            ("credential", &self.credential),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(PaasError::Configuration(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }
        Ok(())
    }

    pub fn key(&self) -> LocationKey {
        LocationKey {
            endpoint: self.endpoint.trim_end_matches('/').to_string(),
            org: self.org.clone(),
            space: self.space.clone(),
            identity: self.identity.clone(),
        }
    }
}

/// Identity of a session, used to share clients
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationKey {
    pub endpoint: String,
    pub org: String,
    pub space: String,
    pub identity: String,
}

impl std::fmt::Display for LocationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{} ({}/{})",
            self.identity, self.endpoint, self.org, self.space
        )
    }
}

/// Opens authenticated sessions
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(&self, location: &LocationConfig) -> Result<Arc<dyn PaasClient>>;
}

/// Caller-owned cache of clients keyed by endpoint, org, space and identity
pub struct ClientCache<F> {
    factory: F,
    clients: Mutex<HashMap<LocationKey, Arc<dyn PaasClient>>>,
}

impl<F: ClientFactory> ClientCache<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Get a client for the location
    ///
    /// With `allow_reuse` a cached session is returned when present and a new
    /// one is cached otherwise; without it a fresh, uncached session is opened.
    pub async fn client(
        &self,
        location: &LocationConfig,
        allow_reuse: bool,
    ) -> Result<Arc<dyn PaasClient>> {
        location.validate()?;

        if !allow_reuse {
            tracing::debug!("Opening dedicated session for {}", location.key());
            return self.factory.connect(location).await;
        }

        let key = location.key();
        let mut clients = self.clients.lock().await;
        if let Some(client) = clients.get(&key) {
            tracing::debug!("Reusing session for {}", key);
            return Ok(Arc::clone(client));
        }

        tracing::debug!("Opening session for {}", key);
        let client = self.factory.connect(location).await?;
        clients.insert(key, Arc::clone(&client));
        Ok(client)
    }

    /// Drop the cached client for a location
    pub async fn evict(&self, location: &LocationConfig) -> bool {
        self.clients.lock().await.remove(&location.key()).is_some()
    }

    pub async fn clear(&self) {
        self.clients.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> LocationConfig {
        LocationConfig {
            endpoint: "https://api.run.example.com".to_string(),
            org: "acme".to_string(),
            space: "development".to_string(),
            identity: "deployer".to_string(),
            credential: "s3cret".to_string(),
            skip_ssl_validation: false,
        }
    }

    #[test]
    fn test_validate_requires_all_fields() {
        assert!(location().validate().is_ok());

        let mut missing = location();
        missing.space = String::new();
        let err = missing.validate().unwrap_err();
        assert!(matches!(err, PaasError::Configuration(ref m) if m.contains("space")));

        let mut blank = location();
        blank.credential = "  ".to_string();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_key_ignores_credential_and_trailing_slash() {
        let mut other = location();
        other.credential = "rotated".to_string();
        other.endpoint.push('/');
        assert_eq!(location().key(), other.key());
    }

    #[test]
    fn test_debug_redacts_credential() {
        let printed = format!("{:?}", location());
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("<redacted>"));
    }
}
