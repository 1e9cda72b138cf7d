//! Main Port API client.

use crate::auth::AuthClient;
use crate::entities::EntityClient;
use crate::error::{PortClientError, Result};
use crate::types::{Credentials, PortConfig};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Main client for interacting with the Port API.
///
/// The client owns the HTTP connection pool and the access token, and
/// hands out per-blueprint entity handles once authenticated.
///
/// # Example
///
/// ```ignore
/// use port_client::{Credentials, PortClient, PortConfig, USER_BLUEPRINT};
///
/// let client = PortClient::new(PortConfig::new("https://api.getport.io"))?;
/// client.authenticate(&Credentials::new("id", "secret")).await?;
///
/// let users = client.entities(USER_BLUEPRINT).await?;
/// let all = users.client().list_entities().await?;
/// println!("Found {} users", all.len());
/// ```
pub struct PortClient {
    http: Client,
    config: Arc<RwLock<PortConfig>>,
}

impl PortClient {
    /// Create a new client with the given configuration.
    pub fn new(config: PortConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(PortClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PortClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&url).map_err(|e| PortClientError::InvalidUrl(e.to_string()))?;

        let normalized_config = PortConfig {
            url,
            access_token: config.access_token,
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("port-user-janitor/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(PortClientError::Request)?;

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(normalized_config)),
        })
    }

    /// Get the API base URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    /// Check if the client holds an access token.
    pub async fn is_authenticated(&self) -> bool {
        self.config.read().await.access_token.is_some()
    }

    /// Exchange client credentials for an access token.
    ///
    /// On success the token is stored for subsequent requests.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<()> {
        let url = self.url().await;

        let auth_client = AuthClient::new(&self.http, &url);
        let token = auth_client.request_access_token(credentials).await?;

        self.config.write().await.access_token = Some(token);
        Ok(())
    }

    /// Get an entity handle for a blueprint.
    ///
    /// Returns an error if not authenticated.
    pub async fn entities(&self, blueprint: &str) -> Result<EntityClientHandle> {
        let config = self.config.read().await;
        let access_token = config
            .access_token
            .clone()
            .ok_or(PortClientError::AuthRequired)?;
        let url = config.url.clone();
        drop(config);

        debug!(blueprint = %blueprint, "Created entity handle");

        Ok(EntityClientHandle {
            http: self.http.clone(),
            url,
            access_token,
            blueprint: blueprint.to_string(),
        })
    }
}

/// Handle for entity operations on one blueprint.
///
/// Returned by `PortClient::entities()`.
pub struct EntityClientHandle {
    http: Client,
    url: String,
    access_token: String,
    blueprint: String,
}

impl EntityClientHandle {
    /// Get the entity client.
    pub fn client(&self) -> EntityClient<'_> {
        EntityClient::new(&self.http, &self.url, &self.access_token, &self.blueprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_validation() {
        assert!(PortClient::new(PortConfig::new("https://api.getport.io")).is_ok());
        assert!(PortClient::new(PortConfig::new("http://localhost:8080")).is_ok());

        assert!(PortClient::new(PortConfig::new("")).is_err());
        assert!(PortClient::new(PortConfig::new("not-a-url")).is_err());
        assert!(PortClient::new(PortConfig::new("ftp://example.com")).is_err());
    }

    #[tokio::test]
    async fn test_url_normalization() {
        let client = PortClient::new(PortConfig::new("https://api.getport.io/")).unwrap();
        assert_eq!(client.url().await, "https://api.getport.io");
    }

    #[tokio::test]
    async fn test_entities_requires_token() {
        let client = PortClient::new(PortConfig::default()).unwrap();
        assert!(matches!(
            client.entities("_user").await,
            Err(PortClientError::AuthRequired)
        ));

        let client =
            PortClient::new(PortConfig::with_token("https://api.getport.io", "tok")).unwrap();
        let handle = client.entities("_user").await.unwrap();
        assert_eq!(
            handle.client().entity_url("jane+ops@example.com"),
            "https://api.getport.io/v1/blueprints/_user/entities/jane%2Bops%40example.com"
        );
    }
}
