//! Port Catalog Client
//!
//! HTTP client library for the Port software catalog API.
//!
//! # Features
//!
//! - **Authentication**: Exchange client credentials for a bearer token
//! - **Entity listing**: Fetch every entity of a blueprint, following pagination
//! - **Entity deletion**: Delete entities by identifier
//!
//! # Example
//!
//! ```ignore
//! use port_client::{Credentials, PortClient, PortConfig, USER_BLUEPRINT};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PortClient::new(PortConfig::new("https://api.getport.io"))?;
//!     client.authenticate(&Credentials::new("client-id", "client-secret")).await?;
//!
//!     let users = client.entities(USER_BLUEPRINT).await?;
//!     for user in users.client().list_entities().await? {
//!         println!("{}", user.display_name());
//!     }
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod entities;
mod error;
mod types;

// Re-export main types
pub use client::{EntityClientHandle, PortClient};
pub use error::{PortClientError, Result};
pub use types::{Credentials, Entity, PortConfig, DEFAULT_API_URL, USER_BLUEPRINT};

// Re-export sub-clients for direct use if needed
pub use auth::AuthClient;
pub use entities::EntityClient;
