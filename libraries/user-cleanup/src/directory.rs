//! Remote user directory seam
use async_trait::async_trait;
use port_client::{Entity, EntityClientHandle};

/// Source of user records that can also delete them.
///
/// Implemented for the Port entity handle; tests substitute their own.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch every user record.
    async fn fetch_users(&self) -> port_client::Result<Vec<Entity>>;

    /// Delete one user by identifier.
    async fn delete_user(&self, identifier: &str) -> port_client::Result<()>;
}

#[async_trait]
impl UserDirectory for EntityClientHandle {
    async fn fetch_users(&self) -> port_client::Result<Vec<Entity>> {
        self.client().list_entities().await
    }

    async fn delete_user(&self, identifier: &str) -> port_client::Result<()> {
        self.client().delete_entity(identifier).await
    }
}
