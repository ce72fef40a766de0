//! Repository seam between handlers and storage.
//!
//! Handlers never see a connection pool: they receive a [`Store`] through the
//! request context and talk to the traits below.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    accounts::repo_types::Account,
    auth::repo_types::{User, UserChanges},
    organizations::repo_types::{Organization, OrganizationChanges},
    query::QueryError,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("build query: {0}")]
    Query(#[from] QueryError),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Only non-deleted users are matched.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<User, StoreError>;
}

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn create(&self, org: &Organization) -> Result<Organization, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, StoreError>;
    async fn update(
        &self,
        id: Uuid,
        changes: &OrganizationChanges,
    ) -> Result<Organization, StoreError>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create(&self, account: &Account) -> Result<Account, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;
    async fn list(&self) -> Result<Vec<Account>, StoreError>;
}

/// Shared handle to every repository. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub accounts: Arc<dyn AccountRepository>,
}

impl Store {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUsers::new(pool.clone())),
            organizations: Arc::new(postgres::PgOrganizations::new(pool.clone())),
            accounts: Arc::new(postgres::PgAccounts::new(pool)),
        }
    }

    #[cfg(test)]
    pub fn memory() -> Self {
        Self {
            users: Arc::new(memory::MemoryUsers::default()),
            organizations: Arc::new(memory::MemoryOrganizations::default()),
            accounts: Arc::new(memory::MemoryAccounts::default()),
        }
    }
}
