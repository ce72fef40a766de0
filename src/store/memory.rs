//! In-process repositories backing handler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{AccountRepository, OrganizationRepository, StoreError, UserRepository};
use crate::{
    accounts::repo_types::Account,
    auth::repo_types::{User, UserChanges},
    organizations::repo_types::{Organization, OrganizationChanges},
};

#[derive(Default)]
pub struct MemoryUsers {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn create(&self, user: &User) -> Result<User, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| !u.is_deleted && !user.is_deleted && u.email == user.email) {
            return Err(StoreError::Conflict(
                "user with this email already exists".into(),
            ));
        }
        rows.push(user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email && !u.is_deleted)
            .cloned())
    }

    async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<User, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("user {id} not found")))?;
        changes.apply(user);
        Ok(user.clone())
    }
}

#[derive(Default)]
pub struct MemoryOrganizations {
    rows: Mutex<Vec<Organization>>,
}

#[async_trait]
impl OrganizationRepository for MemoryOrganizations {
    async fn create(&self, org: &Organization) -> Result<Organization, StoreError> {
        self.rows.lock().unwrap().push(org.clone());
        Ok(org.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, StoreError> {
        Ok(self.rows.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &OrganizationChanges,
    ) -> Result<Organization, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let org = rows
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("organization {id} not found")))?;
        changes.apply(org);
        Ok(org.clone())
    }
}

#[derive(Default)]
pub struct MemoryAccounts {
    rows: Mutex<Vec<Account>>,
}

#[async_trait]
impl AccountRepository for MemoryAccounts {
    async fn create(&self, account: &Account) -> Result<Account, StoreError> {
        self.rows.lock().unwrap().push(account.clone());
        Ok(account.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.rows.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.rows.lock().unwrap().clone())
    }
}
