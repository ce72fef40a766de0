use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::query::{Columns, SqlValue};

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub user_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String, // Argon2 PHC string, not exposed in JSON
    #[serde(skip_serializing)]
    pub is_admin: bool,
    #[serde(skip_serializing)]
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    #[serde(skip_serializing)]
    pub last_request: OffsetDateTime,
    #[serde(skip_serializing)]
    pub last_login: OffsetDateTime,
    #[serde(skip_serializing)]
    pub failed_login_attempts: i32,
}

impl User {
    /// Fresh record for a registration: new v7 id, counters at zero, every
    /// timestamp set to `now`.
    pub fn register(email: String, hashed_password: String, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
            user_name: email.clone(),
            email,
            hashed_password,
            is_admin: false,
            is_verified: false,
            is_deleted: false,
            last_request: now,
            last_login: now,
            failed_login_attempts: 0,
        }
    }

    pub fn to_columns(&self) -> Columns {
        let mut cols = Columns::new();
        cols.insert("id", self.id.into());
        cols.insert("created_at", self.created_at.into());
        cols.insert("updated_at", self.updated_at.into());
        cols.insert("user_name", self.user_name.clone().into());
        cols.insert("email", self.email.clone().into());
        cols.insert("hashed_password", self.hashed_password.clone().into());
        cols.insert("is_admin", self.is_admin.into());
        cols.insert("is_verified", self.is_verified.into());
        cols.insert("is_deleted", self.is_deleted.into());
        cols.insert("last_request", self.last_request.into());
        cols.insert("last_login", self.last_login.into());
        cols.insert("failed_login_attempts", self.failed_login_attempts.into());
        cols
    }
}

/// Partial update of a user row. `updated_at` is always written.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub updated_at: OffsetDateTime,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub hashed_password: Option<String>,
    pub is_deleted: Option<bool>,
    pub last_request: Option<OffsetDateTime>,
    pub last_login: Option<OffsetDateTime>,
    pub failed_login_attempts: Option<i32>,
}

impl UserChanges {
    pub fn at(now: OffsetDateTime) -> Self {
        Self {
            updated_at: now,
            user_name: None,
            email: None,
            hashed_password: None,
            is_deleted: None,
            last_request: None,
            last_login: None,
            failed_login_attempts: None,
        }
    }

    pub fn to_columns(&self) -> Columns {
        let mut cols = Columns::new();
        cols.insert("updated_at", self.updated_at.into());
        let optional: [(&'static str, Option<SqlValue>); 7] = [
            ("user_name", self.user_name.clone().map(Into::into)),
            ("email", self.email.clone().map(Into::into)),
            ("hashed_password", self.hashed_password.clone().map(Into::into)),
            ("is_deleted", self.is_deleted.map(Into::into)),
            ("last_request", self.last_request.map(Into::into)),
            ("last_login", self.last_login.map(Into::into)),
            ("failed_login_attempts", self.failed_login_attempts.map(Into::into)),
        ];
        cols.extend(optional.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))));
        cols
    }

    /// Applies the same change set to an in-memory record.
    #[cfg(test)]
    pub fn apply(&self, user: &mut User) {
        user.updated_at = self.updated_at;
        if let Some(v) = &self.user_name {
            user.user_name = v.clone();
        }
        if let Some(v) = &self.email {
            user.email = v.clone();
        }
        if let Some(v) = &self.hashed_password {
            user.hashed_password = v.clone();
        }
        if let Some(v) = self.is_deleted {
            user.is_deleted = v;
        }
        if let Some(v) = self.last_request {
            user.last_request = v;
        }
        if let Some(v) = self.last_login {
            user.last_login = v;
        }
        if let Some(v) = self.failed_login_attempts {
            user.failed_login_attempts = v;
        }
    }
}
