use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    auth::{jwt::TokenService, password::PasswordHasher, services::LockoutPolicy},
    config::AppConfig,
    store::Store,
};

/// Process-wide services, built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Store,
    pub tokens: TokenService,
    pub passwords: PasswordHasher,
    pub lockout: LockoutPolicy,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        Self::from_parts(config, Store::postgres(db))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Store) -> anyhow::Result<Self> {
        Ok(Self {
            tokens: TokenService::new(&config.jwt),
            passwords: PasswordHasher::new(&config.password)?,
            lockout: LockoutPolicy::from(&config.lockout),
            store,
            config,
        })
    }

    /// In-memory state with cheap hashing, for handler tests.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with(crate::config::IdentityPolicy::Trust)
    }

    #[cfg(test)]
    pub fn fake_with(identity: crate::config::IdentityPolicy) -> Self {
        let config = Arc::new(AppConfig::for_tests(identity));
        Self::from_parts(config, Store::memory()).expect("fake state")
    }
}
