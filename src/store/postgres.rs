//! Postgres repositories. Every statement comes from the query builder.

use async_trait::async_trait;
use sqlx::{postgres::PgArguments, query::QueryAs, PgPool, Postgres};
use tracing::debug;
use uuid::Uuid;

use super::{AccountRepository, OrganizationRepository, StoreError, UserRepository};
use crate::{
    accounts::repo_types::Account,
    auth::repo_types::{User, UserChanges},
    organizations::repo_types::{Organization, OrganizationChanges},
    query::{build_insert, build_select, build_update, Columns, SqlValue, Statement, Table},
};

fn bind_args<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    args: Vec<SqlValue>,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for arg in args {
        query = match arg {
            SqlValue::Uuid(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Int(v) => query.bind(v),
            SqlValue::BigInt(v) => query.bind(v),
            SqlValue::Timestamp(v) => query.bind(v),
        };
    }
    query
}

fn by_id(id: Uuid) -> Columns {
    Columns::from([("id", SqlValue::Uuid(id))])
}

/// Maps a unique-index violation to a conflict, everything else passes through.
fn conflict_on_unique(e: sqlx::Error, what: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(format!("{what} already exists"))
        }
        _ => StoreError::Database(e),
    }
}

async fn fetch_optional<O>(pool: &PgPool, stmt: Statement) -> Result<Option<O>, StoreError>
where
    O: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    let Statement { sql, args } = stmt;
    debug!(%sql, "query");
    let row = bind_args(sqlx::query_as::<_, O>(&sql), args)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn fetch_all<O>(pool: &PgPool, stmt: Statement) -> Result<Vec<O>, StoreError>
where
    O: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    let Statement { sql, args } = stmt;
    debug!(%sql, "query");
    let rows = bind_args(sqlx::query_as::<_, O>(&sql), args)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub struct PgUsers {
    db: PgPool,
}

impl PgUsers {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUsers {
    async fn create(&self, user: &User) -> Result<User, StoreError> {
        let Statement { sql, args } = build_insert(Table::Users, user.to_columns())?;
        bind_args(sqlx::query_as::<_, User>(&sql), args)
            .fetch_one(&self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "user with this email"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        fetch_optional(&self.db, build_select(Table::Users, by_id(id))?).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conditions = Columns::from([
            ("email", SqlValue::from(email)),
            ("is_deleted", SqlValue::Bool(false)),
        ]);
        fetch_optional(&self.db, build_select(Table::Users, conditions)?).await
    }

    async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<User, StoreError> {
        let stmt = build_update(Table::Users, changes.to_columns(), by_id(id))?;
        fetch_optional(&self.db, stmt)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user {id} not found")))
    }
}

pub struct PgOrganizations {
    db: PgPool,
}

impl PgOrganizations {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrganizationRepository for PgOrganizations {
    async fn create(&self, org: &Organization) -> Result<Organization, StoreError> {
        let Statement { sql, args } = build_insert(Table::Organizations, org.to_columns())?;
        bind_args(sqlx::query_as::<_, Organization>(&sql), args)
            .fetch_one(&self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "organization"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, StoreError> {
        fetch_optional(&self.db, build_select(Table::Organizations, by_id(id))?).await
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &OrganizationChanges,
    ) -> Result<Organization, StoreError> {
        let stmt = build_update(Table::Organizations, changes.to_columns(), by_id(id))?;
        fetch_optional(&self.db, stmt)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("organization {id} not found")))
    }
}

pub struct PgAccounts {
    db: PgPool,
}

impl PgAccounts {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for PgAccounts {
    async fn create(&self, account: &Account) -> Result<Account, StoreError> {
        let Statement { sql, args } = build_insert(Table::Accounts, account.to_columns())?;
        let row = bind_args(sqlx::query_as::<_, Account>(&sql), args)
            .fetch_one(&self.db)
            .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        fetch_optional(&self.db, build_select(Table::Accounts, by_id(id))?).await
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        fetch_all(&self.db, build_select(Table::Accounts, Columns::new())?).await
    }
}
