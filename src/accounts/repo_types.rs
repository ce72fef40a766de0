use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::query::Columns;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub name: String,
    pub balance: i64,
}

impl Account {
    /// New account opened with a zero balance.
    pub fn open(name: String, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
            name,
            balance: 0,
        }
    }

    pub fn to_columns(&self) -> Columns {
        let mut cols = Columns::new();
        cols.insert("id", self.id.into());
        cols.insert("created_at", self.created_at.into());
        cols.insert("updated_at", self.updated_at.into());
        cols.insert("name", self.name.clone().into());
        cols.insert("balance", self.balance.into());
        cols
    }
}
