use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::query::{Columns, SqlValue};

const UNIQUE_URL_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ123456789";
const UNIQUE_URL_LEN: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrganizationType {
    Airline,
    Carrier,
    Warehouse,
}

impl OrganizationType {
    pub fn as_str(self) -> &'static str {
        match self {
            OrganizationType::Airline => "Airline",
            OrganizationType::Carrier => "Carrier",
            OrganizationType::Warehouse => "Warehouse",
        }
    }
}

/// Organization row. `organization_type` is stored as text.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Organization {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub name: String,
    pub unique_url: String,
    pub address: String,
    pub contact_info: String,
    pub organization_type: String,
}

impl Organization {
    pub fn new(
        name: String,
        address: String,
        contact_info: String,
        organization_type: OrganizationType,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
            name,
            unique_url: random_unique_url(),
            address,
            contact_info,
            organization_type: organization_type.as_str().to_string(),
        }
    }

    pub fn to_columns(&self) -> Columns {
        let mut cols = Columns::new();
        cols.insert("id", self.id.into());
        cols.insert("created_at", self.created_at.into());
        cols.insert("updated_at", self.updated_at.into());
        cols.insert("name", self.name.clone().into());
        cols.insert("unique_url", self.unique_url.clone().into());
        cols.insert("address", self.address.clone().into());
        cols.insert("contact_info", self.contact_info.clone().into());
        cols.insert("organization_type", self.organization_type.clone().into());
        cols
    }
}

fn random_unique_url() -> String {
    let mut rng = rand::thread_rng();
    (0..UNIQUE_URL_LEN)
        .map(|_| UNIQUE_URL_ALPHABET[rng.gen_range(0..UNIQUE_URL_ALPHABET.len())] as char)
        .collect()
}

#[derive(Debug, Clone)]
pub struct OrganizationChanges {
    pub updated_at: OffsetDateTime,
    pub name: Option<String>,
    pub unique_url: Option<String>,
    pub address: Option<String>,
    pub contact_info: Option<String>,
    pub organization_type: Option<OrganizationType>,
}

impl OrganizationChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.unique_url.is_none()
            && self.address.is_none()
            && self.contact_info.is_none()
            && self.organization_type.is_none()
    }

    pub fn to_columns(&self) -> Columns {
        let mut cols = Columns::new();
        cols.insert("updated_at", self.updated_at.into());
        let optional: [(&'static str, Option<SqlValue>); 5] = [
            ("name", self.name.clone().map(Into::into)),
            ("unique_url", self.unique_url.clone().map(Into::into)),
            ("address", self.address.clone().map(Into::into)),
            ("contact_info", self.contact_info.clone().map(Into::into)),
            (
                "organization_type",
                self.organization_type.map(|t| t.as_str().into()),
            ),
        ];
        cols.extend(optional.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))));
        cols
    }

    #[cfg(test)]
    pub fn apply(&self, org: &mut Organization) {
        org.updated_at = self.updated_at;
        if let Some(v) = &self.name {
            org.name = v.clone();
        }
        if let Some(v) = &self.unique_url {
            org.unique_url = v.clone();
        }
        if let Some(v) = &self.address {
            org.address = v.clone();
        }
        if let Some(v) = &self.contact_info {
            org.contact_info = v.clone();
        }
        if let Some(v) = self.organization_type {
            org.organization_type = v.as_str().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_url_uses_unambiguous_alphabet() {
        let url = random_unique_url();
        assert_eq!(url.len(), UNIQUE_URL_LEN);
        assert!(url.bytes().all(|b| UNIQUE_URL_ALPHABET.contains(&b)));
        assert!(!url.contains('O') && !url.contains('0') && !url.contains('I'));
    }
}
