//! Parameterized INSERT / UPDATE / SELECT construction over an allow-listed
//! set of tables.
//!
//! Column maps are `BTreeMap`s, so columns always come out in lexicographic
//! order and identical input yields a byte-identical statement.

use std::{collections::BTreeMap, fmt, str::FromStr};

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Tables the builder will generate statements for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    Organizations,
    Accounts,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Organizations => "organizations",
            Table::Accounts => "accounts",
        }
    }

    /// Columns that may appear in a statement for this table.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Table::Users => &[
                "id",
                "created_at",
                "updated_at",
                "user_name",
                "email",
                "hashed_password",
                "is_admin",
                "is_verified",
                "is_deleted",
                "last_request",
                "last_login",
                "failed_login_attempts",
            ],
            Table::Organizations => &[
                "id",
                "created_at",
                "updated_at",
                "name",
                "unique_url",
                "address",
                "contact_info",
                "organization_type",
            ],
            Table::Accounts => &["id", "created_at", "updated_at", "name", "balance"],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(Table::Users),
            "organizations" => Ok(Table::Organizations),
            "accounts" => Ok(Table::Accounts),
            other => Err(QueryError::InvalidTable(other.to_string())),
        }
    }
}

/// A value bound to a positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Uuid(Uuid),
    Text(String),
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Timestamp(OffsetDateTime),
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::BigInt(v)
    }
}

impl From<OffsetDateTime> for SqlValue {
    fn from(v: OffsetDateTime) -> Self {
        SqlValue::Timestamp(v)
    }
}

/// Column name to value, ordered by column name.
pub type Columns = BTreeMap<&'static str, SqlValue>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid table name: {0}")]
    InvalidTable(String),
    #[error("unknown column {column} for table {table}")]
    UnknownColumn { table: Table, column: String },
    #[error("no data provided for insert query")]
    EmptyInsert,
    #[error("update data cannot be empty")]
    EmptyUpdate,
    #[error("conditions cannot be empty for update query")]
    EmptyConditions,
}

/// Statement text plus its positional arguments (`$1` is `args[0]`).
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<SqlValue>,
}

fn check_columns(table: Table, columns: &Columns) -> Result<(), QueryError> {
    let allowed = table.columns();
    match columns.keys().find(|c| !allowed.contains(*c)) {
        Some(column) => Err(QueryError::UnknownColumn {
            table,
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

/// Renders `col = $n` fragments, numbering from `first`.
fn assignments(columns: &Columns, first: usize) -> Vec<String> {
    columns
        .keys()
        .enumerate()
        .map(|(i, col)| format!("{col} = ${}", first + i))
        .collect()
}

/// `INSERT INTO <table> (<cols>) VALUES ($1, ...) RETURNING *`
pub fn build_insert(table: Table, data: Columns) -> Result<Statement, QueryError> {
    if data.is_empty() {
        return Err(QueryError::EmptyInsert);
    }
    check_columns(table, &data)?;

    let columns: Vec<&str> = data.keys().copied().collect();
    let placeholders: Vec<String> = (1..=data.len()).map(|i| format!("${i}")).collect();

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        table,
        columns.join(", "),
        placeholders.join(", "),
    );
    Ok(Statement {
        sql,
        args: data.into_values().collect(),
    })
}

/// `UPDATE <table> SET ... WHERE ... RETURNING *`
///
/// SET placeholders are numbered first, WHERE placeholders continue after
/// them. An empty condition map is refused so a caller can never rewrite the
/// whole table.
pub fn build_update(
    table: Table,
    data: Columns,
    conditions: Columns,
) -> Result<Statement, QueryError> {
    if data.is_empty() {
        return Err(QueryError::EmptyUpdate);
    }
    if conditions.is_empty() {
        return Err(QueryError::EmptyConditions);
    }
    check_columns(table, &data)?;
    check_columns(table, &conditions)?;

    let set = assignments(&data, 1);
    let filter = assignments(&conditions, data.len() + 1);

    let sql = format!(
        "UPDATE {} SET {} WHERE {} RETURNING *",
        table,
        set.join(", "),
        filter.join(" AND "),
    );
    let mut args: Vec<SqlValue> = data.into_values().collect();
    args.extend(conditions.into_values());
    Ok(Statement { sql, args })
}

/// `SELECT * FROM <table> [WHERE ...]`; no conditions means a full scan.
pub fn build_select(table: Table, conditions: Columns) -> Result<Statement, QueryError> {
    check_columns(table, &conditions)?;

    let mut sql = format!("SELECT * FROM {table}");
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&assignments(&conditions, 1).join(" AND "));
    }
    Ok(Statement {
        sql,
        args: conditions.into_values().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(pairs: Vec<(&'static str, SqlValue)>) -> Columns {
        pairs.into_iter().collect()
    }

    #[test]
    fn insert_sorts_columns_and_numbers_placeholders() {
        let stmt = build_insert(
            "users".parse().unwrap(),
            cols(vec![("id", 1i32.into()), ("email", "a".into())]),
        )
        .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO users (email, id) VALUES ($1, $2) RETURNING *"
        );
        assert_eq!(stmt.args, vec![SqlValue::from("a"), SqlValue::Int(1)]);
    }

    #[test]
    fn insert_is_deterministic() {
        let make = || {
            build_insert(
                Table::Users,
                cols(vec![("email", "a".into()), ("id", 1i32.into())]),
            )
            .unwrap()
        };
        let first = make();
        for _ in 0..10 {
            assert_eq!(make(), first);
        }
    }

    #[test]
    fn insert_rejects_empty_data() {
        let err = build_insert(Table::Accounts, Columns::new()).unwrap_err();
        assert_eq!(err, QueryError::EmptyInsert);
    }

    #[test]
    fn update_numbers_where_after_set() {
        let stmt = build_update(
            Table::Users,
            cols(vec![
                ("user_name", "bob".into()),
                ("failed_login_attempts", 2i32.into()),
            ]),
            cols(vec![("id", 7i32.into())]),
        )
        .unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE users SET failed_login_attempts = $1, user_name = $2 WHERE id = $3 RETURNING *"
        );
        assert_eq!(
            stmt.args,
            vec![SqlValue::Int(2), SqlValue::from("bob"), SqlValue::Int(7)]
        );
    }

    #[test]
    fn update_requires_data_and_conditions() {
        let err = build_update(Table::Users, Columns::new(), cols(vec![("id", 1i32.into())]))
            .unwrap_err();
        assert_eq!(err, QueryError::EmptyUpdate);

        let err = build_update(Table::Users, cols(vec![("email", "x".into())]), Columns::new())
            .unwrap_err();
        assert_eq!(err, QueryError::EmptyConditions);
        assert_eq!(
            err.to_string(),
            "conditions cannot be empty for update query"
        );
    }

    #[test]
    fn select_without_conditions_scans_table() {
        let stmt = build_select(Table::Organizations, Columns::new()).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM organizations");
        assert!(stmt.args.is_empty());
    }

    #[test]
    fn select_conjoins_sorted_conditions() {
        let stmt = build_select(
            Table::Users,
            cols(vec![("is_deleted", false.into()), ("email", "a@x.com".into())]),
        )
        .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM users WHERE email = $1 AND is_deleted = $2"
        );
        assert_eq!(
            stmt.args,
            vec![SqlValue::from("a@x.com"), SqlValue::Bool(false)]
        );
    }

    #[test]
    fn unknown_table_is_rejected() {
        let err = "payments".parse::<Table>().unwrap_err();
        assert_eq!(err.to_string(), "invalid table name: payments");
    }

    #[test]
    fn unknown_column_is_rejected() {
        let err = build_select(Table::Accounts, cols(vec![("email", "a".into())])).unwrap_err();
        assert_eq!(err.to_string(), "unknown column email for table accounts");
    }
}
