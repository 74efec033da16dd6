//! Parameterised CRUD builder over a small whitelist of tables.
//!
//! Every identifier (table, column, order key) is validated before it is
//! spliced into SQL; values are always bound as `?` parameters.

use regex::Regex;
use serde_json::{Map, Value};
use sqlx::{
    sqlite::{SqliteArguments, SqliteRow},
    Column, Row, SqlitePool, TypeInfo, ValueRef,
};
use std::sync::OnceLock;

/// Tables reachable through the generic data API.
pub const ALLOWED_TABLES: &[&str] = &["profiles", "coaches", "coach_sessions"];

/// Allowed tables that callers may read but never write. Coach prompts are
/// shared by every user's chat.
pub const READ_ONLY_TABLES: &[&str] = &["coaches"];

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum QueryError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("No condition provided for {0}")]
    MissingCondition(&'static str),
    #[error("No values provided for {0}")]
    EmptyRow(&'static str),
    #[error("Table is read-only: {0}")]
    ReadOnly(String),
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"))
}

fn check_identifier(name: &str) -> Result<(), QueryError> {
    if identifier_pattern().is_match(name) {
        Ok(())
    } else {
        Err(QueryError::InvalidIdentifier(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&Value> for SqlValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Int(i),
                None => SqlValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => SqlValue::Text(s.clone()),
            // Nested JSON is stored as its text form, like the `messages` column
            other => SqlValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Anything other than a case-insensitive `desc` sorts ascending.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
enum Operation {
    Select(Vec<String>),
    Insert(Vec<(String, SqlValue)>),
    Update(Vec<(String, SqlValue)>),
    Delete,
}

/// Entry point: `Table::from("coaches")?.select(["*"]).eq("id", "x")`.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
}

impl Table {
    pub fn from(name: &str) -> Result<Self, QueryError> {
        if !ALLOWED_TABLES.contains(&name) {
            return Err(QueryError::UnknownTable(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Like [`Table::from`], but refuses tables in [`READ_ONLY_TABLES`].
    pub fn writable(name: &str) -> Result<Self, QueryError> {
        let table = Self::from(name)?;
        if READ_ONLY_TABLES.contains(&name) {
            return Err(QueryError::ReadOnly(name.to_string()));
        }
        Ok(table)
    }

    pub fn select<I, S>(self, columns: I) -> Query
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query(Operation::Select(columns.into_iter().map(Into::into).collect()))
    }

    pub fn insert(self, row: &Map<String, Value>) -> Query {
        self.query(Operation::Insert(to_assignments(row)))
    }

    pub fn update(self, row: &Map<String, Value>) -> Query {
        self.query(Operation::Update(to_assignments(row)))
    }

    pub fn delete(self) -> Query {
        self.query(Operation::Delete)
    }

    fn query(self, operation: Operation) -> Query {
        Query {
            table: self.name,
            operation,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }
}

fn to_assignments(row: &Map<String, Value>) -> Vec<(String, SqlValue)> {
    row.iter()
        .map(|(column, value)| (column.clone(), SqlValue::from(value)))
        .collect()
}

#[derive(Debug, Clone)]
pub struct Query {
    table: String,
    operation: Operation,
    filters: Vec<(String, SqlValue)>,
    order: Option<(String, Direction)>,
    limit: Option<u32>,
}

impl Query {
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build(&self) -> Result<Compiled, QueryError> {
        check_identifier(&self.table)?;
        let mut params = Vec::new();

        let mut sql = match &self.operation {
            Operation::Select(columns) => {
                let list = if columns.is_empty() || columns.iter().any(|c| c == "*") {
                    "*".to_string()
                } else {
                    for column in columns {
                        check_identifier(column)?;
                    }
                    columns.join(", ")
                };
                format!("SELECT {} FROM {}", list, self.table)
            }
            Operation::Insert(row) => {
                if row.is_empty() {
                    return Err(QueryError::EmptyRow("insert"));
                }
                let mut columns = Vec::with_capacity(row.len());
                for (column, value) in row {
                    check_identifier(column)?;
                    columns.push(column.as_str());
                    params.push(value.clone());
                }
                let placeholders = vec!["?"; row.len()].join(", ");
                format!(
                    "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
                    self.table,
                    columns.join(", "),
                    placeholders
                )
            }
            Operation::Update(row) => {
                if row.is_empty() {
                    return Err(QueryError::EmptyRow("update"));
                }
                if self.filters.is_empty() {
                    return Err(QueryError::MissingCondition("update"));
                }
                let mut sets = Vec::with_capacity(row.len());
                for (column, value) in row {
                    check_identifier(column)?;
                    sets.push(format!("{} = ?", column));
                    params.push(value.clone());
                }
                format!("UPDATE {} SET {}", self.table, sets.join(", "))
            }
            Operation::Delete => {
                if self.filters.is_empty() {
                    return Err(QueryError::MissingCondition("delete"));
                }
                format!("DELETE FROM {}", self.table)
            }
        };

        if !matches!(self.operation, Operation::Insert(_)) && !self.filters.is_empty() {
            let mut conditions = Vec::with_capacity(self.filters.len());
            for (column, value) in &self.filters {
                check_identifier(column)?;
                conditions.push(format!("{} = ?", column));
                params.push(value.clone());
            }
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if let Operation::Select(_) = self.operation {
            if let Some((column, direction)) = &self.order {
                check_identifier(column)?;
                sql.push_str(&format!(" ORDER BY {} {}", column, direction.as_sql()));
            }
            if let Some(limit) = self.limit {
                sql.push_str(&format!(" LIMIT {}", limit));
            }
        }

        if let Operation::Update(_) = self.operation {
            sql.push_str(" RETURNING *");
        }

        Ok(Compiled { sql, params })
    }
}

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Compiled {
    fn bound(&self) -> sqlx::query::Query<'_, sqlx::Sqlite, SqliteArguments<'_>> {
        let mut query = sqlx::query(&self.sql);
        for param in &self.params {
            query = match param {
                SqlValue::Null => query.bind(None::<String>),
                SqlValue::Bool(b) => query.bind(*b),
                SqlValue::Int(i) => query.bind(*i),
                SqlValue::Float(f) => query.bind(*f),
                SqlValue::Text(s) => query.bind(s.clone()),
            };
        }
        query
    }

    /// Run a statement that yields rows (SELECT, or INSERT/UPDATE with RETURNING).
    pub async fn fetch_all(&self, pool: &SqlitePool) -> Result<Vec<Value>, sqlx::Error> {
        let rows = self.bound().fetch_all(pool).await?;
        rows.iter().map(row_to_json).collect()
    }

    pub async fn execute(&self, pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        let result = self.bound().execute(pool).await?;
        Ok(result.rows_affected())
    }
}

/// Convert a row into a JSON object keyed by column name, using each
/// value's storage class.
pub fn row_to_json(row: &SqliteRow) -> Result<Value, sqlx::Error> {
    let mut object = Map::new();
    for column in row.columns() {
        let index = column.ordinal();
        let storage = {
            let raw = row.try_get_raw(index)?;
            if raw.is_null() {
                None
            } else {
                Some(raw.type_info().name().to_string())
            }
        };

        let value = match storage.as_deref() {
            None => Value::Null,
            Some("INTEGER") => Value::from(row.try_get::<i64, _>(index)?),
            Some("REAL") => Value::from(row.try_get::<f64, _>(index)?),
            Some("BLOB") => {
                let bytes: Vec<u8> = row.try_get(index)?;
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            }
            Some(_) => Value::String(row.try_get::<String, _>(index)?),
        };
        object.insert(column.name().to_string(), value);
    }
    Ok(Value::Object(object))
}
