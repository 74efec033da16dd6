//! Generic row access over the whitelisted tables, scoped to the caller.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Map, Value};

use crate::{
    auth::CurrentUser,
    db::query::{Direction, QueryError, Table},
    error::AppError,
    state::AppState,
};

const RESERVED_PARAMS: [&str; 4] = ["columns", "order", "direction", "limit"];

/// Column tying a row to its owner, for tables that have one.
fn owner_column(table: &str) -> Option<&'static str> {
    match table {
        "coach_sessions" => Some("user_id"),
        "profiles" => Some("id"),
        _ => None,
    }
}

fn filters(params: &[(String, String)]) -> Vec<(String, String)> {
    params
        .iter()
        .filter(|(key, _)| !RESERVED_PARAMS.contains(&key.as_str()))
        .cloned()
        .collect()
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn body_object(body: Value) -> Result<Map<String, Value>, AppError> {
    match body {
        Value::Object(row) => Ok(row),
        _ => Err(AppError::BadRequest("Request body must be a JSON object".to_string())),
    }
}

/// GET /api/data/:table
pub async fn select_rows(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, AppError> {
    let columns: Vec<String> = param(&params, "columns")
        .unwrap_or("*")
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    let mut query = Table::from(&table)?.select(columns);
    for (column, value) in filters(&params) {
        query = query.eq(column, value);
    }
    if let Some(owner) = owner_column(&table) {
        query = query.eq(owner, current.user.id.as_str());
    }
    if let Some(column) = param(&params, "order") {
        let direction = param(&params, "direction")
            .map(Direction::parse)
            .unwrap_or(Direction::Desc);
        query = query.order(column, direction);
    }
    if let Some(raw) = param(&params, "limit") {
        let limit = raw
            .parse::<u32>()
            .map_err(|_| AppError::BadRequest(format!("Invalid limit: {}", raw)))?;
        query = query.limit(limit);
    }

    let results = query.build()?.fetch_all(state.db.pool()).await?;
    Ok(Json(json!({ "results": results })))
}

/// POST /api/data/:table
pub async fn insert_row(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let target = Table::writable(&table)?;
    let mut row = body_object(body)?;
    if let Some(owner) = owner_column(&table) {
        row.insert(owner.to_string(), Value::from(current.user.id.as_str()));
    }

    let rows = target
        .insert(&row)
        .build()?
        .fetch_all(state.db.pool())
        .await?;
    tracing::debug!("Inserted {} row(s) into {}", rows.len(), table);
    Ok(Json(json!({ "data": rows })))
}

/// PATCH /api/data/:table
pub async fn update_rows(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let target = Table::writable(&table)?;
    let conditions = filters(&params);
    if conditions.is_empty() {
        return Err(QueryError::MissingCondition("update").into());
    }

    let mut row = body_object(body)?;
    let owner = owner_column(&table);
    if let Some(owner) = owner {
        row.remove(owner);
    }

    let mut query = target.update(&row);
    for (column, value) in conditions {
        query = query.eq(column, value);
    }
    if let Some(owner) = owner {
        query = query.eq(owner, current.user.id.as_str());
    }

    let rows = query.build()?.fetch_all(state.db.pool()).await?;
    tracing::debug!("Updated {} row(s) in {}", rows.len(), table);
    Ok(Json(json!({ "data": rows })))
}

/// DELETE /api/data/:table
pub async fn delete_rows(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, AppError> {
    let target = Table::writable(&table)?;
    let conditions = filters(&params);
    if conditions.is_empty() {
        return Err(QueryError::MissingCondition("delete").into());
    }

    let mut query = target.delete();
    for (column, value) in conditions {
        query = query.eq(column, value);
    }
    if let Some(owner) = owner_column(&table) {
        query = query.eq(owner, current.user.id.as_str());
    }

    let deleted = query.build()?.execute(state.db.pool()).await?;
    tracing::debug!("Deleted {} row(s) from {}", deleted, table);
    Ok(Json(json!({ "data": { "deleted": deleted } })))
}
