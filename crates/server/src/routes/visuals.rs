use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    accessibility,
    visual::copy::{self, Category},
};

#[derive(Debug, Deserialize)]
pub struct CopyBankQuery {
    /// Comma-separated
    #[serde(default)]
    keywords: String,
}

#[derive(Debug, Serialize)]
pub struct CopySuggestion {
    category: Category,
    lines: Vec<&'static str>,
}

/// GET /api/visuals/copy-bank?keywords=a,b
pub async fn copy_bank(Query(query): Query<CopyBankQuery>) -> Json<Vec<CopySuggestion>> {
    let keywords: Vec<&str> = query
        .keywords
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return Json(Vec::new());
    }

    let suggestions = copy::suggest(&keywords)
        .into_iter()
        .map(|(category, lines)| CopySuggestion { category, lines })
        .collect();
    Json(suggestions)
}

/// GET /api/visuals/brand-contrast
pub async fn brand_contrast() -> Json<Value> {
    let mut pairs = Map::new();
    for (name, result) in accessibility::brand_contrast() {
        pairs.insert(name.to_string(), serde_json::to_value(result).unwrap_or(Value::Null));
    }
    Json(Value::Object(pairs))
}
