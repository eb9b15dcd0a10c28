use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api_models::ApiResponse;
use crate::app::AppState;
use crate::handler::error::AppError;
use crate::utils::ticker::is_valid_symbol;

const GTT_HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize)]
pub struct GttQuery {
    pub symbol: Option<String>,
}

/// GTT 预测服务代理
pub async fn gtt_predictions(
    State(state): State<AppState>,
    Query(query): Query<GttQuery>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let symbol = query
        .symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing required parameter: symbol".to_string()))?;
    if !is_valid_symbol(symbol) {
        return Err(AppError::BadRequest(format!("Invalid symbol: {}", symbol)));
    }

    let data: Value = state
        .gtt
        .get_json(&["gtt", "stock", symbol], &[])
        .await
        .map_err(|e| AppError::upstream("Failed to fetch GTT predictions", &e))?;
    let total = data
        .get("total_predictions")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0);
    tracing::info!(symbol, total, "fetched GTT predictions");
    Ok(Json(ApiResponse::ok(data)))
}

pub async fn gtt_health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let client = state.gtt.clone().with_timeout(GTT_HEALTH_TIMEOUT);
    match client.get_text(&["gtt", "health"], &[]).await {
        Ok(_) => (StatusCode::OK, Json(json!({"success": true}))),
        Err(e) => {
            tracing::warn!("GTT health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"success": false, "error": "GTT service unavailable"})),
            )
        }
    }
}
