use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::api_models::market_data::SubscribeRequest;
use crate::api_models::ApiResponse;
use crate::app::AppState;
use crate::handler::error::AppError;

/// 订阅实时行情（转发到行情服务）
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let symbols: Vec<String> = payload
        .symbols
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if symbols.is_empty() {
        return Err(AppError::BadRequest("Invalid symbols array".to_string()));
    }

    tracing::info!("Forwarding subscription for {} symbols", symbols.len());
    let data: Value = state
        .market_data
        .post_json(&["api", "market-data", "subscribe"], &json!({ "symbols": symbols }))
        .await
        .map_err(|e| AppError::upstream("Subscription failed", &e))?;
    Ok(Json(ApiResponse::ok(data)))
}

pub async fn subscriptions(State(state): State<AppState>) -> Result<Json<ApiResponse<Value>>, AppError> {
    let data: Value = state
        .market_data
        .get_json(&["api", "market-data", "subscriptions"], &[])
        .await
        .map_err(|e| AppError::upstream("Failed to fetch subscriptions", &e))?;
    Ok(Json(ApiResponse::ok(data)))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::app::build_app_with_state;
    use crate::test_support::{spawn_upstream, state_with_upstream};

    async fn post_subscribe(body: Value) -> (StatusCode, Value) {
        let upstream = Router::new().route(
            "/api/market-data/subscribe",
            post(|Json(req): Json<Value>| async move {
                let count = req["symbols"].as_array().map(|a| a.len()).unwrap_or(0);
                Json(json!({"success": true, "count": count}))
            }),
        );
        let base = spawn_upstream(upstream).await;
        let app = build_app_with_state(state_with_upstream(&base), &[]).unwrap();
        let resp = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/market-data/subscribe")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn forwards_symbols() {
        let (status, body) = post_subscribe(json!({"symbols": ["NSE:TCS-EQ", " ", "NSE:INFY-EQ"]})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 2);
    }

    #[tokio::test]
    async fn empty_symbols_are_rejected() {
        let (status, body) = post_subscribe(json!({"symbols": []})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = post_subscribe(json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
