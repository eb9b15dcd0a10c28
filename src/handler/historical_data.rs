use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::api_models::historical_data::{TickDataQuery, TickDataResponse};
use crate::app::AppState;
use crate::handler::error::AppError;
use crate::utils::ticker::ExchangeSymbol;
use crate::utils::time::parse_date;
use crate::utils::upstream::UpstreamError;

/// 某交易日的逐笔行情（09:15 IST 之后）
pub async fn tick_data(
    State(state): State<AppState>,
    Query(query): Query<TickDataQuery>,
) -> Result<Json<TickDataResponse>, AppError> {
    let (Some(raw_symbol), Some(raw_date)) = (
        query.symbol.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        query.date.as_deref().map(str::trim).filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::BadRequest("Missing symbol or date parameter".to_string()));
    };

    let symbol = ExchangeSymbol::parse(raw_symbol).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let date = parse_date(raw_date).ok_or_else(|| AppError::BadRequest(format!("Invalid date: {}", raw_date)))?;

    let resp = state
        .tick_data
        .fetch_day(raw_symbol, &symbol, date)
        .await
        .map_err(|e| match e {
            UpstreamError::Status { status, .. } if status == StatusCode::NOT_FOUND => {
                AppError::NotFound(format!("No tick data for {} on {}", raw_symbol, raw_date))
            }
            other => AppError::upstream("Failed to fetch tick data", &other),
        })?;
    Ok(Json(resp))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::app::build_app_with_state;
    use crate::test_support::{spawn_upstream, state_with_upstream};

    // 2025-01-15 09:15 IST
    const OPEN: i64 = 1_736_912_700;

    async fn call(uri: &str) -> (StatusCode, serde_json::Value) {
        let body = format!(
            "{}\n{}\n{{broken\n",
            json!({"ltp": 990.0, "timestamp": OPEN - 300}),
            json!({"ltp": 1001.5, "timestamp": OPEN + 1, "vol_traded_today": 42}),
        );
        let tick_server = Router::new().route(
            "/Live/LD_15-01-2025/AXISBANK-NSE.json",
            get(move || {
                let body = body.clone();
                async move { body }
            }),
        );
        let base = spawn_upstream(tick_server).await;
        let app = build_app_with_state(state_with_upstream(&base), &[]).unwrap();
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn returns_points_after_open() {
        let (status, body) = call("/api/historical-data?symbol=NSE:AXISBANK-EQ&date=2025-01-15").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["source"], "external");
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["vol_traded_today"], 42);
        assert_eq!(body["metadata"]["filteredPoints"], 1);
        assert_eq!(body["metadata"]["skippedLines"], 1);
        assert_eq!(body["metadata"]["tradingStartTimestamp"], OPEN);
    }

    #[tokio::test]
    async fn missing_or_malformed_params_are_rejected() {
        let (status, body) = call("/api/historical-data?symbol=NSE:AXISBANK-EQ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = call("/api/historical-data?symbol=AXISBANK&date=2025-01-15").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Invalid symbol format"));
    }

    #[tokio::test]
    async fn symbol_with_path_characters_is_rejected() {
        let (status, body) = call("/api/historical-data?symbol=NSE:..%2F..%2Fsecret-EQ&date=2025-01-15").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Invalid symbol format"));
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let (status, _) = call("/api/historical-data?symbol=NSE:TCS-EQ&date=2025-01-15").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
