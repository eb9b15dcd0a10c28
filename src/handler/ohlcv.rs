use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::api_models::ohlcv::{OhlcvBar, OhlcvQuery};
use crate::api_models::ApiResponse;
use crate::app::AppState;
use crate::handler::company_master::exchange_or_default;
use crate::handler::error::{db_error, AppError};
use crate::repositories::stock_price;
use crate::services::ohlcv_service::{self, Interval};
use crate::utils::ticker::normalize_code;

/// 按区间聚合的 K 线及可选指标
pub async fn get_ohlcv(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<OhlcvQuery>,
) -> Result<Json<ApiResponse<Vec<OhlcvBar>>>, AppError> {
    let bad_request = |e: ohlcv_service::OhlcvError| AppError::BadRequest(e.to_string());

    let interval = match query.interval.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Interval::parse(raw).map_err(bad_request)?,
        None => Interval::default(),
    };
    let indicators = ohlcv_service::parse_indicators(query.indicators.as_deref()).map_err(bad_request)?;
    let (start, end) = ohlcv_service::resolve_range(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        query.fetch_all_data,
    )
    .map_err(bad_request)?;

    let code = normalize_code(&code);
    let exchange = exchange_or_default(query.exchange.as_deref());

    let mut conn = state.db_pool.get()?;
    let rows = stock_price::aggregate_ohlcv(&mut conn, &code, &exchange, interval.bucket_secs(), start, end)
        .map_err(db_error("Failed to aggregate ohlcv"))?;
    tracing::debug!(
        company = %code,
        interval = interval.as_str(),
        rows = rows.len(),
        "aggregated ohlcv"
    );

    Ok(Json(ApiResponse::ok(ohlcv_service::build_bars(rows, &indicators))))
}
