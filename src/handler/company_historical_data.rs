use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::api_models::company_historical_data::{
    HistoricalStatsQuery, HistoricalStatsResponse, UpsertHistoricalStatsRequest,
};
use crate::api_models::ApiResponse;
use crate::app::AppState;
use crate::handler::company_master::{checked_exchange, exchange_or_default, fits_column};
use crate::handler::error::{db_error, AppError};
use crate::models::{CompanyHistoricalData, NewCompanyHistoricalData};
use crate::repositories::company_historical_data;
use crate::utils::ticker::normalize_code;

impl From<CompanyHistoricalData> for HistoricalStatsResponse {
    fn from(d: CompanyHistoricalData) -> Self {
        Self {
            id: d.id,
            company_code: d.company_code,
            exchange: d.exchange,
            date: d.date,
            total_valid_days: d.total_valid_days,
            avg_daily_high_low_range: d.avg_daily_high_low_range,
            median_daily_volume: d.median_daily_volume,
            avg_trading_capital: d.avg_trading_capital,
            pe_ratio: d.pe_ratio,
            n1_pattern_count: d.n1_pattern_count,
        }
    }
}

/// 每日统计，按日期升序
pub async fn list_historical_stats(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<HistoricalStatsQuery>,
) -> Result<Json<ApiResponse<Vec<HistoricalStatsResponse>>>, AppError> {
    if let (Some(start), Some(end)) = (query.start, query.end) {
        if start > end {
            return Err(AppError::BadRequest("start must not be after end".to_string()));
        }
    }
    let code = normalize_code(&code);
    let exchange = exchange_or_default(query.exchange.as_deref());

    let mut conn = state.db_pool.get()?;
    let rows = company_historical_data::list_range(&mut conn, &code, &exchange, query.start, query.end)
        .map_err(db_error("Failed to list historical stats"))?;
    Ok(Json(ApiResponse::ok(rows.into_iter().map(Into::into).collect())))
}

/// 批处理任务写入：同一天重复写入覆盖旧值
pub async fn upsert_historical_stats(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<UpsertHistoricalStatsRequest>,
) -> Result<Json<ApiResponse<HistoricalStatsResponse>>, AppError> {
    let code = normalize_code(&code);
    if !fits_column(&code, 50) {
        return Err(AppError::BadRequest("Invalid company_code".to_string()));
    }
    let exchange = checked_exchange(payload.exchange.as_deref())?;

    let new_rec = NewCompanyHistoricalData {
        company_code: code,
        exchange,
        date: payload.date,
        total_valid_days: payload.total_valid_days,
        avg_daily_high_low_range: payload.avg_daily_high_low_range,
        median_daily_volume: payload.median_daily_volume,
        avg_trading_capital: payload.avg_trading_capital,
        pe_ratio: payload.pe_ratio,
        n1_pattern_count: payload.n1_pattern_count,
    };

    let mut conn = state.db_pool.get()?;
    let saved = company_historical_data::upsert(&mut conn, &new_rec)
        .map_err(db_error("Failed to upsert historical stats"))?;
    Ok(Json(ApiResponse::ok(saved.into())))
}
