use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;

use crate::api_models::company_master::ExchangeQuery;
use crate::api_models::watchlist::{
    AddWatchlistRequest, WatchlistCompaniesResponse, WatchlistDateQuery, WatchlistEntryResponse,
    WatchlistExistsResponse, WatchlistSummaryResponse,
};
use crate::api_models::ApiResponse;
use crate::app::AppState;
use crate::handler::company_master::{checked_exchange, exchange_or_default, fits_column};
use crate::handler::error::{db_error, AppError};
use crate::models::NewWatchlist;
use crate::repositories::{company_master, watchlist};
use crate::utils::ticker::normalize_code;
use crate::utils::time::{parse_date, today_ist};

const MAX_WATCHLIST_NAME_LEN: usize = 10;

fn validate_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if !fits_column(name, MAX_WATCHLIST_NAME_LEN) {
        return Err(AppError::BadRequest(format!(
            "Watchlist name must be 1-{} characters",
            MAX_WATCHLIST_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

/// 所有观察表名称及其日期（供单选框使用）
pub async fn list_watchlists(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<WatchlistSummaryResponse>>>, AppError> {
    let mut conn = state.db_pool.get()?;
    let pairs = watchlist::list_names_with_dates(&mut conn).map_err(db_error("Failed to list watchlists"))?;

    let mut summaries: Vec<WatchlistSummaryResponse> = Vec::new();
    for (name, date) in pairs {
        match summaries.last_mut() {
            Some(last) if last.watchlist_name == name => last.dates.push(date),
            _ => summaries.push(WatchlistSummaryResponse {
                watchlist_name: name,
                dates: vec![date],
            }),
        }
    }
    Ok(Json(ApiResponse::ok(summaries)))
}

/// 指定日期的观察表公司，附带公司名称
pub async fn get_watchlist(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<WatchlistDateQuery>,
) -> Result<Json<ApiResponse<WatchlistCompaniesResponse>>, AppError> {
    let name = validate_name(&name)?;
    let date = query.date.unwrap_or_else(today_ist);

    let mut conn = state.db_pool.get()?;
    let entries = watchlist::list_entries(&mut conn, &name, date).map_err(db_error("Failed to load watchlist"))?;

    let codes: Vec<String> = entries.iter().map(|e| e.company_code.clone()).collect();
    let companies = company_master::find_by_codes(&mut conn, &codes)
        .map_err(db_error("Failed to load watchlist companies"))?;
    let by_key: HashMap<(String, String), _> = companies
        .into_iter()
        .map(|c| ((c.company_code.clone(), c.exchange.clone()), c))
        .collect();

    let exists = !entries.is_empty();
    let companies = entries
        .into_iter()
        .map(|e| {
            let company = by_key.get(&(e.company_code.clone(), e.exchange.clone()));
            WatchlistEntryResponse {
                id: e.id,
                watchlist_name: e.watchlist_name,
                date: e.date,
                name: company.map(|c| c.name.clone()),
                marker: company.map(|c| c.marker.clone()),
                company_code: e.company_code,
                exchange: e.exchange,
            }
        })
        .collect();

    Ok(Json(ApiResponse::ok(WatchlistCompaniesResponse { companies, exists })))
}

pub async fn check_watchlist(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<WatchlistDateQuery>,
) -> Result<Json<ApiResponse<WatchlistExistsResponse>>, AppError> {
    let name = validate_name(&name)?;
    let date = query.date.unwrap_or_else(today_ist);

    let mut conn = state.db_pool.get()?;
    let exists = watchlist::exists(&mut conn, &name, date).map_err(db_error("Failed to check watchlist"))?;
    Ok(Json(ApiResponse::ok(WatchlistExistsResponse { exists })))
}

/// 添加公司到观察表，重复时返回 409
pub async fn add_to_watchlist(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<AddWatchlistRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WatchlistEntryResponse>>), AppError> {
    let name = validate_name(&name)?;
    let company_code = normalize_code(&payload.company_code);
    if !fits_column(&company_code, 50) {
        return Err(AppError::BadRequest("Invalid company_code".to_string()));
    }
    let exchange = checked_exchange(payload.exchange.as_deref())?;

    let new_item = NewWatchlist {
        watchlist_name: name,
        date: payload.date.unwrap_or_else(today_ist),
        company_code,
        exchange,
    };

    let mut conn = state.db_pool.get()?;
    let created = watchlist::create(&mut conn, &new_item).map_err(db_error("Failed to add to watchlist"))?;
    let company = company_master::find_by_code_and_exchange(&mut conn, &created.company_code, &created.exchange)
        .map_err(db_error("Failed to load company"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(WatchlistEntryResponse {
            id: created.id,
            watchlist_name: created.watchlist_name,
            date: created.date,
            company_code: created.company_code,
            exchange: created.exchange,
            name: company.as_ref().map(|c| c.name.clone()),
            marker: company.map(|c| c.marker),
        })),
    ))
}

/// 从观察表移除公司
pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path((name, date, code)): Path<(String, String, String)>,
    Query(query): Query<ExchangeQuery>,
) -> Result<StatusCode, AppError> {
    let name = validate_name(&name)?;
    let date: NaiveDate =
        parse_date(&date).ok_or_else(|| AppError::BadRequest(format!("Invalid date: {}", date)))?;
    let code = normalize_code(&code);
    let exchange = exchange_or_default(query.exchange.as_deref());

    let mut conn = state.db_pool.get()?;
    let affected = watchlist::delete_entry(&mut conn, &name, date, &code, &exchange)
        .map_err(db_error("Failed to remove from watchlist"))?;

    if affected == 0 {
        return Err(AppError::NotFound(format!("{} is not in watchlist {} on {}", code, name, date)));
    }
    Ok(StatusCode::NO_CONTENT)
}
