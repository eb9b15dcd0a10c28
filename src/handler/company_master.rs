use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::api_models::company_master::{
    CompanyResponse, CreateCompanyRequest, ExchangeQuery, TopCompanyResponse,
};
use crate::api_models::ApiResponse;
use crate::app::AppState;
use crate::handler::error::{db_error, AppError};
use crate::models::{CompanyMaster, NewCompanyMaster};
use crate::repositories::{company_master, stock_price};
use crate::utils::ticker::normalize_code;

const TOP_COMPANIES: i64 = 5;

impl From<CompanyMaster> for CompanyResponse {
    fn from(c: CompanyMaster) -> Self {
        Self {
            company_id: c.company_id,
            company_code: c.company_code,
            name: c.name,
            exchange: c.exchange,
            marker: c.marker,
        }
    }
}

pub(crate) fn exchange_or_default(raw: Option<&str>) -> String {
    raw.map(normalize_code)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "NSE".to_string())
}

const MAX_EXCHANGE_LEN: usize = 10;

/// 非空且字符数不超过 VARCHAR(max)
pub(crate) fn fits_column(value: &str, max: usize) -> bool {
    !value.is_empty() && value.chars().count() <= max
}

/// 缺省为 NSE，超过列宽返回 400
pub(crate) fn checked_exchange(raw: Option<&str>) -> Result<String, AppError> {
    let exchange = exchange_or_default(raw);
    if !fits_column(&exchange, MAX_EXCHANGE_LEN) {
        return Err(AppError::BadRequest(format!(
            "exchange is limited to {} characters",
            MAX_EXCHANGE_LEN
        )));
    }
    Ok(exchange)
}

/// 公司列表，可按交易所过滤
pub async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<ExchangeQuery>,
) -> Result<Json<ApiResponse<Vec<CompanyResponse>>>, AppError> {
    let mut conn = state.db_pool.get()?;
    let exchange = query.exchange.as_deref().map(normalize_code).filter(|e| !e.is_empty());
    let items = company_master::list(&mut conn, exchange.as_deref())
        .map_err(db_error("Failed to list companies"))?;
    Ok(Json(ApiResponse::ok(items.into_iter().map(Into::into).collect())))
}

pub async fn create_company(
    State(state): State<AppState>,
    Json(payload): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CompanyResponse>>), AppError> {
    let company_code = normalize_code(&payload.company_code);
    let name = payload.name.trim().to_string();
    let exchange = exchange_or_default(payload.exchange.as_deref());
    let marker = payload
        .marker
        .as_deref()
        .map(normalize_code)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "EQ".to_string());

    if !fits_column(&company_code, 50) {
        return Err(AppError::BadRequest("Invalid company_code".to_string()));
    }
    if !fits_column(&name, 255) {
        return Err(AppError::BadRequest("Invalid name".to_string()));
    }
    if !fits_column(&exchange, MAX_EXCHANGE_LEN) || !fits_column(&marker, 10) {
        return Err(AppError::BadRequest("exchange and marker are limited to 10 characters".to_string()));
    }

    let new_rec = NewCompanyMaster {
        company_code,
        name,
        exchange,
        marker,
    };
    let mut conn = state.db_pool.get()?;
    let created = company_master::create(&mut conn, &new_rec).map_err(db_error("Failed to create company"))?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created.into()))))
}

/// 先按交易所精确匹配，找不到再按代码匹配
pub async fn get_company(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<ExchangeQuery>,
) -> Result<Json<ApiResponse<CompanyResponse>>, AppError> {
    let code = normalize_code(&code);
    let exchange = query.exchange.as_deref().map(normalize_code).filter(|e| !e.is_empty());

    let mut conn = state.db_pool.get()?;
    let found = company_master::lookup(&mut conn, &code, exchange.as_deref())
        .map_err(db_error("Failed to load company"))?
        .ok_or_else(|| AppError::NotFound(format!("Company {} not found", code)))?;
    Ok(Json(ApiResponse::ok(found.into())))
}

/// 平均收盘价最高的五家公司
pub async fn top_companies(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TopCompanyResponse>>>, AppError> {
    let mut conn = state.db_pool.get()?;
    let rows = stock_price::top_by_average_close(&mut conn, TOP_COMPANIES)
        .map_err(db_error("Failed to load top companies"))?;
    let data = rows
        .into_iter()
        .map(|r| TopCompanyResponse {
            company_code: r.company_code,
            average_close: r.average_close,
        })
        .collect();
    Ok(Json(ApiResponse::ok(data)))
}
