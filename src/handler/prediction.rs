use axum::{
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
    Json,
};
use bigdecimal::BigDecimal;
use serde_json::Value;
use uuid::Uuid;

use crate::api_models::prediction::{
    BatchPredictionResponse, CreatePredictionRequest, PredictionLookupQuery, PredictionRangeQuery,
    PredictionRecordResponse,
};
use crate::api_models::ApiResponse;
use crate::app::AppState;
use crate::handler::company_master::fits_column;
use crate::handler::error::{db_error, AppError};
use crate::models::{NewPrediction, Prediction};
use crate::repositories::prediction;
use crate::utils::bigdecimal_parser::round_price;
use crate::utils::ticker::is_valid_symbol;
use crate::utils::time::parse_timestamp;

const MAX_COMPANY_LEN: usize = 50;
const MAX_EXCHANGE_LEN: usize = 20;

impl From<Prediction> for PredictionRecordResponse {
    fn from(p: Prediction) -> Self {
        Self {
            id: p.id,
            company: p.company,
            timestamp: p.target_time,
            close: p.close,
            predictedat: p.predicted_at,
            created_at: p.created_at,
            metadata: p.metadata,
            exchange: p.exchange,
        }
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

fn checked_symbol(symbol: &str) -> Result<&str, AppError> {
    if is_valid_symbol(symbol) {
        Ok(symbol)
    } else {
        Err(AppError::BadRequest(format!("Invalid symbol: {}", symbol)))
    }
}

/// 按 symbol 查询预测（代理到预测服务）
pub async fn lookup_predictions(
    State(state): State<AppState>,
    Query(query): Query<PredictionLookupQuery>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let symbol = non_blank(query.symbol.as_deref())
        .ok_or_else(|| AppError::BadRequest("Symbol parameter is required".to_string()))?;
    let symbol = checked_symbol(symbol)?;

    let data = state
        .predictions
        .company_predictions(
            symbol,
            non_blank(query.starttime.as_deref()),
            non_blank(query.endtime.as_deref()),
        )
        .await
        .map_err(|e| AppError::upstream("Failed to fetch predictions", &e))?;
    Ok(Json(ApiResponse::ok(data)))
}

/// 路径中的公司代码查询预测
pub async fn company_predictions(
    State(state): State<AppState>,
    Path(company): Path<String>,
    Query(query): Query<PredictionRangeQuery>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let company = checked_symbol(company.trim())?;
    let data = state
        .predictions
        .company_predictions(
            company,
            non_blank(query.starttime.as_deref()),
            non_blank(query.endtime.as_deref()),
        )
        .await
        .map_err(|e| AppError::upstream("Failed to fetch predictions", &e))?;
    Ok(Json(ApiResponse::ok(data)))
}

pub async fn prediction_health(State(state): State<AppState>) -> Json<ApiResponse<Value>> {
    Json(ApiResponse::ok(state.predictions.health().await))
}

pub async fn prediction_companies(State(state): State<AppState>) -> Json<ApiResponse<Value>> {
    Json(ApiResponse::ok(state.predictions.companies().await))
}

/// 批量查询：`companies` 可重复出现，也可逗号分隔
pub async fn batch_predictions(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<ApiResponse<BatchPredictionResponse>>, AppError> {
    let raw = raw.unwrap_or_default();
    let url = reqwest::Url::parse(&format!("http://localhost/?{}", raw))
        .map_err(|_| AppError::BadRequest("Invalid query string".to_string()))?;

    let mut companies: Vec<String> = Vec::new();
    let mut start = None;
    let mut end = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "companies" | "companies[]" => {
                for c in value.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                    if !companies.iter().any(|x| x == c) {
                        companies.push(c.to_string());
                    }
                }
            }
            "starttime" => start = Some(value.trim().to_string()).filter(|s| !s.is_empty()),
            "endtime" => end = Some(value.trim().to_string()).filter(|s| !s.is_empty()),
            _ => {}
        }
    }

    if companies.is_empty() {
        return Err(AppError::BadRequest("At least one company is required".to_string()));
    }
    for company in &companies {
        checked_symbol(company)?;
    }

    let batch = state
        .predictions
        .batch(&companies, start.as_deref(), end.as_deref())
        .await;
    Ok(Json(ApiResponse::ok(batch)))
}

/// 保存一条预测记录，(company, timestamp) 重复时返回 409
pub async fn create_prediction(
    State(state): State<AppState>,
    Json(payload): Json<CreatePredictionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PredictionRecordResponse>>), AppError> {
    let company = payload.company.trim().to_uppercase();
    if !fits_column(&company, MAX_COMPANY_LEN) {
        return Err(AppError::BadRequest("Invalid company".to_string()));
    }
    let exchange = payload
        .exchange
        .as_deref()
        .map(|e| e.trim().to_uppercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "NSE".to_string());
    if !fits_column(&exchange, MAX_EXCHANGE_LEN) {
        return Err(AppError::BadRequest("Invalid exchange".to_string()));
    }
    let target_time = parse_timestamp(&payload.timestamp)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid timestamp: {}", payload.timestamp)))?;
    let predicted_at = parse_timestamp(&payload.predictedat)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid predictedat: {}", payload.predictedat)))?;
    if payload.close < BigDecimal::from(0) {
        return Err(AppError::BadRequest("close must not be negative".to_string()));
    }

    let new_rec = NewPrediction {
        id: Uuid::new_v4(),
        company,
        target_time,
        close: round_price(&payload.close),
        predicted_at,
        metadata: payload.metadata,
        exchange,
    };

    let mut conn = state.db_pool.get()?;
    let created = prediction::create(&mut conn, &new_rec).map_err(db_error("Failed to save prediction"))?;
    tracing::info!("Saved prediction {} at {}", created.company, created.target_time);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created.into()))))
}

/// 已保存的预测，按时间升序
pub async fn prediction_history(
    State(state): State<AppState>,
    Path(company): Path<String>,
    Query(query): Query<PredictionRangeQuery>,
) -> Result<Json<ApiResponse<Vec<PredictionRecordResponse>>>, AppError> {
    let parse = |raw: Option<&str>| {
        non_blank(raw)
            .map(|s| parse_timestamp(s).ok_or_else(|| AppError::BadRequest(format!("Invalid time: {}", s))))
            .transpose()
    };
    let start = parse(query.starttime.as_deref())?;
    let end = parse(query.endtime.as_deref())?;

    let mut conn = state.db_pool.get()?;
    let rows = prediction::list_range(&mut conn, &company.trim().to_uppercase(), start, end)
        .map_err(db_error("Failed to list predictions"))?;
    Ok(Json(ApiResponse::ok(rows.into_iter().map(Into::into).collect())))
}

pub async fn prediction_at(
    State(state): State<AppState>,
    Path((company, timestamp)): Path<(String, String)>,
) -> Result<Json<ApiResponse<PredictionRecordResponse>>, AppError> {
    let at = parse_timestamp(&timestamp)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid timestamp: {}", timestamp)))?;
    let company = company.trim().to_uppercase();

    let mut conn = state.db_pool.get()?;
    let found = prediction::find_by_company_and_time(&mut conn, &company, at).map_err(|e| match e {
        diesel::result::Error::NotFound => {
            AppError::NotFound(format!("No prediction found for {} at {}", company, timestamp))
        }
        other => db_error("Failed to load prediction")(other),
    })?;
    Ok(Json(ApiResponse::ok(found.into())))
}
