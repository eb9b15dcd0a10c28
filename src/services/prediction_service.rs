use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use chrono::Utc;
use serde_json::{json, Value};

use crate::api_models::prediction::{BatchPredictionResponse, PredictionSummary};
use crate::utils::bigdecimal_parser::{parse_bigdecimal, round_price};
use crate::utils::upstream::{UpstreamClient, UpstreamError};

/// 预测模型服务的代理，结果附加定点小数汇总
#[derive(Debug, Clone)]
pub struct PredictionService {
    upstream: UpstreamClient,
}

impl PredictionService {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    pub async fn company_predictions(
        &self,
        company: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Value, UpstreamError> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(start) = start {
            params.push(("start_time", start));
        }
        if let Some(end) = end {
            params.push(("end_time", end));
        }

        let mut body: Value = self.upstream.get_json(&["predictions", company], &params).await?;

        let count = body
            .get("predictions")
            .and_then(Value::as_object)
            .map(|p| p.len())
            .unwrap_or(0);
        if count == 0 {
            tracing::warn!(company, "prediction service returned no predictions");
        } else {
            tracing::info!(company, count, "fetched predictions");
        }

        if let Some(summary) = summarize(&body) {
            if let Some(obj) = body.as_object_mut() {
                obj.insert("summary".to_string(), json!(summary));
            }
        }
        Ok(body)
    }

    /// 上游不可用时返回 stopped 状态而不是错误
    pub async fn health(&self) -> Value {
        match self.upstream.get_json::<Value>(&["health"], &[]).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("prediction health check failed: {}", e);
                json!({
                    "status": "stopped",
                    "running": false,
                    "lastupdate": Utc::now().to_rfc3339(),
                    "activecompanies": [],
                    "totalcompanies": 0,
                    "companystatus": {},
                })
            }
        }
    }

    pub async fn companies(&self) -> Value {
        match self.upstream.get_json::<Value>(&["companies"], &[]).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("failed to fetch prediction companies: {}", e);
                json!({ "companies": [], "count": 0, "details": {} })
            }
        }
    }

    /// 逐个公司查询，单个失败记入 errors，不影响其余公司
    pub async fn batch(
        &self,
        companies: &[String],
        start: Option<&str>,
        end: Option<&str>,
    ) -> BatchPredictionResponse {
        let mut results = BTreeMap::new();
        let mut errors = BTreeMap::new();
        let mut fetched = 0;

        for company in companies {
            match self.company_predictions(company, start, end).await {
                Ok(body) => {
                    let has_data = body
                        .get("predictions")
                        .and_then(Value::as_object)
                        .is_some_and(|p| !p.is_empty());
                    if has_data {
                        fetched += 1;
                    }
                    results.insert(company.clone(), body);
                }
                Err(e) => {
                    tracing::warn!(company = %company, "batch prediction lookup failed: {}", e);
                    errors.insert(company.clone(), "Failed to fetch predictions".to_string());
                }
            }
        }

        tracing::info!("batch prediction fetch: {}/{} with data", fetched, companies.len());

        BatchPredictionResponse {
            results,
            starttime: start.map(str::to_string),
            endtime: end.map(str::to_string),
            companiesrequested: companies.len(),
            companiesfetched: fetched,
            errors: (!errors.is_empty()).then_some(errors),
        }
    }
}

/// 对 `predictions` 中每个时间点的 close 做汇总；按时间键排序，最后一个即最新价
pub fn summarize(body: &Value) -> Option<PredictionSummary> {
    let prices: Vec<BigDecimal> = body
        .get("predictions")?
        .as_object()?
        .values()
        .filter_map(|p| parse_bigdecimal(p.get("close")))
        .collect();

    let latest = prices.last()?.clone();
    let high = prices.iter().max()?.clone();
    let low = prices.iter().min()?.clone();
    let sum: BigDecimal = prices.iter().sum();
    let avg = sum / BigDecimal::from(prices.len() as u64);

    Some(PredictionSummary {
        avg_price: round_price(&avg),
        price_range: round_price(&(&high - &low)),
        high_price: round_price(&high),
        low_price: round_price(&low),
        latest_price: round_price(&latest),
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::time::Duration;

    use axum::extract::{Path, RawQuery};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};

    use super::*;
    use crate::test_support::{spawn_upstream, unreachable_base_url};
    use crate::utils::config::UpstreamConfig;

    fn service_for(base: &str) -> PredictionService {
        let cfg = UpstreamConfig::new(base, Duration::from_secs(2));
        PredictionService::new(UpstreamClient::new("prediction", &cfg).unwrap())
    }

    fn fake_prediction_api() -> Router {
        Router::new()
            .route(
                "/predictions/:company",
                get(|Path(company): Path<String>, RawQuery(q): RawQuery| async move {
                    match company.as_str() {
                        "TCS" => (
                            StatusCode::OK,
                            Json(json!({
                                "company": "TCS",
                                "query": q,
                                "count": 3,
                                "predictions": {
                                    "2025-01-15T09:15:00": {"close": 4010.10, "predictedat": "2025-01-15T09:10:00"},
                                    "2025-01-15T09:20:00": {"close": 4020.20, "predictedat": "2025-01-15T09:15:00"},
                                    "2025-01-15T09:25:00": {"close": 4005.05, "predictedat": "2025-01-15T09:20:00"}
                                }
                            })),
                        ),
                        "EMPTY" => (
                            StatusCode::OK,
                            Json(json!({"company": "EMPTY", "count": 0, "predictions": {}})),
                        ),
                        _ => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "model crashed"}))),
                    }
                }),
            )
            .route("/health", get(|| async { Json(json!({"status": "healthy", "running": true})) }))
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn summarizes_closes_in_decimal() {
        let body = json!({
            "predictions": {
                "2025-01-15T09:15:00": {"close": 0.1},
                "2025-01-15T09:20:00": {"close": 0.2},
                "2025-01-15T09:25:00": {"close": "0.3"}
            }
        });
        let summary = summarize(&body).unwrap();
        assert_eq!(summary.avg_price, dec("0.20"));
        assert_eq!(summary.high_price, dec("0.30"));
        assert_eq!(summary.low_price, dec("0.10"));
        assert_eq!(summary.price_range, dec("0.20"));
        assert_eq!(summary.latest_price, dec("0.30"));
    }

    #[test]
    fn no_summary_without_prices() {
        assert!(summarize(&json!({"predictions": {}})).is_none());
        assert!(summarize(&json!({"count": 0})).is_none());
    }

    #[tokio::test]
    async fn lookup_forwards_time_window_and_enriches() {
        let svc = service_for(&spawn_upstream(fake_prediction_api()).await);
        let body = svc
            .company_predictions("TCS", Some("2025-01-15T09:00:00"), Some("2025-01-15T10:00:00"))
            .await
            .unwrap();

        let query = body["query"].as_str().unwrap();
        assert!(query.contains("start_time=2025-01-15T09%3A00%3A00"));
        assert!(query.contains("end_time=2025-01-15T10%3A00%3A00"));
        assert_eq!(body["summary"]["latestPrice"], json!("4005.05"));
        assert_eq!(body["summary"]["highPrice"], json!("4020.20"));
    }

    #[tokio::test]
    async fn upstream_failure_is_an_error() {
        let svc = service_for(&spawn_upstream(fake_prediction_api()).await);
        let err = svc.company_predictions("BROKEN", None, None).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status { .. }));
    }

    #[tokio::test]
    async fn health_degrades_when_unreachable() {
        let svc = service_for(&unreachable_base_url().await);
        let health = svc.health().await;
        assert_eq!(health["status"], "stopped");
        assert_eq!(health["running"], false);

        let companies = svc.companies().await;
        assert_eq!(companies["count"], 0);
    }

    #[tokio::test]
    async fn batch_collects_errors_per_company() {
        let svc = service_for(&spawn_upstream(fake_prediction_api()).await);
        let companies = vec!["TCS".to_string(), "EMPTY".to_string(), "BROKEN".to_string()];
        let batch = svc.batch(&companies, None, None).await;

        assert_eq!(batch.companiesrequested, 3);
        assert_eq!(batch.companiesfetched, 1);
        assert!(batch.results.contains_key("EMPTY"));
        assert!(batch.errors.unwrap().contains_key("BROKEN"));
    }
}
