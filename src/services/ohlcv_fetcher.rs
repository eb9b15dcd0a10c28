use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::api_models::ohlcv::OhlcvBar;
use crate::utils::upstream::{UpstreamClient, UpstreamError};

/// 一次 K 线请求的全部输入；任一字段变化都会触发重新请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchParams {
    pub company_code: Option<String>,
    pub exchange: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub interval: String,
    pub indicators: Vec<String>,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            company_code: None,
            exchange: "NSE".to_string(),
            start: None,
            end: None,
            interval: "1m".to_string(),
            indicators: Vec::new(),
        }
    }
}

impl FetchParams {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("exchange", self.exchange.clone()),
            ("interval", self.interval.clone()),
        ];
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => {
                query.push(("startDate", start.clone()));
                query.push(("endDate", end.clone()));
            }
            _ => query.push(("fetchAllData", "true".to_string())),
        }
        if !self.indicators.is_empty() {
            query.push(("indicators", self.indicators.join(",")));
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Success(Vec<OhlcvBar>),
    Error { message: String },
}

impl FetchState {
    /// 非 Success 状态下数据为空
    pub fn data(&self) -> &[OhlcvBar] {
        match self {
            FetchState::Success(rows) => rows,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    data: Option<Vec<OhlcvBar>>,
    error: Option<String>,
}

/// K 线数据拉取器，状态通过 watch 通道发布。
///
/// 每次请求记录发起时的代数，`select_company`/`set_params` 会推进代数，
/// 返回时代数已变化的响应直接丢弃。
#[derive(Debug, Clone)]
pub struct OhlcvFetcher {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    backend: UpstreamClient,
    params: Mutex<FetchParams>,
    generation: AtomicU64,
    state: watch::Sender<FetchState>,
}

impl OhlcvFetcher {
    pub fn new(backend: UpstreamClient, params: FetchParams) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self {
            inner: Arc::new(Inner {
                backend,
                params: Mutex::new(params),
                generation: AtomicU64::new(0),
                state,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> FetchState {
        self.inner.state.borrow().clone()
    }

    pub fn params(&self) -> FetchParams {
        self.lock_params().clone()
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// 切换股票：立即回到 Idle 并清空数据，进行中的请求作废
    pub fn select_company(&self, company_code: impl Into<String>) {
        let mut params = self.lock_params();
        params.company_code = Some(company_code.into());
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_replace(FetchState::Idle);
    }

    /// 参数有变化时重新请求；无变化返回 None
    pub async fn set_params(&self, next: FetchParams) -> Option<FetchState> {
        {
            let mut params = self.lock_params();
            if *params == next {
                return None;
            }
            *params = next;
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
        }
        self.fetch().await
    }

    /// 发起一次请求；未选择股票或结果已过期时返回 None
    pub async fn fetch(&self) -> Option<FetchState> {
        let (generation, params) = {
            let params = self.lock_params();
            (self.inner.generation.load(Ordering::SeqCst), params.clone())
        };
        let company_code = params.company_code.clone()?;

        if !self.publish_if_current(generation, FetchState::Loading) {
            return None;
        }

        let path = ["api", "companies", company_code.as_str(), "ohlcv"];
        let query = params.query();
        let query: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let result = self.inner.backend.get_json::<Envelope>(&path, &query).await;

        let next = match result {
            Ok(Envelope { success: true, data, .. }) => FetchState::Success(data.unwrap_or_default()),
            Ok(Envelope { error, .. }) => FetchState::Error {
                message: error.unwrap_or_else(|| "Request failed".to_string()),
            },
            Err(e) => FetchState::Error {
                message: error_message(&e),
            },
        };

        if !self.publish_if_current(generation, next.clone()) {
            tracing::debug!(company = %company_code, "discarding stale ohlcv response");
            return None;
        }
        if let FetchState::Error { message } = &next {
            tracing::warn!(company = %company_code, "ohlcv fetch failed: {}", message);
        }
        Some(next)
    }

    /// 持有参数锁比较代数，代数未变才发布
    fn publish_if_current(&self, generation: u64, state: FetchState) -> bool {
        let _params = self.lock_params();
        if self.inner.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        self.inner.state.send_replace(state);
        true
    }

    fn lock_params(&self) -> MutexGuard<'_, FetchParams> {
        self.inner.params.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 优先使用后端信封里的 error 字段
fn error_message(err: &UpstreamError) -> String {
    if let UpstreamError::Status { status, body, .. } = err {
        let from_body = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string));
        return from_body.unwrap_or_else(|| format!("Request failed with status {}", status));
    }
    err.to_string()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::extract::{Path, RawQuery};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::test_support::spawn_upstream;
    use crate::utils::config::UpstreamConfig;

    fn fake_backend() -> Router {
        Router::new().route(
            "/api/companies/:code/ohlcv",
            get(|Path(code): Path<String>, RawQuery(q): RawQuery| async move {
                let q = q.unwrap_or_default();
                if code == "SLOW" {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                }
                if code == "BAD" {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"success": false, "error": "Unsupported interval: 2h"})),
                    );
                }
                let close = if q.contains("sma_2") { "101.00" } else { "100.00" };
                (
                    StatusCode::OK,
                    Json(json!({
                        "success": true,
                        "data": [{
                            "interval_start": "2025-01-15T09:15:00",
                            "open": "100.00",
                            "high": "102.00",
                            "low": "99.50",
                            "close": close,
                            "volume": 1200,
                            "sma_2": null,
                            "code": null
                        }]
                    })),
                )
            }),
        )
    }

    async fn fetcher() -> OhlcvFetcher {
        let base = spawn_upstream(fake_backend()).await;
        let cfg = UpstreamConfig::new(base, Duration::from_secs(2));
        OhlcvFetcher::new(UpstreamClient::new("backend", &cfg).unwrap(), FetchParams::default())
    }

    fn params_for(code: &str) -> FetchParams {
        FetchParams {
            company_code: Some(code.to_string()),
            start: Some("2025-01-15".to_string()),
            end: Some("2025-01-15".to_string()),
            ..FetchParams::default()
        }
    }

    #[tokio::test]
    async fn fetch_without_company_stays_idle() {
        let f = fetcher().await;
        assert_eq!(f.fetch().await, None);
        assert_eq!(f.state(), FetchState::Idle);
    }

    #[tokio::test]
    async fn successful_fetch_publishes_rows() {
        let f = fetcher().await;
        let mut rx = f.subscribe();

        let state = f.set_params(params_for("TCS")).await.unwrap();
        assert_eq!(state.data().len(), 1);
        assert_eq!(state.data()[0].volume, 1200);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), state);
    }

    #[tokio::test]
    async fn unchanged_params_do_not_refetch() {
        let f = fetcher().await;
        assert!(f.set_params(params_for("TCS")).await.is_some());
        let generation = f.generation();
        assert!(f.set_params(params_for("TCS")).await.is_none());
        assert_eq!(f.generation(), generation);

        let mut with_indicator = params_for("TCS");
        with_indicator.indicators = vec!["sma_2".to_string()];
        let state = f.set_params(with_indicator).await.unwrap();
        assert_eq!(state.data()[0].close.to_string(), "101.00");
    }

    #[tokio::test]
    async fn error_response_clears_data() {
        let f = fetcher().await;
        let state = f.set_params(params_for("BAD")).await.unwrap();
        assert_eq!(
            state,
            FetchState::Error {
                message: "Unsupported interval: 2h".to_string()
            }
        );
        assert!(state.data().is_empty());
    }

    #[tokio::test]
    async fn loading_is_not_published_after_subject_changed() {
        let f = fetcher().await;
        f.select_company("SLOW");
        let captured = f.generation();

        f.select_company("TCS");
        assert!(!f.publish_if_current(captured, FetchState::Loading));
        assert_eq!(f.state(), FetchState::Idle);

        assert!(f.publish_if_current(f.generation(), FetchState::Loading));
        assert!(f.state().is_loading());
    }

    #[tokio::test]
    async fn switching_company_discards_in_flight_response() {
        let f = fetcher().await;
        f.select_company("SLOW");

        let in_flight = {
            let f = f.clone();
            tokio::spawn(async move { f.fetch().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(f.state().is_loading());

        f.select_company("TCS");
        assert_eq!(f.state(), FetchState::Idle);

        assert_eq!(in_flight.await.unwrap(), None);
        assert_eq!(f.state(), FetchState::Idle);

        let state = f.fetch().await.unwrap();
        assert_eq!(state.data().len(), 1);
    }
}
