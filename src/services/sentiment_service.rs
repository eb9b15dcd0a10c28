use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::ticker::{extract_symbol, is_valid_symbol};
use crate::utils::upstream::UpstreamClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// 不区分大小写；未知标签返回 None
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "POSITIVE" => Some(Sentiment::Positive),
            "NEGATIVE" => Some(Sentiment::Negative),
            "NEUTRAL" => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct PremarketPrediction {
    sentiment: Option<String>,
}

/// 盘前情绪查询，任何失败都退化为 NEUTRAL
#[derive(Debug, Clone)]
pub struct SentimentClient {
    upstream: UpstreamClient,
}

impl SentimentClient {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    pub async fn fetch_sentiment(&self, ticker: &str) -> Sentiment {
        let symbol = extract_symbol(ticker);
        if !is_valid_symbol(&symbol) {
            tracing::warn!(ticker, "rejected sentiment ticker");
            return Sentiment::Neutral;
        }

        let path = ["api", "premarket", "predictions", symbol.as_str()];
        match self.upstream.get_json::<PremarketPrediction>(&path, &[]).await {
            Ok(body) => match body.sentiment.as_deref().and_then(Sentiment::from_label) {
                Some(sentiment) => sentiment,
                None => {
                    tracing::warn!(
                        symbol = %symbol,
                        "sentiment response carried no usable label: {:?}",
                        body.sentiment
                    );
                    Sentiment::Neutral
                }
            },
            Err(e) => {
                tracing::warn!(symbol = %symbol, "sentiment lookup failed: {}", e);
                Sentiment::Neutral
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::test_support::{spawn_upstream, unreachable_base_url};
    use crate::utils::config::UpstreamConfig;

    fn client_for(base: &str) -> SentimentClient {
        let cfg = UpstreamConfig::new(base, Duration::from_secs(2));
        SentimentClient::new(UpstreamClient::new("sentiment", &cfg).unwrap())
    }

    fn premarket_app() -> Router {
        Router::new()
            .route(
                "/api/premarket/admin",
                get(|| async { Json(json!({"sentiment": "POSITIVE"})) }),
            )
            .route(
                "/api/premarket/predictions/:symbol",
                get(|Path(symbol): Path<String>| async move {
                    match symbol.as_str() {
                        "NETWEB" => (StatusCode::OK, Json(json!({"sentiment": "positive", "confidence": "0.81"}))),
                        "TCS" => (StatusCode::OK, Json(json!({"sentiment": "Negative"}))),
                        "ODD" => (StatusCode::OK, Json(json!({"sentiment": "bullish"}))),
                        "EMPTY" => (StatusCode::OK, Json(json!({"method": "none"}))),
                        _ => (StatusCode::NOT_FOUND, Json(json!({"detail": "not found"}))),
                    }
                }),
            )
    }

    #[test]
    fn labels_are_case_insensitive() {
        assert_eq!(Sentiment::from_label(" positive "), Some(Sentiment::Positive));
        assert_eq!(Sentiment::from_label("NEUTRAL"), Some(Sentiment::Neutral));
        assert_eq!(Sentiment::from_label("mixed"), None);
        assert_eq!(serde_json::to_value(Sentiment::Negative).unwrap(), json!("NEGATIVE"));
    }

    #[tokio::test]
    async fn compound_ticker_is_reduced_to_symbol() {
        let client = client_for(&spawn_upstream(premarket_app()).await);
        assert_eq!(client.fetch_sentiment("NSE:NETWEB-EQ").await, Sentiment::Positive);
        assert_eq!(client.fetch_sentiment("TCS").await, Sentiment::Negative);
    }

    #[tokio::test]
    async fn unusable_answers_fall_back_to_neutral() {
        let client = client_for(&spawn_upstream(premarket_app()).await);
        assert_eq!(client.fetch_sentiment("NSE:ODD-EQ").await, Sentiment::Neutral);
        assert_eq!(client.fetch_sentiment("EMPTY").await, Sentiment::Neutral);
        assert_eq!(client.fetch_sentiment("NSE:MISSING-EQ").await, Sentiment::Neutral);
        assert_eq!(client.fetch_sentiment("   ").await, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn ticker_cannot_reach_other_paths() {
        let client = client_for(&spawn_upstream(premarket_app()).await);
        assert_eq!(client.fetch_sentiment("../admin").await, Sentiment::Neutral);
        assert_eq!(client.fetch_sentiment("NSE:..%2Fadmin-EQ").await, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn unreachable_service_is_neutral() {
        let client = client_for(&unreachable_base_url().await);
        assert_eq!(client.fetch_sentiment("NSE:NETWEB-EQ").await, Sentiment::Neutral);
    }
}
