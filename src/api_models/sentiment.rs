use serde::Serialize;

use crate::services::sentiment_service::Sentiment;

#[derive(Debug, Serialize)]
pub struct SentimentLookupResponse {
    pub ticker: String,
    pub symbol: String,
    pub sentiment: Sentiment,
}
