use axum::{
    extract::{Path, State},
    Json,
};

use crate::api_models::sentiment::SentimentLookupResponse;
use crate::app::AppState;
use crate::utils::ticker::extract_symbol;

/// 盘前情绪，失败时为 NEUTRAL，始终 200
pub async fn get_sentiment(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Json<SentimentLookupResponse> {
    let sentiment = state.sentiment.fetch_sentiment(&ticker).await;
    Json(SentimentLookupResponse {
        symbol: extract_symbol(&ticker),
        ticker,
        sentiment,
    })
}
