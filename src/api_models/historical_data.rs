use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TickDataQuery {
    pub symbol: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickPoint {
    pub symbol: String,
    pub ltp: BigDecimal,
    pub vol_traded_today: i64,
    pub last_traded_time: i64,
    pub bid_size: i64,
    pub ask_size: i64,
    pub bid_price: BigDecimal,
    pub ask_price: BigDecimal,
    pub low_price: BigDecimal,
    pub high_price: BigDecimal,
    pub open_price: BigDecimal,
    pub prev_close_price: BigDecimal,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickMetadata {
    pub total_lines: usize,
    pub returned_points: usize,
    pub filtered_points: usize,
    pub skipped_lines: usize,
    pub trading_start_timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct TickDataResponse {
    pub success: bool,
    pub data: Vec<TickPoint>,
    pub source: &'static str,
    pub metadata: TickMetadata,
}
