use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct HistoricalStatsQuery {
    pub exchange: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// 外部批处理任务写入的每日统计
#[derive(Debug, Deserialize)]
pub struct UpsertHistoricalStatsRequest {
    pub exchange: Option<String>,
    pub date: NaiveDate,
    pub total_valid_days: Option<i32>,
    pub avg_daily_high_low_range: Option<BigDecimal>,
    pub median_daily_volume: Option<i64>,
    pub avg_trading_capital: Option<BigDecimal>,
    pub pe_ratio: Option<BigDecimal>,
    pub n1_pattern_count: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct HistoricalStatsResponse {
    pub id: i32,
    pub company_code: String,
    pub exchange: String,
    pub date: NaiveDate,
    pub total_valid_days: Option<i32>,
    pub avg_daily_high_low_range: Option<BigDecimal>,
    pub median_daily_volume: Option<i64>,
    pub avg_trading_capital: Option<BigDecimal>,
    pub pe_ratio: Option<BigDecimal>,
    pub n1_pattern_count: Option<i32>,
}
