use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct OhlcvQuery {
    pub exchange: Option<String>,
    pub interval: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    /// 逗号分隔，例如 `sma_20,ema_9,rsi_14`
    pub indicators: Option<String>,
    #[serde(rename = "fetchAllData", default)]
    pub fetch_all_data: bool,
}

/// 一个聚合区间的 K 线，指标列在窗口未满时为 null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub interval_start: NaiveDateTime,
    pub open: BigDecimal,
    pub high: BigDecimal,
    pub low: BigDecimal,
    pub close: BigDecimal,
    pub volume: i64,
    #[serde(flatten, default)]
    pub indicators: BTreeMap<String, Option<f64>>,
}
