use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct PredictionLookupQuery {
    pub symbol: Option<String>,
    pub starttime: Option<String>,
    pub endtime: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PredictionRangeQuery {
    #[serde(alias = "start")]
    pub starttime: Option<String>,
    #[serde(alias = "end")]
    pub endtime: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePredictionRequest {
    pub company: String,
    pub timestamp: String,
    pub close: BigDecimal,
    pub predictedat: String,
    pub exchange: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct PredictionRecordResponse {
    pub id: Uuid,
    pub company: String,
    pub timestamp: NaiveDateTime,
    pub close: BigDecimal,
    pub predictedat: NaiveDateTime,
    #[serde(rename = "createdAt")]
    pub created_at: NaiveDateTime,
    pub metadata: Option<Value>,
    pub exchange: String,
}

/// 预测价格汇总，全部按定点小数计算
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionSummary {
    pub avg_price: BigDecimal,
    pub high_price: BigDecimal,
    pub low_price: BigDecimal,
    pub price_range: BigDecimal,
    pub latest_price: BigDecimal,
}

#[derive(Debug, Serialize)]
pub struct BatchPredictionResponse {
    pub results: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starttime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endtime: Option<String>,
    pub companiesrequested: usize,
    pub companiesfetched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}
