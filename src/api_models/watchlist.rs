use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct WatchlistDateQuery {
    /// 缺省为交易所当天 (IST)
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AddWatchlistRequest {
    pub company_code: String,
    pub exchange: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct WatchlistEntryResponse {
    pub id: i32,
    pub watchlist_name: String,
    pub date: NaiveDate,
    pub company_code: String,
    pub exchange: String,
    pub name: Option<String>,
    pub marker: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WatchlistCompaniesResponse {
    pub companies: Vec<WatchlistEntryResponse>,
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct WatchlistExistsResponse {
    pub exists: bool,
}

/// 单选框使用的观察表名称及其可选日期（倒序）
#[derive(Debug, Serialize)]
pub struct WatchlistSummaryResponse {
    pub watchlist_name: String,
    pub dates: Vec<NaiveDate>,
}
