pub mod company_historical_data;
pub mod company_master;
pub mod historical_data;
pub mod market_data;
pub mod ohlcv;
pub mod prediction;
pub mod sentiment;
pub mod watchlist;

use serde::Serialize;

/// 统一响应包装 `{ success, data?, error? }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}
