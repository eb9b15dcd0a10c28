use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub company_code: String,
    pub name: String,
    /// 默认 NSE
    pub exchange: Option<String>,
    /// 默认 EQ
    pub marker: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeQuery {
    pub exchange: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    pub company_id: i32,
    pub company_code: String,
    pub name: String,
    pub exchange: String,
    pub marker: String,
}

#[derive(Debug, Serialize)]
pub struct TopCompanyResponse {
    #[serde(rename = "companyCode")]
    pub company_code: String,
    #[serde(rename = "averageClose")]
    pub average_close: BigDecimal,
}
