use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use diesel::prelude::*;

use crate::schema::company_historical_data;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = company_historical_data)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CompanyHistoricalData {
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

/// 写入与 upsert 共用，upsert 时按 (company_code, exchange, date) 覆盖统计列
#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = company_historical_data)]
#[diesel(treat_none_as_null = true)]
pub struct NewCompanyHistoricalData {
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
