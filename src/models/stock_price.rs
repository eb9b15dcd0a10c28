use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::schema::stock_prices;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = stock_prices)]
pub struct NewStockPrice {
    pub company_code: String,
    pub exchange: String,
    pub ts: NaiveDateTime,
    pub open: BigDecimal,
    pub high: BigDecimal,
    pub low: BigDecimal,
    pub close: BigDecimal,
    pub volume: i64,
}
