use chrono::NaiveDate;
use diesel::prelude::*;

use super::PgPoolConn;
use crate::models::{CompanyHistoricalData, NewCompanyHistoricalData};
use crate::schema::company_historical_data::dsl::*;

/// 同一 (company_code, exchange, date) 只保留一行，重复写入覆盖统计列
pub fn upsert(
    conn: &mut PgPoolConn,
    new_rec: &NewCompanyHistoricalData,
) -> Result<CompanyHistoricalData, diesel::result::Error> {
    diesel::insert_into(company_historical_data)
        .values(new_rec)
        .on_conflict((company_code, exchange, date))
        .do_update()
        .set(new_rec)
        .returning(CompanyHistoricalData::as_returning())
        .get_result(conn)
}

pub fn list_range(
    conn: &mut PgPoolConn,
    code: &str,
    ex: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<CompanyHistoricalData>, diesel::result::Error> {
    let mut query = company_historical_data
        .filter(company_code.eq(code.to_string()))
        .filter(exchange.eq(ex.to_string()))
        .select(CompanyHistoricalData::as_select())
        .into_boxed();
    if let Some(start) = start {
        query = query.filter(date.ge(start));
    }
    if let Some(end) = end {
        query = query.filter(date.le(end));
    }
    query.order(date.asc()).load(conn)
}
