use diesel::prelude::*;

use super::PgPoolConn;
use crate::models::{CompanyMaster, NewCompanyMaster};
use crate::schema::company_master::dsl::*;

pub fn create(conn: &mut PgPoolConn, new_rec: &NewCompanyMaster) -> Result<CompanyMaster, diesel::result::Error> {
    diesel::insert_into(company_master)
        .values(new_rec)
        .returning(CompanyMaster::as_returning())
        .get_result(conn)
}

pub fn list(conn: &mut PgPoolConn, exchange_filter: Option<&str>) -> Result<Vec<CompanyMaster>, diesel::result::Error> {
    let mut query = company_master.select(CompanyMaster::as_select()).into_boxed();
    if let Some(ex) = exchange_filter {
        query = query.filter(exchange.eq(ex.to_string()));
    }
    query.order((exchange.asc(), company_code.asc())).load(conn)
}

pub fn find_by_code_and_exchange(
    conn: &mut PgPoolConn,
    code: &str,
    ex: &str,
) -> Result<Option<CompanyMaster>, diesel::result::Error> {
    company_master
        .filter(company_code.eq(code))
        .filter(exchange.eq(ex))
        .select(CompanyMaster::as_select())
        .first(conn)
        .optional()
}

/// 先按 (code, exchange) 精确匹配，未命中或未指定交易所时退回到仅按 code 匹配
pub fn lookup(
    conn: &mut PgPoolConn,
    code: &str,
    ex: Option<&str>,
) -> Result<Option<CompanyMaster>, diesel::result::Error> {
    if let Some(ex) = ex {
        if let Some(found) = find_by_code_and_exchange(conn, code, ex)? {
            return Ok(Some(found));
        }
    }

    company_master
        .filter(company_code.eq(code))
        .order(company_id.asc())
        .select(CompanyMaster::as_select())
        .first(conn)
        .optional()
}

pub fn find_by_codes(conn: &mut PgPoolConn, codes: &[String]) -> Result<Vec<CompanyMaster>, diesel::result::Error> {
    if codes.is_empty() {
        return Ok(Vec::new());
    }
    company_master
        .filter(company_code.eq_any(codes))
        .select(CompanyMaster::as_select())
        .load(conn)
}
