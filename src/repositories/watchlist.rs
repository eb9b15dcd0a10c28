use chrono::NaiveDate;
use diesel::prelude::*;

use super::PgPoolConn;
use crate::models::{NewWatchlist, Watchlist};
use crate::schema::watchlists::dsl::*;

pub fn create(conn: &mut PgPoolConn, new_item: &NewWatchlist) -> Result<Watchlist, diesel::result::Error> {
    diesel::insert_into(watchlists)
        .values(new_item)
        .returning(Watchlist::as_returning())
        .get_result(conn)
}

pub fn list_entries(
    conn: &mut PgPoolConn,
    name: &str,
    on_date: NaiveDate,
) -> Result<Vec<Watchlist>, diesel::result::Error> {
    watchlists
        .filter(watchlist_name.eq(name))
        .filter(date.eq(on_date))
        .order((company_code.asc(), exchange.asc()))
        .select(Watchlist::as_select())
        .load(conn)
}

pub fn exists(conn: &mut PgPoolConn, name: &str, on_date: NaiveDate) -> Result<bool, diesel::result::Error> {
    diesel::select(diesel::dsl::exists(
        watchlists
            .filter(watchlist_name.eq(name))
            .filter(date.eq(on_date)),
    ))
    .get_result(conn)
}

pub fn delete_entry(
    conn: &mut PgPoolConn,
    name: &str,
    on_date: NaiveDate,
    code: &str,
    ex: &str,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(
        watchlists
            .filter(watchlist_name.eq(name))
            .filter(date.eq(on_date))
            .filter(company_code.eq(code))
            .filter(exchange.eq(ex)),
    )
    .execute(conn)
}

/// 所有 (名称, 日期) 组合，名称升序、日期倒序
pub fn list_names_with_dates(conn: &mut PgPoolConn) -> Result<Vec<(String, NaiveDate)>, diesel::result::Error> {
    watchlists
        .select((watchlist_name, date))
        .distinct()
        .order((watchlist_name.asc(), date.desc()))
        .load(conn)
}
