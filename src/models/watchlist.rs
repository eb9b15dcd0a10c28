use chrono::NaiveDate;
use diesel::prelude::*;

use crate::schema::watchlists;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = watchlists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Watchlist {
    pub id: i32,
    pub watchlist_name: String,
    pub date: NaiveDate,
    pub company_code: String,
    pub exchange: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = watchlists)]
pub struct NewWatchlist {
    pub watchlist_name: String,
    pub date: NaiveDate,
    pub company_code: String,
    pub exchange: String,
}
