use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::PgPoolConn;
use crate::models::{NewPrediction, Prediction};
use crate::schema::predictions::dsl::*;

/// 预测记录只写入不修改，因此这里没有 update/delete
pub fn create(conn: &mut PgPoolConn, new_rec: &NewPrediction) -> Result<Prediction, diesel::result::Error> {
    diesel::insert_into(predictions)
        .values(new_rec)
        .returning(Prediction::as_returning())
        .get_result(conn)
}

pub fn find_by_company_and_time(
    conn: &mut PgPoolConn,
    name: &str,
    at: NaiveDateTime,
) -> Result<Prediction, diesel::result::Error> {
    predictions
        .filter(company.eq(name))
        .filter(target_time.eq(at))
        .select(Prediction::as_select())
        .first(conn)
}

pub fn list_range(
    conn: &mut PgPoolConn,
    name: &str,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<Vec<Prediction>, diesel::result::Error> {
    let mut query = predictions
        .filter(company.eq(name.to_string()))
        .select(Prediction::as_select())
        .into_boxed();
    if let Some(start) = start {
        query = query.filter(target_time.ge(start));
    }
    if let Some(end) = end {
        query = query.filter(target_time.le(end));
    }
    query.order(target_time.asc()).load(conn)
}
