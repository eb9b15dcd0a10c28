use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Numeric, Text, Timestamp};

use super::PgPoolConn;

/// 聚合后的 K 线行
#[derive(Debug, QueryableByName)]
pub struct OhlcvRow {
    #[diesel(sql_type = Timestamp)]
    pub interval_start: NaiveDateTime,
    #[diesel(sql_type = Numeric)]
    pub open: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub high: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub low: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub close: BigDecimal,
    #[diesel(sql_type = BigInt)]
    pub volume: i64,
}

#[derive(Debug, QueryableByName)]
pub struct AverageCloseRow {
    #[diesel(sql_type = Text)]
    pub company_code: String,
    #[diesel(sql_type = Numeric)]
    pub average_close: BigDecimal,
}

/// 按固定秒数分桶聚合：开盘取首笔、收盘取末笔、量求和，结果按区间起点升序
pub fn aggregate_ohlcv(
    conn: &mut PgPoolConn,
    code: &str,
    exchange: &str,
    bucket_secs: i64,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<Vec<OhlcvRow>, diesel::result::Error> {
    let query = r#"
        SELECT
            to_timestamp((floor(extract(epoch FROM ts))::BIGINT / $3) * $3) AT TIME ZONE 'UTC' AS interval_start,
            (array_agg(open ORDER BY ts ASC))[1] AS open,
            MAX(high) AS high,
            MIN(low) AS low,
            (array_agg(close ORDER BY ts DESC))[1] AS close,
            SUM(volume)::BIGINT AS volume
        FROM stock_prices
        WHERE company_code = $1
          AND exchange = $2
          AND ($4::timestamp IS NULL OR ts >= $4)
          AND ($5::timestamp IS NULL OR ts <= $5)
        GROUP BY 1
        ORDER BY 1 ASC
    "#;

    diesel::sql_query(query)
        .bind::<Text, _>(code)
        .bind::<Text, _>(exchange)
        .bind::<BigInt, _>(bucket_secs)
        .bind::<Nullable<Timestamp>, _>(start)
        .bind::<Nullable<Timestamp>, _>(end)
        .load::<OhlcvRow>(conn)
}

pub fn top_by_average_close(conn: &mut PgPoolConn, limit: i64) -> Result<Vec<AverageCloseRow>, diesel::result::Error> {
    let query = r#"
        SELECT company_code, ROUND(AVG(close), 2) AS average_close
        FROM stock_prices
        GROUP BY company_code
        ORDER BY average_close DESC
        LIMIT $1
    "#;

    diesel::sql_query(query)
        .bind::<BigInt, _>(limit)
        .load::<AverageCloseRow>(conn)
}
