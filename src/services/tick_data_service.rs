use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use serde_json::Value;

use crate::api_models::historical_data::{TickDataResponse, TickMetadata, TickPoint};
use crate::utils::bigdecimal_parser::parse_bigdecimal;
use crate::utils::ticker::ExchangeSymbol;
use crate::utils::time::{market_open_timestamp, tick_file_date};
use crate::utils::upstream::{UpstreamClient, UpstreamError};

/// 行情文件服务器：每个交易日每只股票一个按行分隔的 JSON 文件
#[derive(Debug, Clone)]
pub struct TickDataService {
    upstream: UpstreamClient,
}

impl TickDataService {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    /// `Live/LD_DD-MM-YYYY/CODE-EX.json`
    pub fn file_path(symbol: &ExchangeSymbol, date: NaiveDate) -> [String; 3] {
        [
            "Live".to_string(),
            format!("LD_{}", tick_file_date(date)),
            format!("{}.json", symbol.tick_file_symbol()),
        ]
    }

    pub async fn fetch_day(
        &self,
        raw_symbol: &str,
        symbol: &ExchangeSymbol,
        date: NaiveDate,
    ) -> Result<TickDataResponse, UpstreamError> {
        let path = Self::file_path(symbol, date);
        tracing::debug!("fetching tick file {}", path.join("/"));
        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        let body = self.upstream.get_text(&segments, &[]).await?;

        let trading_start = market_open_timestamp(date);
        let (data, metadata) = parse_tick_lines(&body, raw_symbol, trading_start);
        tracing::info!(
            symbol = raw_symbol,
            total = metadata.total_lines,
            returned = metadata.returned_points,
            filtered = metadata.filtered_points,
            skipped = metadata.skipped_lines,
            "parsed tick file"
        );

        Ok(TickDataResponse {
            success: true,
            data,
            source: "external",
            metadata,
        })
    }
}

/// 逐行解析；无法解析的行跳过，开盘 (09:15 IST) 之前的点过滤掉
pub fn parse_tick_lines(body: &str, symbol: &str, trading_start: i64) -> (Vec<TickPoint>, TickMetadata) {
    let lines: Vec<&str> = body.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let mut points = Vec::new();
    let mut filtered = 0;
    let mut skipped = 0;

    for line in &lines {
        let point: Value = match serde_json::from_str(line) {
            Ok(v @ Value::Object(_)) => v,
            Ok(_) | Err(_) => {
                skipped += 1;
                continue;
            }
        };

        let timestamp = int_field(&point, "timestamp")
            .filter(|t| *t != 0)
            .or_else(|| int_field(&point, "last_traded_time"))
            .unwrap_or(0);
        if timestamp < trading_start {
            filtered += 1;
            continue;
        }

        points.push(TickPoint {
            symbol: symbol.to_string(),
            ltp: price_field(&point, "ltp"),
            vol_traded_today: int_field(&point, "vol_traded_today").unwrap_or(0),
            last_traded_time: int_field(&point, "last_traded_time").unwrap_or(timestamp),
            bid_size: int_field(&point, "bid_size").unwrap_or(0),
            ask_size: int_field(&point, "ask_size").unwrap_or(0),
            bid_price: price_field(&point, "bid_price"),
            ask_price: price_field(&point, "ask_price"),
            low_price: price_field(&point, "low_price"),
            high_price: price_field(&point, "high_price"),
            open_price: price_field(&point, "open_price"),
            prev_close_price: price_field(&point, "prev_close_price"),
            timestamp,
        });
    }

    let metadata = TickMetadata {
        total_lines: lines.len(),
        returned_points: points.len(),
        filtered_points: filtered,
        skipped_lines: skipped,
        trading_start_timestamp: trading_start,
    };
    (points, metadata)
}

fn int_field(point: &Value, key: &str) -> Option<i64> {
    let v = point.get(key)?;
    v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))
}

fn price_field(point: &Value, key: &str) -> BigDecimal {
    parse_bigdecimal(point.get(key)).unwrap_or_else(BigDecimal::zero)
}
