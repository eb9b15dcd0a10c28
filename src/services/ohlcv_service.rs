use std::collections::BTreeMap;

use bigdecimal::ToPrimitive;
use chrono::{NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::api_models::ohlcv::OhlcvBar;
use crate::repositories::stock_price::OhlcvRow;
use crate::utils::time::{parse_date, parse_timestamp};

const MAX_INDICATOR_PERIOD: usize = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OhlcvError {
    #[error("Unsupported interval: {0}")]
    UnsupportedInterval(String),
    #[error("Unsupported indicator: {0}")]
    UnsupportedIndicator(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("startDate and endDate are required unless fetchAllData=true")]
    MissingRange,
    #[error("startDate must not be after endDate")]
    InvertedRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interval {
    #[default]
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    OneDay,
}

impl Interval {
    pub fn parse(raw: &str) -> Result<Self, OhlcvError> {
        match raw.trim() {
            "1m" => Ok(Interval::OneMinute),
            "5m" => Ok(Interval::FiveMinutes),
            "15m" => Ok(Interval::FifteenMinutes),
            "30m" => Ok(Interval::ThirtyMinutes),
            "1h" => Ok(Interval::OneHour),
            "1d" => Ok(Interval::OneDay),
            other => Err(OhlcvError::UnsupportedInterval(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
        }
    }

    pub fn bucket_secs(&self) -> i64 {
        match self {
            Interval::OneMinute => 60,
            Interval::FiveMinutes => 5 * 60,
            Interval::FifteenMinutes => 15 * 60,
            Interval::ThirtyMinutes => 30 * 60,
            Interval::OneHour => 3600,
            Interval::OneDay => 86_400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
}

/// `sma_20`、`ema_9`、`rsi_14` 这类指标名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicator {
    pub kind: IndicatorKind,
    pub period: usize,
}

impl Indicator {
    pub fn parse(raw: &str) -> Result<Self, OhlcvError> {
        let raw = raw.trim();
        let unsupported = || OhlcvError::UnsupportedIndicator(raw.to_string());

        let (kind, period) = raw.split_once('_').ok_or_else(unsupported)?;
        let kind = match kind.to_lowercase().as_str() {
            "sma" => IndicatorKind::Sma,
            "ema" => IndicatorKind::Ema,
            "rsi" => IndicatorKind::Rsi,
            _ => return Err(unsupported()),
        };
        let period: usize = period.parse().map_err(|_| unsupported())?;
        if period == 0 || period > MAX_INDICATOR_PERIOD {
            return Err(unsupported());
        }
        Ok(Self { kind, period })
    }

    pub fn name(&self) -> String {
        let prefix = match self.kind {
            IndicatorKind::Sma => "sma",
            IndicatorKind::Ema => "ema",
            IndicatorKind::Rsi => "rsi",
        };
        format!("{}_{}", prefix, self.period)
    }

    pub fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        match self.kind {
            IndicatorKind::Sma => sma(closes, self.period),
            IndicatorKind::Ema => ema(closes, self.period),
            IndicatorKind::Rsi => rsi(closes, self.period),
        }
    }
}

/// 逗号分隔的指标列表，去重并保持请求顺序
pub fn parse_indicators(raw: Option<&str>) -> Result<Vec<Indicator>, OhlcvError> {
    let mut out: Vec<Indicator> = Vec::new();
    for part in raw.unwrap_or_default().split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let indicator = Indicator::parse(part)?;
        if !out.contains(&indicator) {
            out.push(indicator);
        }
    }
    Ok(out)
}

/// 解析查询区间；纯日期的结束时间取当天最后一秒
pub fn resolve_range(
    start: Option<&str>,
    end: Option<&str>,
    fetch_all: bool,
) -> Result<(Option<NaiveDateTime>, Option<NaiveDateTime>), OhlcvError> {
    let start = start.map(str::trim).filter(|s| !s.is_empty());
    let end = end.map(str::trim).filter(|s| !s.is_empty());

    if !fetch_all && (start.is_none() || end.is_none()) {
        return Err(OhlcvError::MissingRange);
    }

    let start = start
        .map(|s| parse_timestamp(s).ok_or_else(|| OhlcvError::InvalidDate(s.to_string())))
        .transpose()?;
    let end = end
        .map(|s| match parse_date(s) {
            Some(d) => Ok(d.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))),
            None => parse_timestamp(s).ok_or_else(|| OhlcvError::InvalidDate(s.to_string())),
        })
        .transpose()?;

    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(OhlcvError::InvertedRange);
        }
    }
    Ok((start, end))
}

pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    let mut sum: f64 = values[..period].iter().sum();
    out[period - 1] = Some(sum / period as f64);
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out[i] = Some(sum / period as f64);
    }
    out
}

/// 以前 period 个值的简单均值作为种子
pub fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut prev = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(prev);
    for i in period..values.len() {
        prev = values[i] * k + prev * (1.0 - k);
        out[i] = Some(prev);
    }
    out
}

/// Wilder 平滑 RSI；区间内没有下跌时 RS 取 100
pub fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() <= period {
        return out;
    }

    let (mut avg_gain, mut avg_loss) = (0.0, 0.0);
    for i in 1..=period {
        let change = values[i] - values[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    let p = period as f64;
    for i in (period + 1)..values.len() {
        let change = values[i] - values[i - 1];
        let (gain, loss) = if change > 0.0 { (change, 0.0) } else { (0.0, -change) };
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    let rs = if avg_loss == 0.0 { 100.0 } else { avg_gain / avg_loss };
    100.0 - 100.0 / (1.0 + rs)
}

/// 聚合行转为响应 K 线，并按收盘价附加指标列
pub fn build_bars(rows: Vec<OhlcvRow>, indicators: &[Indicator]) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = rows
        .iter()
        .map(|r| r.close.to_f64().unwrap_or(f64::NAN))
        .collect();
    let series: Vec<(String, Vec<Option<f64>>)> = indicators
        .iter()
        .map(|ind| (ind.name(), ind.compute(&closes)))
        .collect();

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let values: BTreeMap<String, Option<f64>> = series
                .iter()
                .map(|(name, values)| (name.clone(), values[i].filter(|v| v.is_finite())))
                .collect();
            OhlcvBar {
                interval_start: row.interval_start,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
                indicators: values,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    use super::*;

    fn row(minute: u32, close: &str) -> OhlcvRow {
        let price = BigDecimal::from_str(close).unwrap();
        OhlcvRow {
            interval_start: NaiveDate::from_ymd_opt(2025, 1, 15)
                .unwrap()
                .and_hms_opt(9, 15 + minute, 0)
                .unwrap(),
            open: price.clone(),
            high: price.clone(),
            low: price.clone(),
            close: price,
            volume: 100,
        }
    }

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map(|a| (a - b).abs() < 1e-9).unwrap_or(false)
    }

    #[test]
    fn parses_intervals() {
        assert_eq!(Interval::parse("15m"), Ok(Interval::FifteenMinutes));
        assert_eq!(Interval::parse("1d").unwrap().bucket_secs(), 86_400);
        assert_eq!(
            Interval::parse("2h"),
            Err(OhlcvError::UnsupportedInterval("2h".to_string()))
        );
    }

    #[test]
    fn parses_indicator_list() {
        let list = parse_indicators(Some("sma_20, ema_9,RSI_14,sma_20")).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[2].name(), "rsi_14");
        assert!(parse_indicators(Some("macd_12")).is_err());
        assert!(parse_indicators(Some("sma_0")).is_err());
        assert!(parse_indicators(Some("sma")).is_err());
        assert!(parse_indicators(None).unwrap().is_empty());
    }

    #[test]
    fn range_is_required_unless_fetching_everything() {
        assert_eq!(resolve_range(Some("2025-01-01"), None, false), Err(OhlcvError::MissingRange));
        assert_eq!(resolve_range(None, None, true), Ok((None, None)));

        let (start, end) = resolve_range(Some("2025-01-01"), Some("2025-01-02"), false).unwrap();
        assert_eq!(start.unwrap().to_string(), "2025-01-01 00:00:00");
        assert_eq!(end.unwrap().to_string(), "2025-01-02 23:59:59");

        assert_eq!(
            resolve_range(Some("2025-01-05"), Some("2025-01-02"), false),
            Err(OhlcvError::InvertedRange)
        );
        assert!(matches!(
            resolve_range(Some("soon"), Some("2025-01-02"), false),
            Err(OhlcvError::InvalidDate(_))
        ));
    }

    #[test]
    fn sma_is_null_until_window_fills() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!(approx(out[2], 2.0));
        assert!(approx(out[3], 3.0));
    }

    #[test]
    fn ema_is_seeded_with_sma() {
        let out = ema(&[2.0, 4.0, 6.0, 8.0], 3);
        assert_eq!(out[1], None);
        assert!(approx(out[2], 4.0));
        // k = 0.5
        assert!(approx(out[3], 6.0));
    }

    #[test]
    fn rsi_of_steady_rise_is_near_100() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&closes, 14);
        assert!(out[13].is_none());
        let v = out[14].unwrap();
        assert!(v > 99.0 && v <= 100.0);
    }

    #[test]
    fn rsi_balances_gains_and_losses() {
        let closes = [10.0, 11.0, 10.0, 11.0, 10.0];
        let out = rsi(&closes, 4);
        assert!(approx(out[4], 50.0));
    }

    #[test]
    fn bars_keep_order_and_carry_indicator_columns() {
        let rows = vec![row(0, "100.00"), row(1, "101.00"), row(2, "102.50")];
        let indicators = parse_indicators(Some("sma_2")).unwrap();
        let bars = build_bars(rows, &indicators);

        assert_eq!(bars.len(), 3);
        assert!(bars.windows(2).all(|w| w[0].interval_start < w[1].interval_start));
        assert_eq!(bars[0].indicators.get("sma_2"), Some(&None));
        assert!(approx(*bars[2].indicators.get("sma_2").unwrap(), 101.75));

        let json = serde_json::to_value(&bars[2]).unwrap();
        assert_eq!(json["volume"], 100);
        assert!(json.get("sma_2").is_some());
    }
}
