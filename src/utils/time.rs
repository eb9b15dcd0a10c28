use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Asia::Kolkata;

const IST_OFFSET_SECS: i64 = 5 * 3600 + 30 * 60;
const MARKET_OPEN_MINUTES: i64 = 9 * 60 + 15;

/// 交易所当天日期 (IST)
pub fn today_ist() -> NaiveDate {
    Utc::now().with_timezone(&Kolkata).date_naive()
}

/// 指定交易日 09:15 IST 对应的 unix 秒
pub fn market_open_timestamp(date: NaiveDate) -> i64 {
    let local = date.and_time(NaiveTime::MIN) + Duration::minutes(MARKET_OPEN_MINUTES);
    Kolkata
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| local.and_utc().timestamp() - IST_OFFSET_SECS)
}

/// 行情文件目录使用 `DD-MM-YYYY`
pub fn tick_file_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// 解析时间戳；带时区的输入换算为 IST 墙上时间，与库中无时区列保持一致
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Kolkata).naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_date(raw).map(|d| d.and_time(NaiveTime::MIN)))
}
