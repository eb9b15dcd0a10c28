use bigdecimal::{BigDecimal, RoundingMode};
use serde_json::Value;
use std::str::FromStr;

/// 将 JSON Value 解析为 BigDecimal
///
/// - Number: 按 JSON 文本表示解析，不经过 f64 运算
/// - String: 直接解析
/// - 其他: None
pub fn parse_bigdecimal(v: Option<&Value>) -> Option<BigDecimal> {
    match v {
        Some(Value::Number(n)) => BigDecimal::from_str(&n.to_string()).ok(),
        Some(Value::String(s)) => BigDecimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// 价格统一保留两位小数（四舍五入）
pub fn round_price(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}
