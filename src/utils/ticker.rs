use thiserror::Error;

const MAX_SYMBOL_LEN: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TickerError {
    #[error("Invalid symbol format: {0}")]
    InvalidFormat(String),
}

/// `EXCHANGE:CODE-SERIES` 形式的完整代码，例如 `NSE:AXISBANK-EQ`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeSymbol {
    pub exchange: String,
    pub company_code: String,
    pub series: Option<String>,
}

impl ExchangeSymbol {
    pub fn parse(symbol: &str) -> Result<Self, TickerError> {
        let parts: Vec<&str> = symbol.trim().split(':').collect();
        if parts.len() != 2 {
            return Err(TickerError::InvalidFormat(symbol.to_string()));
        }

        let exchange = parts[0].trim();
        let (code, series) = match parts[1].split_once('-') {
            Some((code, series)) => (code.trim(), Some(series.trim().to_string())),
            None => (parts[1].trim(), None),
        };
        let series_ok = series.as_deref().map_or(true, |s| s.is_empty() || is_valid_symbol(s));
        if !is_valid_symbol(exchange) || !is_valid_symbol(code) || !series_ok {
            return Err(TickerError::InvalidFormat(symbol.to_string()));
        }

        Ok(Self {
            exchange: exchange.to_uppercase(),
            company_code: code.to_uppercase(),
            series: series.filter(|s| !s.is_empty()),
        })
    }

    /// 行情文件服务器使用 `CODE-EXCHANGE` 命名
    pub fn tick_file_symbol(&self) -> String {
        format!("{}-{}", self.company_code, self.exchange)
    }
}

/// 从 `NSE:NETWEB-EQ` 中取出 `NETWEB`；不含 `:` 的输入原样返回
pub fn extract_symbol(ticker: &str) -> String {
    let trimmed = ticker.trim();
    trimmed
        .split(':')
        .nth(1)
        .and_then(|rest| rest.split('-').next())
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .unwrap_or(trimmed)
        .to_string()
}

/// 上游路径中允许出现的代码：字母数字与 `& . _ : -`，不能是 `.` 或 `..`
pub fn is_valid_symbol(raw: &str) -> bool {
    !raw.is_empty()
        && raw.len() <= MAX_SYMBOL_LEN
        && raw != "."
        && raw != ".."
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '&' | '.' | '_' | ':' | '-'))
}

pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_symbol_from_compound_ticker() {
        assert_eq!(extract_symbol("NSE:NETWEB-EQ"), "NETWEB");
        assert_eq!(extract_symbol("BSE:TCS"), "TCS");
    }

    #[test]
    fn plain_ticker_is_returned_as_is() {
        assert_eq!(extract_symbol("RELIANCE"), "RELIANCE");
        assert_eq!(extract_symbol("NSE:"), "NSE:");
    }

    #[test]
    fn parses_exchange_symbol() {
        let sym = ExchangeSymbol::parse("NSE:AXISBANK-EQ").unwrap();
        assert_eq!(sym.exchange, "NSE");
        assert_eq!(sym.company_code, "AXISBANK");
        assert_eq!(sym.series.as_deref(), Some("EQ"));
        assert_eq!(sym.tick_file_symbol(), "AXISBANK-NSE");
    }

    #[test]
    fn rejects_symbol_without_exchange() {
        assert!(ExchangeSymbol::parse("AXISBANK-EQ").is_err());
        assert!(ExchangeSymbol::parse("NSE:AXIS:EQ").is_err());
        assert!(ExchangeSymbol::parse(":AXISBANK").is_err());
    }

    #[test]
    fn symbol_charset() {
        assert!(is_valid_symbol("M&M"));
        assert!(is_valid_symbol("BAJAJ-AUTO"));
        assert!(is_valid_symbol("NSE:NETWEB-EQ"));
        assert!(!is_valid_symbol(".."));
        assert!(!is_valid_symbol("../admin"));
        assert!(!is_valid_symbol("TCS?x=1"));
        assert!(!is_valid_symbol("TCS#frag"));
        assert!(!is_valid_symbol(""));
        assert!(ExchangeSymbol::parse("NSE:../../etc-EQ").is_err());
    }
}
