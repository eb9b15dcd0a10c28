use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::utils::upstream::RetryPolicy;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_POOL_SIZE: u32 = 10;

const DEFAULT_PREDICTION_API_URL: &str = "http://localhost:5112";
const DEFAULT_GTT_API_URL: &str = "http://localhost:5113";
const DEFAULT_TICK_SERVER_URL: &str = "http://localhost:6969";
const DEFAULT_SENTIMENT_API_URL: &str = "http://localhost:5717";
const DEFAULT_MARKET_DATA_URL: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let raw = format!("{}:{}", host, port);
        let addr: SocketAddr = raw.parse().map_err(|_| ConfigError::Invalid {
            name: "HOST/PORT",
            value: raw.clone(),
        })?;
        Ok(Self { addr })
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;
        let pool_size = env::var("DB_POOL_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_POOL_SIZE);
        Ok(Self {
            url,
            pool_size,
            run_migrations: env_flag("RUN_MIGRATIONS"),
        })
    }
}

/// 单个上游服务的地址、超时与重试策略
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            retry: RetryPolicy::single_attempt(),
        }
    }

    /// 读取 `{PREFIX}_URL`/`{PREFIX}_API_URL`、`{PREFIX}_TIMEOUT_SECS`、`{PREFIX}_MAX_ATTEMPTS`
    fn from_env(url_var: &str, prefix: &str, default_url: &str, default_timeout_secs: u64) -> Self {
        let base_url = env::var(url_var).unwrap_or_else(|_| default_url.to_string());
        let timeout_secs = env::var(format!("{prefix}_TIMEOUT_SECS"))
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(default_timeout_secs);
        let max_attempts = env::var(format!("{prefix}_MAX_ATTEMPTS"))
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(1);

        let mut cfg = Self::new(base_url, Duration::from_secs(timeout_secs));
        cfg.retry = RetryPolicy::with_attempts(max_attempts);
        cfg
    }
}

/// 路径前缀转发规则，例如 `/api/premarket` -> `http://host:5717/api/premarket`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pub prefix: String,
    pub destination: String,
}

#[derive(Debug, Clone)]
pub struct UpstreamsConfig {
    pub prediction: UpstreamConfig,
    pub gtt: UpstreamConfig,
    pub tick_server: UpstreamConfig,
    pub sentiment: UpstreamConfig,
    pub market_data: UpstreamConfig,
    pub rewrites: Vec<RewriteRule>,
}

impl UpstreamsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let prediction =
            UpstreamConfig::from_env("PREDICTION_API_URL", "PREDICTION", DEFAULT_PREDICTION_API_URL, 10);
        let gtt = UpstreamConfig::from_env("GTT_API_URL", "GTT", DEFAULT_GTT_API_URL, 15);
        let tick_server =
            UpstreamConfig::from_env("TICK_SERVER_URL", "TICK_SERVER", DEFAULT_TICK_SERVER_URL, 30);
        let sentiment =
            UpstreamConfig::from_env("SENTIMENT_API_URL", "SENTIMENT", DEFAULT_SENTIMENT_API_URL, 10);
        let market_data =
            UpstreamConfig::from_env("MARKET_DATA_URL", "MARKET_DATA", DEFAULT_MARKET_DATA_URL, 30);

        let rewrites = match env::var("REWRITE_RULES") {
            Ok(raw) if !raw.trim().is_empty() => parse_rewrite_rules(&raw)?,
            _ => vec![RewriteRule {
                prefix: "/api/premarket".to_string(),
                destination: format!("{}/api/premarket", sentiment.base_url),
            }],
        };

        Ok(Self {
            prediction,
            gtt,
            tick_server,
            sentiment,
            market_data,
            rewrites,
        })
    }
}

pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upstreams: UpstreamsConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            upstreams: UpstreamsConfig::from_env()?,
        })
    }
}

/// 解析 `prefix=destination,prefix=destination`
pub fn parse_rewrite_rules(raw: &str) -> Result<Vec<RewriteRule>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (prefix, destination) = entry.split_once('=').ok_or_else(|| ConfigError::Invalid {
                name: "REWRITE_RULES",
                value: entry.to_string(),
            })?;
            let prefix = prefix.trim().trim_end_matches('/');
            let destination = destination.trim().trim_end_matches('/');
            if !prefix.starts_with('/') || prefix.len() < 2 || destination.is_empty() {
                return Err(ConfigError::Invalid {
                    name: "REWRITE_RULES",
                    value: entry.to_string(),
                });
            }
            Ok(RewriteRule {
                prefix: prefix.to_string(),
                destination: destination.to_string(),
            })
        })
        .collect()
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rewrite_rules() {
        let rules = parse_rewrite_rules(
            "/api/premarket=http://10.0.0.2:5717/api/premarket/, /graphs=http://10.0.0.2:6969/assets",
        )
        .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].prefix, "/api/premarket");
        assert_eq!(rules[0].destination, "http://10.0.0.2:5717/api/premarket");
        assert_eq!(rules[1].prefix, "/graphs");
    }

    #[test]
    fn rejects_rule_without_leading_slash() {
        assert!(parse_rewrite_rules("api=http://localhost").is_err());
        assert!(parse_rewrite_rules("/api").is_err());
    }

    #[test]
    fn upstream_base_url_is_trimmed() {
        let cfg = UpstreamConfig::new("http://localhost:5112/", Duration::from_secs(10));
        assert_eq!(cfg.base_url, "http://localhost:5112");
        assert_eq!(cfg.retry.max_attempts, 1);
    }
}
