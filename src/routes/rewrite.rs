use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, RawQuery},
    http::{HeaderMap, Method},
    routing::any,
    Router,
};

use crate::app::AppState;
use crate::handler::rewrite::forward;
use crate::utils::config::{RewriteRule, UpstreamConfig};
use crate::utils::upstream::{UpstreamClient, UpstreamError};

const REWRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// 每条规则以任意方法注册 `{prefix}/*rest`，客户端在启动时构建
pub fn router(rules: &[RewriteRule]) -> Result<Router<AppState>, UpstreamError> {
    let mut router = Router::new();
    for rule in rules {
        let client = UpstreamClient::new("rewrite", &UpstreamConfig::new(&rule.destination, REWRITE_TIMEOUT))?;
        router = router.route(
            &format!("{}/*rest", rule.prefix),
            any(
                move |method: Method,
                      Path(rest): Path<String>,
                      RawQuery(query): RawQuery,
                      headers: HeaderMap,
                      body: Bytes| {
                    let client = client.clone();
                    async move { forward(client, method, rest, query, headers, body).await }
                },
            ),
        );
    }
    Ok(router)
}
