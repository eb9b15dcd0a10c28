use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;

use super::{RetryPolicy, UpstreamError};
use crate::utils::config::UpstreamConfig;

/// 未经状态码判断的原始响应，由调用方决定如何转发
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

/// 请求体：JSON 或原样转发的字节
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Json(&'a Value),
    Raw {
        content_type: Option<&'a str>,
        bytes: &'a [u8],
    },
}

/// 绑定到单个上游服务的 HTTP 客户端，带超时与重试策略
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    name: &'static str,
    base_url: String,
    client: Client,
    timeout: Duration,
    retry: RetryPolicy,
}

impl UpstreamClient {
    pub fn new(name: &'static str, config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::from_reqwest(name, config.timeout, e))?;

        Ok(Self {
            name,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            timeout: config.timeout,
            retry: config.retry,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 逐段拼接路径；每段单独百分号编码，`.` 与 `..` 段被丢弃
    pub fn url(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&self.base_url).map_err(|_| UpstreamError::InvalidUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// 覆盖单次请求的超时，例如健康检查
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// GET 并解析 JSON，非 2xx 视为失败
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let body = self.get_text(segments, query).await?;
        serde_json::from_str(&body).map_err(|e| UpstreamError::Decode {
            upstream: self.name,
            message: e.to_string(),
        })
    }

    pub async fn get_text(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<String, UpstreamError> {
        let mut url = self.url(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let resp = self.send_checked(Method::GET, url, None).await?;
        Ok(resp.body)
    }

    pub async fn post_json<T: DeserializeOwned>(&self, segments: &[&str], body: &Value) -> Result<T, UpstreamError> {
        let url = self.url(segments)?;
        let resp = self.send_checked(Method::POST, url, Some(Payload::Json(body))).await?;
        serde_json::from_str(&resp.body).map_err(|e| UpstreamError::Decode {
            upstream: self.name,
            message: e.to_string(),
        })
    }

    /// 原样返回上游状态码与响应体，只有传输层错误才会重试
    pub async fn forward(
        &self,
        method: Method,
        url: Url,
        body: Option<Payload<'_>>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send_once(method.clone(), url.clone(), body).await {
                Ok(resp) => return Ok(resp),
                Err(err) if err.is_retryable() && attempt < self.retry.max_attempts => {
                    self.wait_before_retry(attempt, &err).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_checked(
        &self,
        method: Method,
        url: Url,
        body: Option<Payload<'_>>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match self.send_once(method.clone(), url.clone(), body).await {
                Ok(resp) if resp.status.is_success() => return Ok(resp),
                Ok(resp) => UpstreamError::Status {
                    upstream: self.name,
                    status: resp.status,
                    body: resp.body,
                },
                Err(err) => err,
            };

            if err.is_retryable() && attempt < self.retry.max_attempts {
                self.wait_before_retry(attempt, &err).await;
                continue;
            }
            return Err(err);
        }
    }

    async fn wait_before_retry(&self, attempt: usize, err: &UpstreamError) {
        let delay = self.retry.backoff(attempt);
        tracing::warn!(
            upstream = self.name,
            attempt,
            max_attempts = self.retry.max_attempts,
            "upstream call failed, retrying in {:?}: {}",
            delay,
            err
        );
        sleep(delay).await;
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        body: Option<Payload<'_>>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let mut request = self
            .client
            .request(method, url)
            .timeout(self.timeout)
            .header(ACCEPT, "application/json");
        match body {
            Some(Payload::Json(body)) => request = request.json(body),
            Some(Payload::Raw { content_type, bytes }) => {
                if let Some(content_type) = content_type {
                    request = request.header(CONTENT_TYPE, content_type);
                }
                request = request.body(bytes.to_vec());
            }
            None => {}
        }

        let resp = request
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(self.name, self.timeout, e))?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp
            .text()
            .await
            .map_err(|e| UpstreamError::from_reqwest(self.name, self.timeout, e))?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
