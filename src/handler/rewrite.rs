use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::handler::error::AppError;
use crate::utils::upstream::{Payload, UpstreamClient};

/// 把 `{prefix}/{rest}?query` 原样转发到目标服务，透传方法、请求体、状态码与响应体
pub async fn forward(
    client: UpstreamClient,
    method: Method,
    rest: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let segments: Vec<&str> = rest.split('/').collect();
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return Err(AppError::BadRequest(format!("Invalid path: {}", rest)));
    }

    let mut url = client
        .url(&segments)
        .map_err(|e| AppError::upstream("Invalid rewrite destination", &e))?;
    url.set_query(query.as_deref().filter(|q| !q.is_empty()));

    let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let payload = (!body.is_empty()).then(|| Payload::Raw {
        content_type,
        bytes: &body,
    });

    let resp = client
        .forward(method, url, payload)
        .await
        .map_err(|e| AppError::upstream("Failed to reach upstream service", &e))?;

    let status = StatusCode::from_u16(resp.status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = resp
        .content_type
        .unwrap_or_else(|| "application/json".to_string());
    Ok((status, [(header::CONTENT_TYPE, content_type)], Body::from(resp.body)).into_response())
}
