use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::client_ip;
use crate::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 每个请求结束时输出一条 request_completed 日志，并回写请求 ID
pub async fn log_requests(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let ip = client_ip(&req, state.config.trust_proxy_headers);
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let started = Instant::now();

    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    tracing::info!(
        request_id = %request_id,
        %method,
        %path,
        status = response.status().as_u16(),
        %ip,
        %user_agent,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request_completed"
    );
    response
}
