use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Map;

use crate::{
    AppState,
    logging::AppLogger,
    utils::{error_codes, error_to_api_response},
};

/// 获取客户端 IP
///
/// 默认只使用连接地址；`trust_proxy` 为真时依次使用 x-real-ip、x-forwarded-for 第一项，
/// 都没有时再降级到连接地址。
pub fn client_ip(req: &Request<Body>, trust_proxy: bool) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    let forwarded = if trust_proxy {
        req.headers()
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .filter(|ip| !ip.trim().is_empty())
            .or_else(|| {
                req.headers()
                    .get("x-forwarded-for")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
            })
    } else {
        None
    };

    forwarded
        .or(remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

/// 按 IP 限流，超限时仍返回 200，由 code 字段区分
pub async fn rate_limit(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    let ip = client_ip(&req, state.config.trust_proxy_headers);

    if !state.security.request_limiter.try_acquire(&ip) {
        let window = state.config.rate_limit_default.window.as_secs();
        AppLogger::default().security_event("rate_limit_exceeded", None, Some(&ip), Map::new());
        return (
            StatusCode::OK,
            error_to_api_response::<()>(
                error_codes::RATE_LIMIT,
                format!("Too many requests, please retry in {} seconds", window),
            ),
        )
            .into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri("/health");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn connected(mut req: Request<Body>, addr: &str) -> Request<Body> {
        let addr: SocketAddr = addr.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[test]
    fn proxy_headers_ignored_by_default() {
        let req = connected(
            request(&[("x-real-ip", "10.0.0.7"), ("x-forwarded-for", "1.1.1.1")]),
            "192.168.1.20:5555",
        );
        assert_eq!(client_ip(&req, false), "192.168.1.20");
    }

    #[test]
    fn prefers_real_ip_header_behind_proxy() {
        let req = request(&[("x-real-ip", " 10.0.0.7 "), ("x-forwarded-for", "1.1.1.1")]);
        assert_eq!(client_ip(&req, true), "10.0.0.7");
    }

    #[test]
    fn falls_back_to_first_forwarded_address() {
        let req = request(&[("x-forwarded-for", "203.0.113.9, 10.0.0.1")]);
        assert_eq!(client_ip(&req, true), "203.0.113.9");
    }

    #[test]
    fn uses_connect_info_then_unknown() {
        let req = request(&[]);
        assert_eq!(client_ip(&req, true), "unknown");
        assert_eq!(client_ip(&req, false), "unknown");

        let req = connected(request(&[]), "192.168.1.20:5555");
        assert_eq!(client_ip(&req, true), "192.168.1.20");
    }
}
