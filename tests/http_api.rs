use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::ConnectInfo,
    http::{Request, StatusCode},
};
use serde_json::Value;
use studyos::{
    AppState, cache::CATALOG_CAREERS_KEY, config::Config, middleware::REQUEST_ID_HEADER,
    router::build_router,
};
use tempfile::TempDir;
use tower::ServiceExt;

fn test_state(extra: &[(&str, &str)]) -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("APP_ENV".into(), "testing".into());
    vars.insert("GEMINI_API_KEY".into(), "test-gemini-key".into());
    vars.insert(
        "CACHE_DIR".into(),
        dir.path().join("cache").to_string_lossy().into_owned(),
    );
    vars.insert(
        "FIREBASE_CREDENTIALS_PATH".into(),
        dir.path().join("missing.json").to_string_lossy().into_owned(),
    );
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }

    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    let state = AppState::new(config).unwrap();
    (dir, state)
}

async fn get(app: &Router, uri: &str, ip: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
    let addr: SocketAddr = format!("{}:40000", ip).parse().unwrap();
    send(app, Request::builder().uri(uri).extension(ConnectInfo(addr))).await
}

async fn send(
    app: &Router,
    builder: axum::http::request::Builder,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_environment() {
    let (_dir, state) = test_state(&[]);
    let app = build_router(state);

    let (status, headers, body) = get(&app, "/health", "10.0.0.1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["msg"], "success");
    assert_eq!(body["resp_data"]["status"], "ok");
    assert_eq!(body["resp_data"]["environment"], "testing");
    assert_eq!(body["resp_data"]["firebase_configured"], false);
    assert!(headers.contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn careers_are_grouped_and_cached() {
    let (_dir, state) = test_state(&[]);
    let app = build_router(state.clone());

    let (status, _, body) = get(&app, "/api/careers", "10.0.0.2").await;
    assert_eq!(status, StatusCode::OK);
    let domains = body["resp_data"].as_array().unwrap();
    assert_eq!(domains.len(), 5);
    assert_eq!(domains[0]["name"], "Technology");
    assert_eq!(domains[0]["careers"][0]["id"], "software_engineer");

    let cached: Option<Value> = state.cache.get(CATALOG_CAREERS_KEY);
    assert_eq!(cached.as_ref(), Some(&body["resp_data"]));

    let (_, _, again) = get(&app, "/api/careers", "10.0.0.2").await;
    assert_eq!(again, body);
}

#[tokio::test]
async fn career_detail_includes_related_entries() {
    let (_dir, state) = test_state(&[]);
    let app = build_router(state);

    let (status, _, body) = get(&app, "/api/careers/data_scientist", "10.0.0.3").await;
    assert_eq!(status, StatusCode::OK);
    let career = &body["resp_data"];
    assert_eq!(career["name"], "Data Scientist");
    assert_eq!(career["domain"], "Technology");
    assert_eq!(career["related_courses"][0]["id"], "intro_ai");
    assert_eq!(career["related_internships"][0]["id"], "data_analytics_intern");
}

#[tokio::test]
async fn course_and_internship_lookups() {
    let (_dir, state) = test_state(&[]);
    let app = build_router(state);

    let (_, _, body) = get(&app, "/api/courses/python_beginners", "10.0.0.4").await;
    assert_eq!(body["resp_data"]["provider"], "Coursera");

    let (_, _, body) = get(&app, "/api/internships/finance_intern", "10.0.0.4").await;
    assert_eq!(body["resp_data"]["location"], "Delhi");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (_dir, state) = test_state(&[]);
    let app = build_router(state);

    for (uri, msg) in [
        ("/api/careers/astronaut", "Career not found"),
        ("/api/courses/nope", "Course not found"),
        ("/api/internships/nope", "Internship not found"),
    ] {
        let (status, _, body) = get(&app, uri, "10.0.0.5").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 1004);
        assert_eq!(body["msg"], msg);
        assert!(body.get("resp_data").is_none());
    }
}

#[tokio::test]
async fn requests_are_rate_limited_per_ip() {
    let (_dir, state) = test_state(&[("RATE_LIMIT_DEFAULT", "2 per minute")]);
    let app = build_router(state);

    for _ in 0..2 {
        let (_, _, body) = get(&app, "/health", "198.51.100.7").await;
        assert_eq!(body["code"], 0);
    }

    let (status, _, body) = get(&app, "/health", "198.51.100.7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 1005);
    assert_eq!(body["msg"], "Too many requests, please retry in 60 seconds");

    // 其他 IP 不受影响
    let (_, _, body) = get(&app, "/health", "198.51.100.8").await;
    assert_eq!(body["code"], 0);
}

#[tokio::test]
async fn forwarded_headers_ignored_without_trusted_proxy() {
    let (_dir, state) = test_state(&[("RATE_LIMIT_DEFAULT", "2 per minute")]);
    let app = build_router(state.clone());
    let addr: SocketAddr = "198.51.100.9:40000".parse().unwrap();

    let mut codes = Vec::new();
    for i in 0..5 {
        let builder = Request::builder()
            .uri("/health")
            .header("x-real-ip", format!("203.0.113.{}", i))
            .extension(ConnectInfo(addr));
        let (_, _, body) = send(&app, builder).await;
        codes.push(body["code"].as_i64().unwrap());
    }
    assert_eq!(codes, vec![0, 0, 1005, 1005, 1005]);
    assert_eq!(state.security.request_limiter.tracked(), 1);
}

#[tokio::test]
async fn trusted_proxy_headers_are_bounded() {
    let (_dir, state) = test_state(&[
        ("TRUST_PROXY_HEADERS", "true"),
        ("RATE_LIMIT_MAX_CLIENTS", "16"),
    ]);
    let app = build_router(state.clone());

    for i in 0..100 {
        let builder = Request::builder()
            .uri("/health")
            .header("x-forwarded-for", format!("203.0.113.{}, 10.0.0.1", i));
        let (_, _, body) = send(&app, builder).await;
        assert_eq!(body["code"], 0);
        assert!(state.security.request_limiter.tracked() <= 16);
    }
    assert_eq!(state.security.request_limiter.tracked(), 16);
}
