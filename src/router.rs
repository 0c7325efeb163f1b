use axum::{Router, middleware::from_fn, middleware::from_fn_with_state, routing::get};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    middleware::{log_errors, log_requests, rate_limit},
    routes,
};

/// 组装全部路由和中间件
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/careers", get(routes::catalog::list_careers))
        .route("/careers/{id}", get(routes::catalog::get_career))
        .route("/courses/{id}", get(routes::catalog::get_course))
        .route("/internships/{id}", get(routes::catalog::get_internship));

    // 后添加的中间件在外层：请求日志 -> 限流 -> 错误日志
    let router = Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api", api_routes)
        .layer(from_fn(log_errors))
        .layer(from_fn_with_state(state.clone(), rate_limit))
        .layer(from_fn_with_state(state.clone(), log_requests));

    // 非生产环境允许跨域
    let router = if state.config.debug {
        tracing::debug!("Adding permissive CORS layer");
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}
