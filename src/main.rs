use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use studyos::{
    AppState, config::Config, logging::setup_logging, router::build_router,
};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// 定时清理限流记录和过期缓存
fn spawn_cleanup_task(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            state.security.cleanup();

            let cache = state.cache.clone();
            match tokio::task::spawn_blocking(move || cache.purge_expired()).await {
                Ok(Ok(0)) => {}
                Ok(Ok(purged)) => tracing::debug!(purged, "Expired cache entries purged"),
                Ok(Err(e)) => tracing::warn!(error = %e, "Failed to purge cache"),
                Err(e) => tracing::warn!(error = %e, "Cache purge task failed"),
            }
        }
    });
}

#[tokio::main]
async fn main() {
    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 初始化日志
    setup_logging(&config);

    let state = AppState::new(config).expect("Failed to open cache directory");
    spawn_cleanup_task(state.clone());

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    let app = build_router(state);

    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
