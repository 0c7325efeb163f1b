//! 结构化日志
//!
//! 输出 JSON 格式日志。日志级别取自配置中的 LOG_LEVEL，
//! 设置了 RUST_LOG 时以 RUST_LOG 为准。

use chrono::Utc;
use serde_json::{Map, Value};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

pub const DEFAULT_LOGGER: &str = "studyos";

/// 初始化全局日志，重复调用时保持第一次的设置
pub fn setup_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.tracing_directive()));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_current_span(false))
        .try_init();

    match result {
        Ok(()) => tracing::info!(
            environment = config.environment.as_str(),
            level = %config.log_level,
            "Logging initialised"
        ),
        Err(e) => tracing::debug!(error = %e, "Logging already initialised"),
    }
}

/// 附加字段统一序列化成一个 JSON 对象输出
fn render(fields: Map<String, Value>) -> String {
    Value::Object(fields).to_string()
}

#[derive(Debug, Clone, Copy)]
pub struct AppLogger {
    name: &'static str,
}

impl Default for AppLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOGGER)
    }
}

impl AppLogger {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn debug(&self, message: &str, fields: Map<String, Value>) {
        tracing::debug!(logger = self.name, fields = %render(fields), "{}", message);
    }

    pub fn info(&self, message: &str, fields: Map<String, Value>) {
        tracing::info!(logger = self.name, fields = %render(fields), "{}", message);
    }

    pub fn warning(&self, message: &str, fields: Map<String, Value>) {
        tracing::warn!(logger = self.name, fields = %render(fields), "{}", message);
    }

    pub fn error(&self, message: &str, fields: Map<String, Value>) {
        tracing::error!(logger = self.name, fields = %render(fields), "{}", message);
    }

    /// tracing 没有 critical 级别，按 error 输出并打标记
    pub fn critical(&self, message: &str, fields: Map<String, Value>) {
        tracing::error!(
            logger = self.name,
            critical = true,
            fields = %render(fields),
            "{}",
            message
        );
    }

    /// 记录安全相关事件（登录、登出、登录失败、限流等）
    pub fn security_event(
        &self,
        event_type: &str,
        user_id: Option<&str>,
        ip_address: Option<&str>,
        details: Map<String, Value>,
    ) {
        tracing::info!(
            logger = self.name,
            event_type,
            user_id = user_id.unwrap_or_default(),
            ip_address = ip_address.unwrap_or_default(),
            timestamp = %Utc::now().to_rfc3339(),
            details = %render(details),
            "security_event"
        );
    }

    /// 记录数据变更的审计日志
    pub fn audit_log(
        &self,
        action: &str,
        user_id: &str,
        resource: &str,
        success: bool,
        details: Map<String, Value>,
    ) {
        tracing::info!(
            logger = self.name,
            action,
            user_id,
            resource,
            success,
            timestamp = %Utc::now().to_rfc3339(),
            details = %render(details),
            "audit_log"
        );
    }
}
