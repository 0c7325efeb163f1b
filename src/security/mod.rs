//! 安全相关功能：密码、令牌、限流、消息与文件校验

pub mod bubble;
pub mod html;
pub mod message;
pub mod password;
pub mod rate_limit;
pub mod token;
pub mod upload;

pub use bubble::{BubbleLimits, BubbleRateLimiter, ChatAction, LimitReason, RateLimitResult, UserLimits};
pub use html::{escape_html, sanitize_html, sanitize_input};
pub use message::{MessagePolicy, MessageSecurityValidator, MessageValidation, RedactionPolicy};
pub use password::{HashScheme, PasswordError, PasswordManager, PasswordRule};
pub use rate_limit::{ActivityWindow, RateLimiter};
pub use token::{SessionClaims, TokenManager};
pub use upload::{FileInfo, FileUploadSecurity, FileValidation, UploadPolicy, UploadedFile};

use crate::config::Config;

/// 应用持有的安全服务集合，随 AppState 共享
#[derive(Debug)]
pub struct SecurityServices {
    pub login_limiter: RateLimiter,
    pub request_limiter: RateLimiter,
    pub bubble_limiter: BubbleRateLimiter,
    pub message_validator: MessageSecurityValidator,
    pub file_upload: FileUploadSecurity,
    pub passwords: PasswordManager,
}

impl SecurityServices {
    pub fn from_config(config: &Config) -> Self {
        let request_limit = &config.rate_limit_default;
        Self {
            login_limiter: RateLimiter::for_login(config)
                .with_max_tracked(config.rate_limit_max_clients),
            request_limiter: RateLimiter::new(request_limit.count, request_limit.window)
                .with_retention(request_limit.window)
                .with_max_tracked(config.rate_limit_max_clients),
            bubble_limiter: BubbleRateLimiter::default(),
            message_validator: MessageSecurityValidator::default(),
            file_upload: FileUploadSecurity::default(),
            passwords: PasswordManager::from_config(config),
        }
    }

    /// 定时清理任务调用
    pub fn cleanup(&self) {
        self.bubble_limiter.cleanup_old_activities();
        let logins = self.login_limiter.cleanup();
        let clients = self.request_limiter.cleanup();
        tracing::debug!(logins, clients, "Rate limiter state cleaned up");
    }
}
