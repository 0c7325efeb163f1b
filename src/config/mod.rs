use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub mod firebase;

pub use firebase::{FirebaseError, FirebaseSettings, ServiceAccount};

/// 测试环境使用的固定密钥
pub const TESTING_SECRET_KEY: &str = "test-secret-key-for-testing-only";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("invalid rate limit `{0}`, expected `<count> per <second|minute|hour|day>`")]
    InvalidRate(String),
}

/// 运行环境，对应 FLASK_ENV / APP_ENV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Testing,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Testing => "testing",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" | "default" => Ok(Environment::Production),
            "testing" | "test" => Ok(Environment::Testing),
            other => Err(ConfigError::Invalid {
                key: "FLASK_ENV",
                value: other.to_string(),
            }),
        }
    }
}

/// 限流规则，例如 "100 per hour"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSpec {
    pub count: usize,
    pub window: Duration,
}

impl RateSpec {
    pub const fn new(count: usize, window: Duration) -> Self {
        Self { count, window }
    }
}

impl FromStr for RateSpec {
    type Err = ConfigError;

    /// 支持 "5 per minute" 与 "5/minute" 两种写法
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRate(s.to_string());
        let normalized = s.trim().to_ascii_lowercase();
        let (count, unit) = match normalized.split_once('/') {
            Some((count, unit)) => (count.trim(), unit.trim()),
            None => {
                let mut parts = normalized.split_whitespace();
                let count = parts.next().ok_or_else(invalid)?;
                if parts.next() != Some("per") {
                    return Err(invalid());
                }
                let unit = parts.next().ok_or_else(invalid)?;
                if parts.next().is_some() {
                    return Err(invalid());
                }
                (count, unit)
            }
        };

        let count: usize = count.parse().map_err(|_| invalid())?;
        let secs = match unit.trim_end_matches('s') {
            "second" | "sec" => 1,
            "minute" | "min" => 60,
            "hour" => 3600,
            "day" => 86_400,
            _ => return Err(invalid()),
        };

        Ok(RateSpec::new(count, Duration::from_secs(secs)))
    }
}

impl fmt::Display for RateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.window.as_secs() {
            1 => "second",
            60 => "minute",
            3600 => "hour",
            86_400 => "day",
            secs => return write!(f, "{} per {}s", self.count, secs),
        };
        write!(f, "{} per {}", self.count, unit)
    }
}

/// 邮件发送配置
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub use_tls: bool,
    pub use_ssl: bool,
    pub username: String,
    pub password: String,
    pub default_sender: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub debug: bool,
    pub secret_key: String,
    pub gemini_api_key: String,
    pub session_cookie_secure: bool,
    pub session_lifetime_secs: u64,
    pub firebase_credentials_path: PathBuf,
    pub bcrypt_rounds: u32,
    pub max_login_attempts: usize,
    pub login_lockout_minutes: u64,
    pub rate_limit_default: RateSpec,
    pub rate_limit_login: RateSpec,
    pub rate_limit_signup: RateSpec,
    /// 限流器同时跟踪的客户端数量上限
    pub rate_limit_max_clients: usize,
    /// 部署在反向代理之后时才信任 x-real-ip / x-forwarded-for
    pub trust_proxy_headers: bool,
    pub cache_dir: PathBuf,
    pub cache_default_timeout_secs: u64,
    pub log_level: String,
    pub mail: MailConfig,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源构建配置，from_env 和测试共用
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str, default: bool| {
            var(key)
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };

        let environment = match var("FLASK_ENV").or_else(|| var("APP_ENV")) {
            Some(value) => value.parse()?,
            None => Environment::Production,
        };

        let secret_key = match (var("SECRET_KEY"), environment) {
            (_, Environment::Testing) => TESTING_SECRET_KEY.to_string(),
            (Some(key), _) => key,
            (None, _) => return Err(ConfigError::Missing("SECRET_KEY")),
        };
        let gemini_api_key = var("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        // 显式设置的 LOG_LEVEL 优先于环境默认值
        let log_level = var("LOG_LEVEL").unwrap_or_else(|| {
            match environment {
                Environment::Development => "DEBUG",
                Environment::Production => "WARNING",
                Environment::Testing => "INFO",
            }
            .to_string()
        });

        let session_cookie_secure = match environment {
            Environment::Production => true,
            Environment::Development | Environment::Testing => {
                flag("SESSION_COOKIE_SECURE", false)
            }
        };

        let rate = |key: &'static str, default: &str| -> Result<RateSpec, ConfigError> {
            var(key).as_deref().unwrap_or(default).parse()
        };

        let mail_port = match var("MAIL_PORT") {
            Some(port) => port.parse().map_err(|_| ConfigError::Invalid {
                key: "MAIL_PORT",
                value: port,
            })?,
            None => 587,
        };
        let rate_limit_max_clients = match var("RATE_LIMIT_MAX_CLIENTS") {
            Some(value) => match value.parse::<usize>() {
                Ok(max) if max > 0 => max,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "RATE_LIMIT_MAX_CLIENTS",
                        value,
                    });
                }
            },
            None => 10_000,
        };
        let server_port = match var("SERVER_PORT") {
            Some(port) => port.parse().map_err(|_| ConfigError::Invalid {
                key: "SERVER_PORT",
                value: port,
            })?,
            None => 5000,
        };

        Ok(Config {
            environment,
            debug: environment != Environment::Production,
            secret_key,
            gemini_api_key,
            session_cookie_secure,
            session_lifetime_secs: 24 * 3600,
            firebase_credentials_path: var("FIREBASE_CREDENTIALS_PATH")
                .unwrap_or_else(|| "serviceAccountKey.json".to_string())
                .into(),
            bcrypt_rounds: 12,
            max_login_attempts: 5,
            login_lockout_minutes: 15,
            rate_limit_default: rate("RATE_LIMIT_DEFAULT", "100 per hour")?,
            rate_limit_login: rate("RATE_LIMIT_LOGIN", "5 per minute")?,
            rate_limit_signup: rate("RATE_LIMIT_SIGNUP", "3 per hour")?,
            rate_limit_max_clients,
            trust_proxy_headers: flag("TRUST_PROXY_HEADERS", false),
            cache_dir: var("CACHE_DIR")
                .unwrap_or_else(|| "./cache".to_string())
                .into(),
            cache_default_timeout_secs: 300,
            log_level,
            mail: MailConfig {
                server: var("MAIL_SERVER").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                port: mail_port,
                use_tls: flag("MAIL_USE_TLS", true),
                use_ssl: flag("MAIL_USE_SSL", false),
                username: var("MAIL_USERNAME").unwrap_or_default(),
                password: var("MAIL_PASSWORD").unwrap_or_default(),
                default_sender: var("MAIL_DEFAULT_SENDER")
                    .unwrap_or_else(|| "noreply@studyos.app".to_string()),
            },
            server_host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port,
        })
    }

    pub fn session_lifetime(&self) -> Duration {
        Duration::from_secs(self.session_lifetime_secs)
    }

    pub fn login_lockout(&self) -> Duration {
        Duration::from_secs(self.login_lockout_minutes * 60)
    }

    pub fn cache_default_timeout(&self) -> Duration {
        Duration::from_secs(self.cache_default_timeout_secs)
    }

    /// 把 LOG_LEVEL 转换成 tracing 的过滤指令
    pub fn tracing_directive(&self) -> &'static str {
        match self.log_level.to_ascii_uppercase().as_str() {
            "DEBUG" => "debug",
            "WARNING" | "WARN" => "warn",
            "ERROR" | "CRITICAL" => "error",
            "TRACE" => "trace",
            _ => "info",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn secret_key_is_required_outside_testing() {
        let err = load(&[("GEMINI_API_KEY", "g")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SECRET_KEY")));
    }

    #[test]
    fn gemini_key_is_always_required() {
        let err = load(&[("SECRET_KEY", "s")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("GEMINI_API_KEY")));

        let err = load(&[("FLASK_ENV", "testing")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("GEMINI_API_KEY")));
    }

    #[test]
    fn defaults_follow_production_profile() {
        let config = load(&[("SECRET_KEY", "s"), ("GEMINI_API_KEY", "g")]).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert!(!config.debug);
        assert!(config.session_cookie_secure);
        assert_eq!(config.log_level, "WARNING");
        assert_eq!(config.tracing_directive(), "warn");
        assert_eq!(config.cache_dir, PathBuf::from("./cache"));
        assert_eq!(config.cache_default_timeout(), Duration::from_secs(300));
        assert_eq!(config.rate_limit_default, RateSpec::new(100, Duration::from_secs(3600)));
        assert_eq!(config.rate_limit_login, RateSpec::new(5, Duration::from_secs(60)));
        assert_eq!(config.rate_limit_signup, RateSpec::new(3, Duration::from_secs(3600)));
        assert_eq!(config.mail.server, "smtp.gmail.com");
        assert_eq!(config.mail.port, 587);
        assert!(config.mail.use_tls);
        assert!(!config.mail.use_ssl);
        assert_eq!(config.mail.default_sender, "noreply@studyos.app");
        assert_eq!(config.bcrypt_rounds, 12);
        assert_eq!(config.rate_limit_max_clients, 10_000);
        assert!(!config.trust_proxy_headers);
        assert_eq!(config.login_lockout(), Duration::from_secs(15 * 60));
    }

    #[test]
    fn testing_profile_uses_fixed_secret() {
        let config = load(&[("FLASK_ENV", "testing"), ("GEMINI_API_KEY", "g")]).unwrap();
        assert_eq!(config.secret_key, TESTING_SECRET_KEY);
        assert!(config.debug);
        assert!(!config.session_cookie_secure);
        assert_eq!(config.log_level, "INFO");
    }

    #[test]
    fn development_profile_and_overrides() {
        let config = load(&[
            ("FLASK_ENV", "development"),
            ("SECRET_KEY", "s"),
            ("GEMINI_API_KEY", "g"),
            ("SESSION_COOKIE_SECURE", "True"),
            ("CACHE_DIR", "/tmp/studyos"),
            ("RATE_LIMIT_DEFAULT", "20/minute"),
            ("MAIL_PORT", "2525"),
            ("TRUST_PROXY_HEADERS", "true"),
            ("RATE_LIMIT_MAX_CLIENTS", "500"),
        ])
        .unwrap();
        assert!(config.trust_proxy_headers);
        assert_eq!(config.rate_limit_max_clients, 500);
        assert!(config.debug);
        assert!(config.session_cookie_secure);
        assert_eq!(config.log_level, "DEBUG");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/studyos"));
        assert_eq!(config.rate_limit_default, RateSpec::new(20, Duration::from_secs(60)));
        assert_eq!(config.mail.port, 2525);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = load(&[
            ("SECRET_KEY", "s"),
            ("GEMINI_API_KEY", "g"),
            ("MAIL_PORT", "smtp"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "MAIL_PORT", .. }));

        let err = load(&[
            ("SECRET_KEY", "s"),
            ("GEMINI_API_KEY", "g"),
            ("RATE_LIMIT_LOGIN", "lots"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRate(_)));

        let err = load(&[
            ("SECRET_KEY", "s"),
            ("GEMINI_API_KEY", "g"),
            ("RATE_LIMIT_MAX_CLIENTS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RATE_LIMIT_MAX_CLIENTS", .. }));
    }

    #[test]
    fn rate_spec_parsing() {
        assert_eq!("3 per hour".parse::<RateSpec>().unwrap().count, 3);
        assert_eq!(
            "10 per seconds".parse::<RateSpec>().unwrap().window,
            Duration::from_secs(1)
        );
        assert_eq!(
            "1 per Day".parse::<RateSpec>().unwrap().window,
            Duration::from_secs(86_400)
        );
        assert!("per hour".parse::<RateSpec>().is_err());
        assert!("5 every hour".parse::<RateSpec>().is_err());
        assert!("5 per fortnight".parse::<RateSpec>().is_err());
        assert_eq!(RateSpec::new(5, Duration::from_secs(60)).to_string(), "5 per minute");
    }
}
