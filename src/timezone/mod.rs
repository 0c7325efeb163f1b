//! 用户时区换算
//!
//! 所有时间在存储层都以 UTC 保存，只在展示给用户时换算到本地时区。

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use thiserror::Error;

/// 未设置时区的用户默认使用印度标准时间
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("unrecognised timestamp: {0}")]
    Unrecognised(String),
    #[error("invalid format string: {0}")]
    Format(String),
}

/// 待换算的 UTC 时间，可以是字符串也可以是已解析的时间
#[derive(Debug, Clone, Copy)]
pub enum UtcInput<'a> {
    Text(&'a str),
    Instant(DateTime<Utc>),
}

impl<'a> From<&'a str> for UtcInput<'a> {
    fn from(value: &'a str) -> Self {
        UtcInput::Text(value)
    }
}

impl From<DateTime<Utc>> for UtcInput<'_> {
    fn from(value: DateTime<Utc>) -> Self {
        UtcInput::Instant(value)
    }
}

impl UtcInput<'_> {
    fn resolve(self) -> Result<DateTime<Utc>, TimeParseError> {
        match self {
            UtcInput::Instant(dt) => Ok(dt),
            UtcInput::Text(text) => parse_utc(text),
        }
    }
}

/// 解析 ISO 8601 时间；不带时区的一律视为 UTC
pub fn parse_utc(text: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    Err(TimeParseError::Unrecognised(text.to_string()))
}

pub struct TimezoneManager;

impl TimezoneManager {
    pub fn utc_now() -> DateTime<Utc> {
        Utc::now()
    }

    pub fn utc_now_iso() -> String {
        Utc::now().to_rfc3339()
    }

    /// 暂时无法从客户端探测，直接返回默认时区
    pub fn detect_user_timezone() -> &'static str {
        DEFAULT_TIMEZONE
    }

    /// 读取用户资料中的 timezone 字段
    pub fn user_timezone(profile: &Value) -> String {
        profile
            .get("timezone")
            .and_then(Value::as_str)
            .filter(|tz| !tz.is_empty())
            .unwrap_or(DEFAULT_TIMEZONE)
            .to_string()
    }

    /// 换算到用户时区；未知时区回退到 UTC
    pub fn utc_to_user_timezone<'a>(
        input: impl Into<UtcInput<'a>>,
        user_timezone: &str,
    ) -> Result<DateTime<Tz>, TimeParseError> {
        let utc = input.into().resolve()?;
        let tz = user_timezone.parse::<Tz>().unwrap_or_else(|_| {
            tracing::debug!(timezone = user_timezone, "Unknown timezone, falling back to UTC");
            Tz::UTC
        });
        Ok(utc.with_timezone(&tz))
    }

    pub fn format_for_display<'a>(
        input: impl Into<UtcInput<'a>>,
        user_timezone: &str,
        format: &str,
    ) -> Result<String, TimeParseError> {
        let local = Self::utc_to_user_timezone(input, user_timezone)?;
        let mut out = String::new();
        write!(out, "{}", local.format(format))
            .map_err(|_| TimeParseError::Format(format.to_string()))?;
        Ok(out)
    }

    pub fn current_user_time(user_timezone: &str) -> DateTime<Tz> {
        let tz = user_timezone.parse::<Tz>().unwrap_or(Tz::UTC);
        Utc::now().with_timezone(&tz)
    }

    pub fn current_user_time_iso(user_timezone: &str) -> String {
        Self::current_user_time(user_timezone).to_rfc3339()
    }
}

/// 按用户资料中的时区格式化 UTC 时间戳
pub fn format_timestamp_for_user(utc_timestamp: &str, profile: &Value) -> Result<String, TimeParseError> {
    let tz = TimezoneManager::user_timezone(profile);
    TimezoneManager::format_for_display(utc_timestamp, &tz, DISPLAY_FORMAT)
}

pub fn current_time_for_user(profile: &Value) -> String {
    TimezoneManager::current_user_time_iso(&TimezoneManager::user_timezone(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, TimeZone};
    use serde_json::json;

    #[test]
    fn parses_common_iso_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 1, 10, 30, 0).unwrap();
        assert_eq!(parse_utc("2025-01-01T10:30:00Z").unwrap(), expected);
        assert_eq!(parse_utc("2025-01-01T16:00:00+05:30").unwrap(), expected);
        assert_eq!(parse_utc("2025-01-01T10:30:00").unwrap(), expected);
        assert_eq!(parse_utc("2025-01-01 10:30:00.000000").unwrap(), expected);
        assert_eq!(
            parse_utc("2025-01-01").unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(matches!(
            parse_utc("yesterday"),
            Err(TimeParseError::Unrecognised(_))
        ));
    }

    #[test]
    fn converts_to_user_timezone() {
        let local =
            TimezoneManager::utc_to_user_timezone("2025-01-01T10:30:00Z", "Asia/Kolkata").unwrap();
        assert_eq!(local.offset().fix().local_minus_utc(), 5 * 3600 + 30 * 60);
        assert_eq!(local.format("%H:%M").to_string(), "16:00");
    }

    #[test]
    fn unknown_timezone_falls_back_to_utc() {
        let instant = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let local = TimezoneManager::utc_to_user_timezone(instant, "Mars/Olympus").unwrap();
        assert_eq!(local.timezone(), Tz::UTC);
        assert_eq!(local.with_timezone(&Utc), instant);
    }

    #[test]
    fn formats_for_display() {
        let shown = TimezoneManager::format_for_display(
            "2025-03-10T23:45:00Z",
            "America/New_York",
            DISPLAY_FORMAT,
        )
        .unwrap();
        assert_eq!(shown, "2025-03-10 19:45:00");
    }

    #[test]
    fn profile_timezone_defaults_to_ist() {
        assert_eq!(TimezoneManager::user_timezone(&json!({})), DEFAULT_TIMEZONE);
        assert_eq!(
            TimezoneManager::user_timezone(&json!({"timezone": "Europe/London"})),
            "Europe/London"
        );
        assert_eq!(
            format_timestamp_for_user("2025-01-01T00:00:00Z", &json!({"name": "Asha"})).unwrap(),
            "2025-01-01 05:30:00"
        );
        assert_eq!(TimezoneManager::detect_user_timezone(), "Asia/Kolkata");
    }

    #[test]
    fn current_time_carries_offset() {
        let now = current_time_for_user(&json!({"timezone": "Asia/Kolkata"}));
        assert!(now.ends_with("+05:30"));
    }
}
