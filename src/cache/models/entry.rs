use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// 磁盘缓存条目，每个条目对应缓存目录中的一个文件
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub value: Value,
    pub expires_at: Option<i64>, // Unix timestamp (ms)
}

impl CacheEntry {
    pub fn new(key: &str, value: Value, ttl: Duration) -> Self {
        let expires_at = Utc::now().timestamp_millis() + ttl.as_millis() as i64;
        Self {
            key: key.to_string(),
            value,
            expires_at: Some(expires_at),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp_millis())
    }

    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => now_millis >= expires_at,
            None => false,
        }
    }
}
