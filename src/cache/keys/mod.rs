/// 缓存键模块
/// 提供各种缓存键生成函数

// 用户相关缓存键
pub mod user_keys;

// 学习数据缓存键
pub mod study_keys;

use serde_json::Value;
use sha2::{Digest, Sha256};

pub use study_keys::{CATALOG_CAREERS_KEY, chapters_cache_key, syllabus_cache_key};
pub use user_keys::user_cache_key;

/// 根据参数生成稳定的缓存键
///
/// serde_json 的对象按键排序，同样的参数总能得到同样的摘要。
pub fn generate_key(parts: &Value) -> String {
    let canonical = parts.to_string();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}
