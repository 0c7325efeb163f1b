// 缓存模块
// 磁盘缓存的数据结构、键生成和读写操作

pub mod keys;
pub mod models;
pub mod operations;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

// 重新导出常用类型和函数，方便其他模块使用
pub use keys::{
    CATALOG_CAREERS_KEY, chapters_cache_key, generate_key, syllabus_cache_key, user_cache_key,
};
pub use models::CacheEntry;
pub use operations::DiskCache;
