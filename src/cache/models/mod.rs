/// 缓存数据模型
pub mod entry;

pub use entry::CacheEntry;
