/// 缓存操作
/// 提供缓存读写的功能实现

// 磁盘缓存操作
pub mod disk;

pub use disk::DiskCache;
