use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::cache::CacheError;
use crate::cache::models::CacheEntry;
use crate::config::Config;

const ENTRY_EXTENSION: &str = "json";

/// 磁盘缓存
///
/// 每个键保存为缓存目录下的一个 JSON 文件，文件名是键的 SHA-256 摘要。
/// 过期条目在读取或 purge_expired 时删除。写入失败只记录日志，
/// 缓存永远不是数据的唯一来源。
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    default_ttl: Duration,
}

impl DiskCache {
    pub fn open(dir: impl Into<PathBuf>, default_ttl: Duration) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, default_ttl })
    }

    pub fn from_config(config: &Config) -> Result<Self, CacheError> {
        Self::open(&config.cache_dir, config.cache_default_timeout())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(key.as_bytes()));
        self.dir.join(format!("{}.{}", digest, ENTRY_EXTENSION))
    }

    fn read_entry(path: &Path) -> Result<Option<CacheEntry>, CacheError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove_file(path: &Path) -> Result<(), CacheError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// 读取缓存，未命中、过期或损坏时返回 None
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.entry_path(key);
        let entry = match Self::read_entry(&path) {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read cache entry");
                return None;
            }
        };

        if entry.is_expired() {
            if let Err(e) = Self::remove_file(&path) {
                tracing::warn!(key, error = %e, "Failed to evict expired cache entry");
            }
            return None;
        }

        match serde_json::from_value(entry.value) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Cached value has unexpected shape");
                None
            }
        }
    }

    /// 写入缓存，ttl 为 None 或 0 时使用默认过期时间
    pub fn try_set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let ttl = ttl.filter(|t| !t.is_zero()).unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(key, serde_json::to_value(value)?, ttl);
        let bytes = serde_json::to_vec(&entry)?;

        // 先写临时文件再改名，读者不会看到写了一半的条目
        let path = self.entry_path(key);
        let tmp = self.dir.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        fs::write(&tmp, bytes)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool {
        match self.try_set(key, value, ttl) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to write cache entry");
                false
            }
        }
    }

    pub fn delete(&self, key: &str) -> bool {
        match Self::remove_file(&self.entry_path(key)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to delete cache entry");
                false
            }
        }
    }

    /// 删除所有条目，返回删除的数量
    pub fn clear(&self) -> Result<usize, CacheError> {
        self.remove_where(|_| true)
    }

    /// 删除键中包含 pattern 的所有条目
    pub fn invalidate(&self, pattern: &str) -> Result<usize, CacheError> {
        self.remove_where(|entry| entry.map(|e| e.key.contains(pattern)).unwrap_or(false))
    }

    /// 清理已过期的条目
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        self.remove_where(|entry| entry.map(CacheEntry::is_expired).unwrap_or(true))
    }

    fn remove_where<F>(&self, predicate: F) -> Result<usize, CacheError>
    where
        F: Fn(Option<&CacheEntry>) -> bool,
    {
        let mut removed = 0;
        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            // 无法解析的文件按 None 交给 predicate 处理
            let entry = Self::read_entry(&path).ok().flatten();
            if predicate(entry.as_ref()) {
                Self::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// 命中则返回缓存值，否则计算、写入并返回
    pub fn get_or_insert_with<T, F>(&self, key: &str, ttl: Option<Duration>, compute: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = compute();
        self.set(key, &value, ttl);
        value
    }
}
