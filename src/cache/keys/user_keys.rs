/// 用户数据缓存键前缀
const USER_PREFIX: &str = "user:";

/// 生成用户数据缓存键
pub fn user_cache_key(uid: &str) -> String {
    format!("{}{}", USER_PREFIX, uid)
}
