/// 课程大纲缓存键前缀
const SYLLABUS_PREFIX: &str = "syllabus:";

/// 章节进度缓存键前缀
const CHAPTERS_PREFIX: &str = "chapters:";

/// 职业目录列表缓存键
pub const CATALOG_CAREERS_KEY: &str = "catalog:careers";

/// 生成课程大纲缓存键
pub fn syllabus_cache_key(subject: &str, purpose: &str) -> String {
    format!("{}{}:{}", SYLLABUS_PREFIX, purpose, subject)
}

/// 生成用户章节缓存键
pub fn chapters_cache_key(uid: &str) -> String {
    format!("{}{}", CHAPTERS_PREFIX, uid)
}
