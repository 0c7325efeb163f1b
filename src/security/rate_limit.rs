use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::Config;

/// 滑动窗口内的事件时间序列
///
/// 容量固定为对应限额的上限，超出容量时丢弃最早的事件；
/// 每次写入时清理超出保留时长的事件。
#[derive(Debug, Clone)]
pub struct ActivityWindow {
    events: VecDeque<Instant>,
    capacity: usize,
}

impl ActivityWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(128)),
            capacity: capacity.max(1),
        }
    }

    /// 删除早于 now - retention 的事件
    pub fn prune(&mut self, now: Instant, retention: Duration) {
        while let Some(&oldest) = self.events.front() {
            if now.saturating_duration_since(oldest) >= retention {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }

    /// 统计窗口内（严格晚于 now - window）的事件数
    pub fn count_within(&self, now: Instant, window: Duration) -> usize {
        self.events
            .iter()
            .rev()
            .take_while(|&&t| now.saturating_duration_since(t) < window)
            .count()
    }

    pub fn record(&mut self, now: Instant, retention: Duration) {
        self.prune(now, retention);
        if self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(now);
    }

    /// 最近一次事件的时间
    pub fn last(&self) -> Option<Instant> {
        self.events.back().copied()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// 每个标识最多保留的事件数
pub const MAX_EVENTS_PER_IDENTIFIER: usize = 1024;
/// 事件的最短保留时长，调用方可以在此范围内传入比构造时更长的窗口
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(3600);
/// 同时跟踪的标识上限，超出后淘汰最久没有活动的标识
pub const DEFAULT_MAX_TRACKED: usize = 10_000;

/// 内存限流器，用于登录尝试和按 IP 的请求限流
///
/// 状态只存在于当前进程，重启后丢失。
#[derive(Debug)]
pub struct RateLimiter {
    attempts: Mutex<HashMap<String, ActivityWindow>>,
    max_attempts: usize,
    window: Duration,
    retention: Duration,
    max_tracked: usize,
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            attempts: Mutex::new(HashMap::new()),
            max_attempts,
            window,
            retention: window.max(DEFAULT_RETENTION),
            max_tracked: DEFAULT_MAX_TRACKED,
        }
    }

    /// 登录限流：默认 15 分钟内最多 5 次
    pub fn for_login(config: &Config) -> Self {
        Self::new(config.max_login_attempts, config.login_lockout())
    }

    /// 事件保留时长，不会短于构造时的窗口
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention.max(self.window);
        self
    }

    pub fn with_max_tracked(mut self, max_tracked: usize) -> Self {
        self.max_tracked = max_tracked.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn is_allowed(&self, identifier: &str) -> bool {
        self.is_allowed_with(identifier, self.max_attempts, self.window)
    }

    /// 按调用方给出的上限和窗口判断；窗口超过 retention 时只统计 retention 内的尝试
    pub fn is_allowed_with(&self, identifier: &str, max_attempts: usize, window: Duration) -> bool {
        self.is_allowed_at(identifier, max_attempts, window, Instant::now())
    }

    pub fn is_allowed_at(
        &self,
        identifier: &str,
        max_attempts: usize,
        window: Duration,
        now: Instant,
    ) -> bool {
        let mut attempts = self.attempts.lock();
        match attempts.get_mut(identifier) {
            Some(log) => {
                log.prune(now, self.retention);
                log.count_within(now, window) < max_attempts
            }
            None => max_attempts > 0,
        }
    }

    pub fn record_attempt(&self, identifier: &str) {
        self.record_attempt_at(identifier, Instant::now());
    }

    pub fn record_attempt_at(&self, identifier: &str, now: Instant) {
        let mut attempts = self.attempts.lock();
        self.make_room(&mut attempts, identifier, now);
        attempts
            .entry(identifier.to_string())
            .or_insert_with(|| ActivityWindow::with_capacity(MAX_EVENTS_PER_IDENTIFIER))
            .record(now, self.retention);
    }

    pub fn reset_attempts(&self, identifier: &str) {
        self.attempts.lock().remove(identifier);
    }

    /// 检查并记录在同一次加锁内完成，供请求限流中间件使用
    pub fn try_acquire(&self, identifier: &str) -> bool {
        self.try_acquire_at(identifier, Instant::now())
    }

    pub fn try_acquire_at(&self, identifier: &str, now: Instant) -> bool {
        let mut attempts = self.attempts.lock();
        self.make_room(&mut attempts, identifier, now);
        let log = attempts
            .entry(identifier.to_string())
            .or_insert_with(|| ActivityWindow::with_capacity(MAX_EVENTS_PER_IDENTIFIER));
        log.prune(now, self.retention);
        if log.count_within(now, self.window) >= self.max_attempts {
            return false;
        }
        log.record(now, self.retention);
        true
    }

    /// 新标识写入前保证数量不超过 max_tracked：先清理过期条目，仍然满了就淘汰最久未活动的
    fn make_room(
        &self,
        attempts: &mut HashMap<String, ActivityWindow>,
        identifier: &str,
        now: Instant,
    ) {
        if attempts.len() < self.max_tracked || attempts.contains_key(identifier) {
            return;
        }
        attempts.retain(|_, log| {
            log.prune(now, self.retention);
            !log.is_empty()
        });
        while attempts.len() >= self.max_tracked {
            let oldest = attempts
                .iter()
                .min_by_key(|(_, log)| log.last())
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    attempts.remove(&key);
                }
                None => break,
            }
        }
    }

    /// 清理保留时长外的记录并删除空条目
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now())
    }

    pub fn cleanup_at(&self, now: Instant) -> usize {
        let mut attempts = self.attempts.lock();
        attempts.retain(|_, log| {
            log.prune(now, self.retention);
            !log.is_empty()
        });
        attempts.len()
    }

    pub fn tracked(&self) -> usize {
        self.attempts.lock().len()
    }
}
