use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::rate_limit::ActivityWindow;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);

/// 聊天室内需要限流的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    SendMessage,
    UploadFile,
    AddReaction,
    JoinBubble,
}

impl ChatAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatAction::SendMessage => "send_message",
            ChatAction::UploadFile => "upload_file",
            ChatAction::AddReaction => "add_reaction",
            ChatAction::JoinBubble => "join_bubble",
        }
    }
}

impl FromStr for ChatAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "send_message" => Ok(ChatAction::SendMessage),
            "upload_file" => Ok(ChatAction::UploadFile),
            "add_reaction" => Ok(ChatAction::AddReaction),
            "join_bubble" => Ok(ChatAction::JoinBubble),
            other => Err(format!("unknown chat action: {}", other)),
        }
    }
}

/// 单个用户的限额
#[derive(Debug, Clone)]
pub struct UserLimits {
    pub messages_per_minute: usize,
    pub messages_per_hour: usize,
    pub files_per_hour: usize,
    pub reactions_per_minute: usize,
}

impl Default for UserLimits {
    fn default() -> Self {
        Self {
            messages_per_minute: 10,
            messages_per_hour: 100,
            files_per_hour: 20,
            reactions_per_minute: 30,
        }
    }
}

/// 单个聊天室的限额
#[derive(Debug, Clone)]
pub struct BubbleLimits {
    pub messages_per_minute: usize,
    pub new_members_per_hour: usize,
}

impl Default for BubbleLimits {
    fn default() -> Self {
        Self {
            messages_per_minute: 50,
            new_members_per_hour: 10,
        }
    }
}

/// 被限流的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitReason {
    MessagesPerMinute,
    MessagesPerHour,
    BubbleMessages,
    FilesPerHour,
    ReactionsPerMinute,
    BubbleNewMembers,
}

impl fmt::Display for LimitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LimitReason::MessagesPerMinute => "Rate limit exceeded: Too many messages per minute",
            LimitReason::MessagesPerHour => "Rate limit exceeded: Too many messages per hour",
            LimitReason::BubbleMessages => "Bubble rate limit exceeded",
            LimitReason::FilesPerHour => "Rate limit exceeded: Too many file uploads per hour",
            LimitReason::ReactionsPerMinute => "Rate limit exceeded: Too many reactions per minute",
            LimitReason::BubbleNewMembers => {
                "Bubble rate limit exceeded: Too many new members per hour"
            }
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed,
    Limited(LimitReason),
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed)
    }
}

impl fmt::Display for RateLimitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitResult::Allowed => f.write_str("Allowed"),
            RateLimitResult::Limited(reason) => fmt::Display::fmt(reason, f),
        }
    }
}

#[derive(Debug)]
struct UserActivity {
    messages: ActivityWindow,
    files: ActivityWindow,
    reactions: ActivityWindow,
}

impl UserActivity {
    fn new(limits: &UserLimits) -> Self {
        Self {
            messages: ActivityWindow::with_capacity(
                limits.messages_per_hour.max(limits.messages_per_minute),
            ),
            files: ActivityWindow::with_capacity(limits.files_per_hour),
            reactions: ActivityWindow::with_capacity(limits.reactions_per_minute),
        }
    }

    fn prune(&mut self, now: Instant) {
        self.messages.prune(now, HOUR);
        self.files.prune(now, HOUR);
        self.reactions.prune(now, HOUR);
    }

    fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.files.is_empty() && self.reactions.is_empty()
    }
}

#[derive(Debug)]
struct BubbleActivity {
    messages: ActivityWindow,
    members: ActivityWindow,
}

impl BubbleActivity {
    fn new(limits: &BubbleLimits) -> Self {
        Self {
            messages: ActivityWindow::with_capacity(limits.messages_per_minute),
            members: ActivityWindow::with_capacity(limits.new_members_per_hour),
        }
    }

    fn prune(&mut self, now: Instant) {
        self.messages.prune(now, HOUR);
        self.members.prune(now, HOUR);
    }

    fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.members.is_empty()
    }
}

#[derive(Debug, Default)]
struct Activity {
    users: HashMap<String, UserActivity>,
    bubbles: HashMap<String, BubbleActivity>,
}

/// 聊天室操作限流
///
/// 检查失败时不记录任何事件。
#[derive(Debug, Default)]
pub struct BubbleRateLimiter {
    user_limits: UserLimits,
    bubble_limits: BubbleLimits,
    activity: Mutex<Activity>,
}

impl BubbleRateLimiter {
    pub fn new(user_limits: UserLimits, bubble_limits: BubbleLimits) -> Self {
        Self {
            user_limits,
            bubble_limits,
            activity: Mutex::new(Activity::default()),
        }
    }

    pub fn check(&self, uid: &str, action: ChatAction, bubble_id: Option<&str>) -> RateLimitResult {
        self.check_at(uid, action, bubble_id, Instant::now())
    }

    pub fn check_at(
        &self,
        uid: &str,
        action: ChatAction,
        bubble_id: Option<&str>,
        now: Instant,
    ) -> RateLimitResult {
        let mut guard = self.activity.lock();
        let Activity { users, bubbles } = &mut *guard;
        let user_limits = &self.user_limits;
        let bubble_limits = &self.bubble_limits;

        let result = match action {
            ChatAction::SendMessage => {
                let user = users
                    .entry(uid.to_string())
                    .or_insert_with(|| UserActivity::new(user_limits));
                user.prune(now);
                if user.messages.count_within(now, MINUTE) >= user_limits.messages_per_minute {
                    RateLimitResult::Limited(LimitReason::MessagesPerMinute)
                } else if user.messages.count_within(now, HOUR) >= user_limits.messages_per_hour {
                    RateLimitResult::Limited(LimitReason::MessagesPerHour)
                } else {
                    match bubble_id {
                        Some(bubble_id) => {
                            let bubble = bubbles
                                .entry(bubble_id.to_string())
                                .or_insert_with(|| BubbleActivity::new(bubble_limits));
                            bubble.prune(now);
                            if bubble.messages.count_within(now, MINUTE)
                                >= bubble_limits.messages_per_minute
                            {
                                RateLimitResult::Limited(LimitReason::BubbleMessages)
                            } else {
                                bubble.messages.record(now, HOUR);
                                user.messages.record(now, HOUR);
                                RateLimitResult::Allowed
                            }
                        }
                        None => {
                            user.messages.record(now, HOUR);
                            RateLimitResult::Allowed
                        }
                    }
                }
            }
            ChatAction::UploadFile => {
                let user = users
                    .entry(uid.to_string())
                    .or_insert_with(|| UserActivity::new(user_limits));
                user.prune(now);
                if user.files.count_within(now, HOUR) >= user_limits.files_per_hour {
                    RateLimitResult::Limited(LimitReason::FilesPerHour)
                } else {
                    user.files.record(now, HOUR);
                    RateLimitResult::Allowed
                }
            }
            ChatAction::AddReaction => {
                let user = users
                    .entry(uid.to_string())
                    .or_insert_with(|| UserActivity::new(user_limits));
                user.prune(now);
                if user.reactions.count_within(now, MINUTE) >= user_limits.reactions_per_minute {
                    RateLimitResult::Limited(LimitReason::ReactionsPerMinute)
                } else {
                    user.reactions.record(now, HOUR);
                    RateLimitResult::Allowed
                }
            }
            // 加入操作只受聊天室限额约束
            ChatAction::JoinBubble => match bubble_id {
                Some(bubble_id) => {
                    let bubble = bubbles
                        .entry(bubble_id.to_string())
                        .or_insert_with(|| BubbleActivity::new(bubble_limits));
                    bubble.prune(now);
                    if bubble.members.count_within(now, HOUR) >= bubble_limits.new_members_per_hour
                    {
                        RateLimitResult::Limited(LimitReason::BubbleNewMembers)
                    } else {
                        bubble.members.record(now, HOUR);
                        RateLimitResult::Allowed
                    }
                }
                None => RateLimitResult::Allowed,
            },
        };

        if let RateLimitResult::Limited(reason) = result {
            tracing::info!(
                uid,
                action = action.as_str(),
                bubble_id = bubble_id.unwrap_or_default(),
                reason = %reason,
                "Chat action rate limited"
            );
        }
        result
    }

    /// 删除一小时以前的记录以及已经没有记录的用户和聊天室
    pub fn cleanup_old_activities(&self) {
        self.cleanup_at(Instant::now());
    }

    pub fn cleanup_at(&self, now: Instant) {
        let mut guard = self.activity.lock();
        guard.users.retain(|_, user| {
            user.prune(now);
            !user.is_empty()
        });
        guard.bubbles.retain(|_, bubble| {
            bubble.prune(now);
            !bubble.is_empty()
        });
        tracing::debug!(
            users = guard.users.len(),
            bubbles = guard.bubbles.len(),
            "Bubble activity cleaned up"
        );
    }

    pub fn tracked_users(&self) -> usize {
        self.activity.lock().users.len()
    }

    pub fn tracked_bubbles(&self) -> usize {
        self.activity.lock().bubbles.len()
    }
}
