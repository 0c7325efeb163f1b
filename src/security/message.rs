use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::html::sanitize_html;

/// 富文本允许保留的标签
pub const ALLOWED_TAGS: &[&str] = &["p", "br", "strong", "em", "u", "code", "pre"];
/// 所有标签上允许保留的属性
pub const ALLOWED_ATTRIBUTES: &[&str] = &["class"];

pub const REDACTION_WARNING: &str =
    "Message contains potentially sensitive information that has been redacted";
pub const SENSITIVE_REJECTION: &str = "Message contains sensitive information and cannot be sent";

// 敏感信息匹配规则，按顺序执行
static PROHIBITED_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b")
                .expect("card pattern is valid"),
            "[REDACTED-CARD]",
        ),
        (
            Regex::new(r"(?i)\b\d{3}-?\d{2}-?\d{4}\b").expect("ssn pattern is valid"),
            "[REDACTED-SSN]",
        ),
    ]
});

static MENTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([\w._-]+)").expect("mention pattern is valid"));

static HASHTAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("hashtag pattern is valid"));

/// 命中敏感信息后的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedactionPolicy {
    /// 替换为占位符并给出警告，消息仍然有效
    #[default]
    Redact,
    /// 直接拒绝消息
    Reject,
}

#[derive(Debug, Clone)]
pub struct MessagePolicy {
    pub max_message_length: usize,
    pub max_mentions: usize,
    pub max_hashtags: usize,
    pub redaction: RedactionPolicy,
}

impl Default for MessagePolicy {
    fn default() -> Self {
        Self {
            max_message_length: 4000,
            max_mentions: 10,
            max_hashtags: 5,
            redaction: RedactionPolicy::Redact,
        }
    }
}

/// 单条消息的校验结果
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MessageValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub sanitized_content: String,
}

impl MessageValidation {
    fn rejected(content: &str, error: String) -> Self {
        Self {
            is_valid: false,
            errors: vec![error],
            warnings: Vec::new(),
            sanitized_content: content.to_string(),
        }
    }
}

/// 聊天消息校验与清洗
#[derive(Debug, Clone, Default)]
pub struct MessageSecurityValidator {
    policy: MessagePolicy,
}

impl MessageSecurityValidator {
    pub fn new(policy: MessagePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MessagePolicy {
        &self.policy
    }

    /// 校验顺序：长度、空消息、敏感信息脱敏、提及与话题数量、HTML 清洗。
    /// 脱敏必须在 HTML 清洗之前。
    pub fn validate_message_content(&self, content: &str, sender_uid: &str) -> MessageValidation {
        let max_len = self.policy.max_message_length;
        if content.chars().count() > max_len {
            tracing::debug!(sender_uid, "Message rejected: too long");
            return MessageValidation::rejected(
                content,
                format!("Message exceeds maximum length of {} characters", max_len),
            );
        }

        if content.trim().is_empty() {
            return MessageValidation::rejected(content, "Message cannot be empty".to_string());
        }

        let mut warnings = Vec::new();
        let mut text = content.to_string();
        for (pattern, replacement) in PROHIBITED_PATTERNS.iter() {
            if !pattern.is_match(&text) {
                continue;
            }
            if self.policy.redaction == RedactionPolicy::Reject {
                tracing::info!(sender_uid, "Message rejected: sensitive information");
                return MessageValidation::rejected(content, SENSITIVE_REJECTION.to_string());
            }
            warnings.push(REDACTION_WARNING.to_string());
            text = pattern.replace_all(&text, *replacement).into_owned();
        }

        let mentions = MENTION_PATTERN.captures_iter(&text).count();
        if mentions > self.policy.max_mentions {
            warnings.push(format!(
                "Too many mentions ({}). Maximum allowed: {}",
                mentions, self.policy.max_mentions
            ));
        }

        let hashtags = HASHTAG_PATTERN.captures_iter(&text).count();
        if hashtags > self.policy.max_hashtags {
            warnings.push(format!(
                "Too many hashtags ({}). Maximum allowed: {}",
                hashtags, self.policy.max_hashtags
            ));
        }

        if !warnings.is_empty() {
            tracing::debug!(sender_uid, warnings = warnings.len(), "Message accepted with warnings");
        }

        MessageValidation {
            is_valid: true,
            errors: Vec::new(),
            warnings,
            sanitized_content: sanitize_html(&text, ALLOWED_TAGS, ALLOWED_ATTRIBUTES),
        }
    }

    pub fn extract_mentions(&self, content: &str) -> Vec<String> {
        capture_all(&MENTION_PATTERN, content)
    }

    pub fn extract_hashtags(&self, content: &str) -> Vec<String> {
        capture_all(&HASHTAG_PATTERN, content)
    }
}

fn capture_all(pattern: &Regex, content: &str) -> Vec<String> {
    pattern
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> MessageSecurityValidator {
        MessageSecurityValidator::default()
    }

    #[test]
    fn rejects_overlong_messages() {
        let content = "a".repeat(4001);
        let result = validator().validate_message_content(&content, "u1");
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec!["Message exceeds maximum length of 4000 characters"]
        );
        assert_eq!(result.sanitized_content, content);

        // 按字符计数而不是字节
        let multibyte = "é".repeat(4000);
        assert!(validator().validate_message_content(&multibyte, "u1").is_valid);
    }

    #[test]
    fn rejects_blank_messages() {
        for content in ["", "   ", "\n\t"] {
            let result = validator().validate_message_content(content, "u1");
            assert!(!result.is_valid);
            assert_eq!(result.errors, vec!["Message cannot be empty"]);
        }
    }

    #[test]
    fn clean_text_passes_unchanged() {
        let content = "Anyone up for revising thermodynamics tonight? @ravi #physics";
        let result = validator().validate_message_content(content, "u1");
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.sanitized_content, content);
    }

    #[test]
    fn redacts_card_numbers() {
        let result =
            validator().validate_message_content("my card is 4111 1111 1111 1111 ok", "u1");
        assert!(result.is_valid);
        assert_eq!(result.sanitized_content, "my card is [REDACTED-CARD] ok");
        assert_eq!(result.warnings, vec![REDACTION_WARNING]);

        let result = validator().validate_message_content("4111-1111-1111-1111", "u1");
        assert_eq!(result.sanitized_content, "[REDACTED-CARD]");
    }

    #[test]
    fn redacts_ssn_like_numbers() {
        let result = validator().validate_message_content("ssn 123-45-6789", "u1");
        assert!(result.is_valid);
        assert_eq!(result.sanitized_content, "ssn [REDACTED-SSN]");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn reject_policy_blocks_sensitive_messages() {
        let validator = MessageSecurityValidator::new(MessagePolicy {
            redaction: RedactionPolicy::Reject,
            ..MessagePolicy::default()
        });
        let result = validator.validate_message_content("card 4111111111111111", "u1");
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec![SENSITIVE_REJECTION]);
        assert_eq!(result.sanitized_content, "card 4111111111111111");
    }

    #[test]
    fn warns_on_too_many_mentions_and_hashtags() {
        let mentions: Vec<String> = (0..11).map(|i| format!("@user{}", i)).collect();
        let result = validator().validate_message_content(&mentions.join(" "), "u1");
        assert!(result.is_valid);
        assert_eq!(result.warnings, vec!["Too many mentions (11). Maximum allowed: 10"]);

        let result =
            validator().validate_message_content("#a #b #c #d #e #f", "u1");
        assert!(result.is_valid);
        assert_eq!(result.warnings, vec!["Too many hashtags (6). Maximum allowed: 5"]);
    }

    #[test]
    fn sanitizes_html_after_redaction() {
        let result = validator().validate_message_content(
            "<p class=\"hint\" onclick=\"x()\">call <script>steal()</script>123-45-6789</p>",
            "u1",
        );
        assert!(result.is_valid);
        assert_eq!(
            result.sanitized_content,
            "<p class=\"hint\">call steal()[REDACTED-SSN]</p>"
        );
    }

    #[test]
    fn extracts_mentions_and_hashtags() {
        let v = validator();
        assert_eq!(
            v.extract_mentions("hi @asha.k and @dev_team-1!"),
            vec!["asha.k", "dev_team-1"]
        );
        assert_eq!(v.extract_hashtags("#jee2025 prep #maths"), vec!["jee2025", "maths"]);
        assert!(v.extract_mentions("no mentions").is_empty());
    }
}
