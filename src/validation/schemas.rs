use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{Field, Schema};
use crate::security::PasswordManager;

const PURPOSES: &[&str] = &["high_school", "exam_prep", "after_tenth"];
const PRIORITIES: &[&str] = &["low", "medium", "high"];

/// 注册时的密码强度检查；长度由 length 规则负责
fn password_strength(value: &Value) -> Result<(), String> {
    let password = value.as_str().unwrap_or_default();
    PasswordManager::is_strong_password(password).map_err(|rule| rule.to_string())
}

fn phone_digits(value: &Value) -> Result<(), String> {
    let phone = value.as_str().unwrap_or_default();
    if phone.is_empty() {
        return Ok(());
    }
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if (10..=15).contains(&digits) {
        Ok(())
    } else {
        Err("Phone number must have 10-15 digits".to_string())
    }
}

pub static USER_REGISTRATION: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "user_registration",
        vec![
            Field::email("email").required_message("Email is required"),
            Field::string("password")
                .required()
                .length(Some(8), Some(128))
                .validates(password_strength),
            Field::string("name").required().length(Some(2), Some(100)),
            Field::string("purpose").required().one_of(PURPOSES),
            Field::string("institution_id").allow_none(),
        ],
    )
});

pub static USER_LOGIN: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "user_login",
        vec![
            Field::email("email").required(),
            Field::string("password").required().length(Some(1), None),
        ],
    )
});

pub static CHAPTER_PROGRESS: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "chapter_progress",
        vec![
            Field::string("subject").required().length(Some(1), Some(100)),
            Field::string("chapter").required().length(Some(1), Some(200)),
            Field::boolean("completed").required(),
        ],
    )
});

pub static GOAL: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "goal",
        vec![
            Field::string("title").required().length(Some(1), Some(200)),
            Field::string("description").length(None, Some(1000)),
            Field::date("target_date").required(),
            Field::string("priority").one_of(PRIORITIES),
        ],
    )
});

pub static TASK: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "task",
        vec![
            Field::string("title").required().length(Some(1), Some(200)),
            Field::string("description").length(None, Some(1000)),
            Field::date("due_date").allow_none(),
            Field::string("priority").one_of(PRIORITIES),
            Field::string("subject").length(None, Some(100)),
        ],
    )
});

pub static STUDY_SESSION: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "study_session",
        vec![
            Field::string("subject").required(),
            Field::integer("duration_minutes")
                .required()
                .range(Some(1.0), Some(480.0)),
            Field::string("notes").length(None, Some(500)),
        ],
    )
});

pub static TEST_RESULT: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "test_result",
        vec![
            Field::string("test_name").required().length(Some(1), Some(100)),
            Field::string("subject").required(),
            Field::float("score").required().range(Some(0.0), Some(100.0)),
            Field::float("max_score").required().range(Some(1.0), None),
            Field::date("test_date").required(),
            Field::string("notes").length(None, Some(500)),
        ],
    )
});

pub static INSTITUTION_JOIN: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "institution_join",
        vec![Field::string("invite_code").required().length(Some(6), Some(20))],
    )
});

pub static BROADCAST_MESSAGE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "broadcast_message",
        vec![
            Field::string("message").required().length(Some(1), Some(1000)),
            Field::string("target_class").allow_none(),
        ],
    )
});

pub static PROFILE_EDIT: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "profile_edit",
        vec![
            Field::string("name").length(Some(2), Some(100)),
            Field::string("bio").length(None, Some(500)),
            Field::string("phone")
                .regexp(
                    Regex::new(r"^[\d\s\-+()]+$").expect("phone pattern is valid"),
                    "Invalid phone number",
                )
                .validates(phone_digits),
        ],
    )
});
