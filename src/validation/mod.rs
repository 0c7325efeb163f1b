//! 请求数据校验
//!
//! 每个 Schema 由若干 Field 组成，`load` 返回清洗后的数据或按字段汇总的错误。
//! 错误信息与前端现有的提示文案保持一致。

pub mod schemas;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};

pub use schemas::{
    BROADCAST_MESSAGE, CHAPTER_PROGRESS, GOAL, INSTITUTION_JOIN, PROFILE_EDIT, STUDY_SESSION, TASK,
    TEST_RESULT, USER_LOGIN, USER_REGISTRATION,
};

/// 字段名到错误列表
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// 输入整体不是对象时使用的键
pub const SCHEMA_ERROR_KEY: &str = "_schema";

pub const MISSING_MESSAGE: &str = "Missing data for required field.";
pub const NULL_MESSAGE: &str = "Field may not be null.";
pub const UNKNOWN_FIELD_MESSAGE: &str = "Unknown field.";
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input type.";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern is valid")
});

/// 邮箱格式校验
pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Email,
    Boolean,
    Integer,
    Float,
    Date,
}

impl FieldKind {
    fn invalid_message(&self) -> &'static str {
        match self {
            FieldKind::String | FieldKind::Email => "Not a valid string.",
            FieldKind::Boolean => "Not a valid boolean.",
            FieldKind::Integer => "Not a valid integer.",
            FieldKind::Float => "Not a valid number.",
            FieldKind::Date => "Not a valid date.",
        }
    }

    /// 类型转换，失败时返回对应的错误信息
    fn deserialize(&self, value: &Value) -> Result<Value, String> {
        let invalid = || self.invalid_message().to_string();
        match self {
            FieldKind::String => value.as_str().map(Value::from).ok_or_else(invalid),
            FieldKind::Email => {
                let text = value.as_str().ok_or_else(invalid)?;
                if validate_email(text) {
                    Ok(Value::from(text))
                } else {
                    Err("Not a valid email address.".to_string())
                }
            }
            FieldKind::Boolean => parse_bool(value).map(Value::Bool).ok_or_else(invalid),
            FieldKind::Integer => parse_integer(value).map(Value::from).ok_or_else(invalid),
            FieldKind::Float => parse_float(value).map(Value::from).ok_or_else(invalid),
            FieldKind::Date => value
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
                .map(|d| Value::from(d.format("%Y-%m-%d").to_string()))
                .ok_or_else(invalid),
        }
    }
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 1.0 => Some(true),
            Some(v) if v == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// 自定义校验函数，只在字段没有其他错误时执行
pub type CustomValidator = fn(&Value) -> Result<(), String>;

#[derive(Debug)]
pub enum Rule {
    /// 字符数范围
    Length { min: Option<usize>, max: Option<usize> },
    /// 数值闭区间
    Range { min: Option<f64>, max: Option<f64> },
    OneOf(&'static [&'static str]),
    Regexp { pattern: Regex, error: &'static str },
}

impl Rule {
    fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Rule::Length { min, max } => {
                let len = value.as_str().map(|s| s.chars().count()).unwrap_or(0);
                let message = match (min, max) {
                    (Some(min), Some(max)) if len < *min || len > *max => {
                        format!("Length must be between {} and {}.", min, max)
                    }
                    (Some(min), None) if len < *min => {
                        format!("Shorter than minimum length {}.", min)
                    }
                    (None, Some(max)) if len > *max => {
                        format!("Longer than maximum length {}.", max)
                    }
                    _ => return Ok(()),
                };
                Err(message)
            }
            Rule::Range { min, max } => {
                let number = value.as_f64().unwrap_or(f64::NAN);
                let below = |m: &f64| !(number >= *m);
                let above = |m: &f64| !(number <= *m);
                // f64 的 Display 不带多余的 ".0"
                let message = match (min, max) {
                    (Some(min), Some(max)) if below(min) || above(max) => format!(
                        "Must be greater than or equal to {} and less than or equal to {}.",
                        min, max
                    ),
                    (Some(min), None) if below(min) => {
                        format!("Must be greater than or equal to {}.", min)
                    }
                    (None, Some(max)) if above(max) => {
                        format!("Must be less than or equal to {}.", max)
                    }
                    _ => return Ok(()),
                };
                Err(message)
            }
            Rule::OneOf(choices) => {
                if value.as_str().is_some_and(|s| choices.contains(&s)) {
                    Ok(())
                } else {
                    Err(format!("Must be one of: {}.", choices.join(", ")))
                }
            }
            Rule::Regexp { pattern, error } => {
                if value.as_str().is_some_and(|s| pattern.is_match(s)) {
                    Ok(())
                } else {
                    Err(error.to_string())
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub allow_none: bool,
    pub required_message: Option<&'static str>,
    pub rules: Vec<Rule>,
    pub custom: Vec<CustomValidator>,
}

impl Field {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            allow_none: false,
            required_message: None,
            rules: Vec::new(),
            custom: Vec::new(),
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn email(name: &'static str) -> Self {
        Self::new(name, FieldKind::Email)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn float(name: &'static str) -> Self {
        Self::new(name, FieldKind::Float)
    }

    pub fn date(name: &'static str) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// 自定义缺失字段的提示
    pub fn required_message(mut self, message: &'static str) -> Self {
        self.required = true;
        self.required_message = Some(message);
        self
    }

    pub fn allow_none(mut self) -> Self {
        self.allow_none = true;
        self
    }

    pub fn length(self, min: Option<usize>, max: Option<usize>) -> Self {
        self.rule(Rule::Length { min, max })
    }

    pub fn range(self, min: Option<f64>, max: Option<f64>) -> Self {
        self.rule(Rule::Range { min, max })
    }

    pub fn one_of(self, choices: &'static [&'static str]) -> Self {
        self.rule(Rule::OneOf(choices))
    }

    pub fn regexp(self, pattern: Regex, error: &'static str) -> Self {
        self.rule(Rule::Regexp { pattern, error })
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn validates(mut self, validator: CustomValidator) -> Self {
        self.custom.push(validator);
        self
    }

    /// 校验单个字段的值；成功返回转换后的值
    fn load(&self, value: &Value) -> Result<Value, Vec<String>> {
        if value.is_null() {
            return if self.allow_none {
                Ok(Value::Null)
            } else {
                Err(vec![NULL_MESSAGE.to_string()])
            };
        }

        let value = self.kind.deserialize(value).map_err(|e| vec![e])?;

        // 所有规则都执行，错误一并返回
        let errors: Vec<String> = self
            .rules
            .iter()
            .filter_map(|rule| rule.check(&value).err())
            .collect();
        if !errors.is_empty() {
            return Err(errors);
        }

        for validator in &self.custom {
            validator(&value).map_err(|e| vec![e])?;
        }
        Ok(value)
    }
}

#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: &'static str, fields: Vec<Field>) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// 校验输入对象，未知字段视为错误
    pub fn load(&self, data: &Value) -> Result<Map<String, Value>, FieldErrors> {
        let mut errors = FieldErrors::new();
        let Some(input) = data.as_object() else {
            errors.insert(
                SCHEMA_ERROR_KEY.to_string(),
                vec![INVALID_INPUT_MESSAGE.to_string()],
            );
            return Err(errors);
        };

        let mut output = Map::new();
        for field in &self.fields {
            match input.get(field.name) {
                None if field.required => {
                    let message = field.required_message.unwrap_or(MISSING_MESSAGE);
                    errors.insert(field.name.to_string(), vec![message.to_string()]);
                }
                None => {}
                Some(value) => match field.load(value) {
                    Ok(value) => {
                        output.insert(field.name.to_string(), value);
                    }
                    Err(field_errors) => {
                        errors.insert(field.name.to_string(), field_errors);
                    }
                },
            }
        }

        for key in input.keys() {
            if self.field(key).is_none() {
                errors.insert(key.clone(), vec![UNKNOWN_FIELD_MESSAGE.to_string()]);
            }
        }

        if errors.is_empty() {
            Ok(output)
        } else {
            tracing::debug!(schema = self.name, fields = errors.len(), "Schema validation failed");
            Err(errors)
        }
    }
}

/// 校验并返回 (是否通过, 数据或错误)
pub fn validate_schema(schema: &Schema, data: &Value) -> (bool, Value) {
    match schema.load(data) {
        Ok(result) => (true, Value::Object(result)),
        Err(errors) => {
            let errors = errors
                .into_iter()
                .map(|(field, messages)| (field, Value::from(messages)))
                .collect();
            (false, Value::Object(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Schema {
        Schema::new(
            "sample",
            vec![
                Field::string("title").required().length(Some(1), Some(5)),
                Field::integer("count").range(Some(1.0), Some(480.0)),
                Field::float("score").range(Some(0.5), None),
                Field::boolean("done"),
                Field::date("on").allow_none(),
                Field::string("level").one_of(&["low", "high"]),
            ],
        )
    }

    #[test]
    fn validates_email_format() {
        assert!(validate_email("asha@example.com"));
        assert!(validate_email("first.last+tag@sub.example.co"));
        assert!(!validate_email("asha@example"));
        assert!(!validate_email("not an email"));
        assert!(!validate_email("a@b.c"));
    }

    #[test]
    fn loads_and_converts_values() {
        let loaded = sample()
            .load(&json!({
                "title": "hi",
                "count": "12",
                "score": 3,
                "done": "yes",
                "on": null,
                "level": "low"
            }))
            .unwrap();
        assert_eq!(loaded["count"], json!(12));
        assert_eq!(loaded["score"], json!(3.0));
        assert_eq!(loaded["done"], json!(true));
        assert_eq!(loaded["on"], Value::Null);
    }

    #[test]
    fn reports_missing_unknown_and_type_errors() {
        let errors = sample()
            .load(&json!({"count": "many", "done": "maybe", "extra": 1}))
            .unwrap_err();
        assert_eq!(errors["title"], vec![MISSING_MESSAGE]);
        assert_eq!(errors["count"], vec!["Not a valid integer."]);
        assert_eq!(errors["done"], vec!["Not a valid boolean."]);
        assert_eq!(errors["extra"], vec![UNKNOWN_FIELD_MESSAGE]);
    }

    #[test]
    fn rule_messages() {
        let errors = sample()
            .load(&json!({"title": "too long", "count": 0, "score": 0.1, "level": "mid"}))
            .unwrap_err();
        assert_eq!(errors["title"], vec!["Length must be between 1 and 5."]);
        assert_eq!(
            errors["count"],
            vec!["Must be greater than or equal to 1 and less than or equal to 480."]
        );
        assert_eq!(errors["score"], vec!["Must be greater than or equal to 0.5."]);
        assert_eq!(errors["level"], vec!["Must be one of: low, high."]);
    }

    #[test]
    fn null_requires_allow_none() {
        let errors = sample().load(&json!({"title": null})).unwrap_err();
        assert_eq!(errors["title"], vec![NULL_MESSAGE]);
    }

    #[test]
    fn non_object_input() {
        let errors = sample().load(&json!(["title"])).unwrap_err();
        assert_eq!(errors[SCHEMA_ERROR_KEY], vec![INVALID_INPUT_MESSAGE]);
    }

    #[test]
    fn custom_validators_run_after_rules_pass() {
        fn no_x(value: &Value) -> Result<(), String> {
            match value.as_str() {
                Some(s) if s.contains('x') => Err("No x allowed".to_string()),
                _ => Ok(()),
            }
        }
        let schema = Schema::new(
            "custom",
            vec![Field::string("word").length(None, Some(3)).validates(no_x)],
        );

        let errors = schema.load(&json!({"word": "xx"})).unwrap_err();
        assert_eq!(errors["word"], vec!["No x allowed"]);

        // 长度不通过时不执行自定义校验
        let errors = schema.load(&json!({"word": "xxxx"})).unwrap_err();
        assert_eq!(errors["word"], vec!["Longer than maximum length 3."]);
    }

    #[test]
    fn validate_schema_returns_tuple() {
        let (ok, data) = validate_schema(&sample(), &json!({"title": "ok"}));
        assert!(ok);
        assert_eq!(data, json!({"title": "ok"}));

        let (ok, errors) = validate_schema(&sample(), &json!({}));
        assert!(!ok);
        assert_eq!(errors, json!({"title": ["Missing data for required field."]}));
    }
}
