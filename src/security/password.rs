use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::Config;

/// 旧版哈希的显式前缀
pub const LEGACY_PREFIX: &str = "sha256$";
const LEGACY_HEX_LEN: usize = 64;
const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

/// 存储的密码哈希格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    Bcrypt,
    /// 无盐 SHA-256，仅用于老账户
    LegacySha256,
}

/// 密码强度规则，按检查顺序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    SpecialCharacter,
}

impl fmt::Display for PasswordRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PasswordRule::MinLength => "Password must be at least 8 characters long",
            PasswordRule::Uppercase => "Password must contain at least one uppercase letter",
            PasswordRule::Lowercase => "Password must contain at least one lowercase letter",
            PasswordRule::Digit => "Password must contain at least one digit",
            PasswordRule::SpecialCharacter => {
                "Password must contain at least one special character"
            }
        };
        f.write_str(text)
    }
}

pub const STRONG_PASSWORD_MESSAGE: &str = "Password is strong";

#[derive(Debug, Clone, Copy)]
pub struct PasswordManager {
    cost: u32,
}

impl Default for PasswordManager {
    fn default() -> Self {
        Self::new(12)
    }
}

impl PasswordManager {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.bcrypt_rounds)
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(password.as_bytes(), self.cost)?)
    }

    /// 校验密码，兼容 bcrypt 和旧版 SHA-256 两种格式
    pub fn verify_password(&self, password: &str, stored: &str) -> Result<bool, PasswordError> {
        match legacy_hex(stored) {
            Some(hex) => {
                let computed = legacy_digest(password);
                Ok(computed.as_bytes().ct_eq(hex.as_bytes()).into())
            }
            None => Ok(bcrypt::verify(password.as_bytes(), stored)?),
        }
    }

    pub fn scheme_of(stored: &str) -> HashScheme {
        if legacy_hex(stored).is_some() {
            HashScheme::LegacySha256
        } else {
            HashScheme::Bcrypt
        }
    }

    /// 旧版哈希应在下次登录成功后重新用 bcrypt 存储
    pub fn needs_rehash(stored: &str) -> bool {
        Self::scheme_of(stored) == HashScheme::LegacySha256
    }

    /// 返回第一条未满足的规则
    pub fn is_strong_password(password: &str) -> Result<(), PasswordRule> {
        if password.chars().count() < 8 {
            return Err(PasswordRule::MinLength);
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(PasswordRule::Uppercase);
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(PasswordRule::Lowercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordRule::Digit);
        }
        if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
            return Err(PasswordRule::SpecialCharacter);
        }
        Ok(())
    }
}

/// 旧版无盐 SHA-256 摘要（小写十六进制）
pub fn legacy_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// 识别旧版哈希：`sha256$` 前缀或恰好 64 位十六进制，统一转为小写
fn legacy_hex(stored: &str) -> Option<String> {
    let hex = stored.strip_prefix(LEGACY_PREFIX).unwrap_or(stored);
    if hex.len() == LEGACY_HEX_LEN && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(hex.to_ascii_lowercase())
    } else {
        None
    }
}
