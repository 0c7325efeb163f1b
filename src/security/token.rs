use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::Config;

pub const DEFAULT_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub sub: String, // 用户ID
    pub iat: i64,    // 签发时间
    pub exp: i64,    // 过期时间
}

pub struct TokenManager;

impl TokenManager {
    /// URL 安全的随机令牌，`length` 为随机字节数
    pub fn generate_secure_token(length: usize) -> String {
        let mut bytes = vec![0u8; length];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn generate_csrf_token() -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// 签发会话令牌，返回令牌和过期时间戳
    pub fn issue_session_token(
        uid: &str,
        config: &Config,
    ) -> Result<(String, i64), jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let expiration = (now + Duration::seconds(config.session_lifetime_secs as i64)).timestamp();

        let claims = SessionClaims {
            sub: uid.to_string(),
            iat: now.timestamp(),
            exp: expiration,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret_key.as_bytes()),
        )?;

        Ok((token, expiration))
    }

    pub fn verify_session_token(
        token: &str,
        config: &Config,
    ) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let token_data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(config.secret_key.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}
