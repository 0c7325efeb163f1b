use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Config;

pub const DEFAULT_STORAGE_BUCKET: &str = "studyos-12345.appspot.com";

#[derive(Debug, Error)]
pub enum FirebaseError {
    #[error("Firebase credentials not found!")]
    NotFound,
    #[error("failed to read firebase credentials from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid firebase credentials: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 服务账号凭证（serviceAccountKey.json 的内容）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccount {
    #[serde(rename = "type")]
    pub account_type: String,
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

/// 凭证来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    File(PathBuf),
    Environment,
}

#[derive(Debug, Clone)]
pub struct FirebaseSettings {
    pub credentials: ServiceAccount,
    pub source: CredentialSource,
    pub storage_bucket: String,
}

impl FirebaseSettings {
    /// 优先读取凭证文件，其次读取 FIREBASE_CREDENTIALS 环境变量
    pub fn load(config: &Config) -> Result<Self, FirebaseError> {
        Self::load_with(
            &config.firebase_credentials_path,
            env::var("FIREBASE_CREDENTIALS").ok(),
            env::var("FIREBASE_STORAGE_BUCKET").ok(),
        )
    }

    pub fn load_with(
        path: &Path,
        env_credentials: Option<String>,
        storage_bucket: Option<String>,
    ) -> Result<Self, FirebaseError> {
        let (credentials, source): (ServiceAccount, CredentialSource) = if path.exists() {
            let raw = fs::read_to_string(path).map_err(|source| FirebaseError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            (
                serde_json::from_str(&raw)?,
                CredentialSource::File(path.to_path_buf()),
            )
        } else {
            match env_credentials.filter(|raw| !raw.trim().is_empty()) {
                Some(raw) => (serde_json::from_str(&raw)?, CredentialSource::Environment),
                None => return Err(FirebaseError::NotFound),
            }
        };

        let storage_bucket = storage_bucket
            .filter(|bucket| !bucket.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string());

        tracing::debug!(
            project_id = %credentials.project_id,
            bucket = %storage_bucket,
            "Loaded firebase credentials"
        );

        Ok(Self {
            credentials,
            source,
            storage_bucket,
        })
    }
}
