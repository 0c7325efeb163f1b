use std::sync::Arc;

use cache::{CacheError, DiskCache};
use config::{Config, FirebaseSettings};
use security::SecurityServices;

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod security;
pub mod timezone;
pub mod utils;
pub mod validation;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub cache: Arc<DiskCache>,
    pub security: Arc<SecurityServices>,
    /// 没有凭据时为 None，服务照常启动
    pub firebase: Option<Arc<FirebaseSettings>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, CacheError> {
        let cache = DiskCache::from_config(&config)?;
        let security = SecurityServices::from_config(&config);
        let firebase = match FirebaseSettings::load(&config) {
            Ok(settings) => {
                tracing::info!(
                    project_id = %settings.credentials.project_id,
                    bucket = %settings.storage_bucket,
                    "Firebase credentials loaded"
                );
                Some(Arc::new(settings))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Firebase is not configured");
                None
            }
        };

        Ok(Self {
            config,
            cache: Arc::new(cache),
            security: Arc::new(security),
            firebase,
        })
    }
}
