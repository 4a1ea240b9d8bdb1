use kisan_core::config::{get_default_config_file, KisanConfig};
use kisan_core::errors::KisanResult;
use std::net::SocketAddr;
use std::path::Path;
use tracing::{debug, info};

pub const APP_NAME: &str = "kisan-mitra";
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub kisan: KisanConfig,
}

impl AppConfig {
    /// Resolve the model configuration: file, then environment, then `overrides`.
    ///
    /// Without an explicit `config_path` the per-user file is used if present.
    /// Fails if no API key is available from any source.
    pub fn load(
        config_path: Option<&Path>,
        overrides: &KisanConfig,
        http_addr: SocketAddr,
    ) -> KisanResult<Self> {
        let file_config = match config_path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                KisanConfig::load_from_file(path)?
            }
            None => match get_default_config_file(APP_NAME) {
                Ok(path) => {
                    debug!("Checking default configuration at {}", path.display());
                    KisanConfig::load_from_file(&path)?
                }
                Err(_) => KisanConfig::default(),
            },
        };

        let kisan = file_config
            .merge(&KisanConfig::from_env())
            .merge(overrides);
        kisan.require_api_key()?;

        Ok(Self { http_addr, kisan })
    }
}
