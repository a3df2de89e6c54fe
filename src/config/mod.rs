pub mod cli;
pub mod toml_config;

pub use cli::{Cli, Command};
pub use toml_config::AppConfig;

use crate::utils::error::Result;
use std::path::Path;

/// 有指定設定檔就載入，否則使用預設值
pub fn load(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            AppConfig::from_file(path)
        }
        None => {
            tracing::info!("📁 No configuration file given, using defaults");
            Ok(AppConfig::default())
        }
    }
}
