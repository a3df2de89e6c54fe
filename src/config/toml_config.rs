use crate::core::batcher::DEFAULT_BATCH_SIZE;
use crate::core::date_filter::DateRecencyFilter;
use crate::core::pipeline::ProcessingSettings;
use crate::core::projector::Projection;
use crate::utils::error::{ProcessError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 512;
const MAX_WINDOW_DAYS: u32 = 36_500;

/// 服務設定檔，所有區段皆可省略
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: Option<ServerConfig>,
    pub processing: Option<ProcessingConfig>,
    pub filter: Option<FilterConfig>,
    pub projection: Option<Projection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub upload_dir: Option<String>,
    pub max_upload_mb: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub delimiter: Option<char>,
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub field: String,
    pub window_days: u32,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProcessError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ProcessError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PORT})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ProcessError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn host(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.host.as_deref())
            .unwrap_or(DEFAULT_HOST)
    }

    /// 設定檔優先，其次是 PORT 環境變數
    pub fn port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn upload_dir(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.upload_dir.as_deref())
            .unwrap_or(DEFAULT_UPLOAD_DIR)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.server
            .as_ref()
            .and_then(|s| s.max_upload_mb)
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB)
            .saturating_mul(1024 * 1024)
    }

    pub fn delimiter(&self) -> char {
        self.processing
            .as_ref()
            .and_then(|p| p.delimiter)
            .unwrap_or(',')
    }

    pub fn batch_size(&self) -> usize {
        self.processing
            .as_ref()
            .and_then(|p| p.batch_size)
            .unwrap_or(DEFAULT_BATCH_SIZE)
    }

    pub fn projection(&self) -> Projection {
        self.projection.clone().unwrap_or_default()
    }

    /// 驗證後轉成執行時使用的設定
    pub fn processing_settings(&self) -> Result<ProcessingSettings> {
        self.validate()?;

        Ok(ProcessingSettings {
            delimiter: validation::validate_delimiter("processing.delimiter", self.delimiter())?,
            batch_size: self.batch_size(),
            filter: self
                .filter
                .as_ref()
                .map(|f| DateRecencyFilter::new(f.field.clone(), f.window_days)),
            projection: self.projection(),
        })
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_delimiter("processing.delimiter", self.delimiter())?;
        validation::validate_positive_number("processing.batch_size", self.batch_size(), 1)?;
        validation::validate_path("server.upload_dir", self.upload_dir())?;
        validation::validate_positive_number(
            "server.max_upload_mb",
            self.max_upload_bytes() / (1024 * 1024),
            1,
        )?;

        if let Some(filter) = &self.filter {
            validation::validate_non_empty_string("filter.field", &filter.field)?;
            validation::validate_range("filter.window_days", filter.window_days, 0, MAX_WINDOW_DAYS)?;
        }

        let projection = self.projection();
        if let Projection::Explicit { fields } = &projection {
            if fields.is_empty() {
                return Err(ProcessError::ConfigValidationError {
                    field: "projection.fields".to_string(),
                    message: "explicit projection needs at least one field".to_string(),
                });
            }
        }
        for name in projection.declared_names() {
            validation::validate_non_empty_string("projection.fields.name", name)?;
        }
        validation::validate_unique_names("projection.fields", projection.declared_names())?;

        Ok(())
    }
}
