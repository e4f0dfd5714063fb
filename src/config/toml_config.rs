use crate::core::ConfigProvider;
use crate::utils::error::{DirectoryError, Result};
use crate::utils::validation::{
    validate_file_name, validate_output_formats, validate_path, validate_range, validate_source,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ARCHIVE_NAME: &str = "directory_output.zip";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub directory: DirectoryConfig,
    pub source: SourceConfig,
    pub load: LoadConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub cities: String,
    pub hotels: String,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub archive_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DirectoryError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DirectoryError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_TOKEN})，未設定者保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DirectoryError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_source("source.cities", &self.source.cities)?;
        validate_source("source.hotels", &self.source.hotels)?;
        validate_path("load.output_path", &self.load.output_path)?;
        validate_output_formats("load.output_formats", &self.load.output_formats)?;

        if let Some(timeout) = self.source.timeout_seconds {
            validate_range("source.timeout_seconds", timeout, 1, 600)?;
        }

        if let Some(archive) = &self.load.archive_name {
            validate_file_name("load.archive_name", archive)?;
        }

        Ok(())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn cities_source(&self) -> &str {
        &self.source.cities
    }

    fn hotels_source(&self) -> &str {
        &self.source.hotels
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn archive_name(&self) -> &str {
        self.load
            .archive_name
            .as_deref()
            .unwrap_or(DEFAULT_ARCHIVE_NAME)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    fn request_headers(&self) -> Option<&HashMap<String, String>> {
        self.source.headers.as_ref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
