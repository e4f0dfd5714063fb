pub mod cli;
pub mod toml_config;

use crate::config::toml_config::{DEFAULT_ARCHIVE_NAME, DEFAULT_TIMEOUT_SECONDS};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_output_formats, validate_path, validate_range, validate_source, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "hotel-directory"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Load cities and hotels, resolve hotel cities and write a directory report")
)]
pub struct CliConfig {
    /// City records: a .json/.csv file or an http(s) URL returning a JSON array
    #[cfg_attr(feature = "cli", arg(long))]
    pub cities: String,

    /// Hotel records: a .json/.csv file or an http(s) URL returning a JSON array
    #[cfg_attr(feature = "cli", arg(long))]
    pub hotels: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "./output"))]
    pub output_path: String,

    #[cfg_attr(feature = "cli", arg(long, value_delimiter = ',', default_value = "csv,tsv"))]
    pub formats: Vec<String>,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS))]
    pub timeout_seconds: u64,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn cities_source(&self) -> &str {
        &self.cities
    }

    fn hotels_source(&self) -> &str {
        &self.hotels
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn archive_name(&self) -> &str {
        DEFAULT_ARCHIVE_NAME
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_source("cities", &self.cities)?;
        validate_source("hotels", &self.hotels)?;
        validate_path("output_path", &self.output_path)?;
        validate_output_formats("formats", &self.formats)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 600)
    }
}
