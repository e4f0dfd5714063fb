use crate::core::conformance::{conform, Violation};
use crate::domain::model::{Rejection, Shape};
use crate::utils::error::{DirectoryError, Result};
use crate::utils::validation::{validate_file_extension, validate_url, SUPPORTED_SOURCE_EXTENSIONS};
use reqwest::Client;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Where a batch of records comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Http(Url),
    JsonFile(PathBuf),
    CsvFile(PathBuf),
}

impl SourceLocation {
    pub fn parse(location: &str) -> Result<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            validate_url("source", location)?;
            let url = Url::parse(location).map_err(|e| DirectoryError::InvalidConfigValueError {
                field: "source".to_string(),
                value: location.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(SourceLocation::Http(url));
        }

        validate_file_extension("source", location, SUPPORTED_SOURCE_EXTENSIONS)?;
        let path = PathBuf::from(location);
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            Ok(SourceLocation::CsvFile(path))
        } else {
            Ok(SourceLocation::JsonFile(path))
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Http(url) => write!(f, "{}", url),
            SourceLocation::JsonFile(path) | SourceLocation::CsvFile(path) => {
                write!(f, "{}", path.display())
            }
        }
    }
}

/// Records of one shape read from one location. Non-conformant records are
/// set aside in `rejected` instead of failing the load.
#[derive(Debug, Clone)]
pub struct Batch<S> {
    pub accepted: Vec<S>,
    pub rejected: Vec<Rejection>,
}

impl<S> Default for Batch<S> {
    fn default() -> Self {
        Self {
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordSource {
    client: Client,
    timeout: Duration,
    headers: HashMap<String, String>,
}

impl Default for RecordSource {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl RecordSource {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
            headers: HashMap::new(),
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub async fn load<S: Shape>(&self, location: &SourceLocation) -> Result<Batch<S>> {
        tracing::debug!("Loading {} records from {}", S::ENTITY, location);

        let batch = match location {
            SourceLocation::Http(url) => {
                let payload = self.fetch_json(url).await?;
                collect_json::<S>(payload, &location.to_string())?
            }
            SourceLocation::JsonFile(path) => {
                let bytes = tokio::fs::read(path).await?;
                let payload: serde_json::Value = serde_json::from_slice(&bytes)?;
                collect_json::<S>(payload, &location.to_string())?
            }
            SourceLocation::CsvFile(path) => {
                let bytes = tokio::fs::read(path).await?;
                collect_csv::<S>(&bytes, &location.to_string())?
            }
        };

        tracing::debug!(
            "{}: {} {} accepted, {} rejected",
            location,
            batch.accepted.len(),
            S::ENTITY,
            batch.rejected.len()
        );
        Ok(batch)
    }

    async fn fetch_json(&self, url: &Url) -> Result<serde_json::Value> {
        let mut request = self.client.get(url.clone()).timeout(self.timeout);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        tracing::debug!("Making API request to: {}", url);
        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(DirectoryError::ApiStatusError {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

fn rejection<S: Shape>(source: &str, index: usize, reasons: Vec<String>) -> Rejection {
    Rejection {
        entity: S::ENTITY.to_string(),
        source: source.to_string(),
        index,
        reasons,
    }
}

fn collect_json<S: Shape>(payload: serde_json::Value, source: &str) -> Result<Batch<S>> {
    let serde_json::Value::Array(items) = payload else {
        return Err(DirectoryError::ProcessingError {
            message: format!("{} must contain a JSON array of {} records", source, S::ENTITY),
        });
    };

    let mut batch = Batch::default();
    for (index, item) in items.iter().enumerate() {
        match conform::<S>(item) {
            Ok(record) => batch.accepted.push(record),
            Err(violations) => {
                let reasons = violations.iter().map(Violation::to_string).collect();
                batch.rejected.push(rejection::<S>(source, index, reasons));
            }
        }
    }
    Ok(batch)
}

fn collect_csv<S: Shape>(bytes: &[u8], source: &str) -> Result<Batch<S>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = S::FIELDS
        .iter()
        .filter(|spec| !headers.iter().any(|h| h == spec.name))
        .map(|spec| Violation::MissingField { field: spec.name }.to_string())
        .collect();

    let mut batch = Batch::default();

    if !missing.is_empty() {
        tracing::warn!(
            "{} is missing {} column(s); every row is rejected",
            source,
            missing.len()
        );
        for (index, row) in reader.records().enumerate() {
            let mut reasons = missing.clone();
            if let Err(e) = row {
                reasons.push(e.to_string());
            }
            batch.rejected.push(rejection::<S>(source, index, reasons));
        }
        return Ok(batch);
    }

    for (index, row) in reader.deserialize::<S>().enumerate() {
        match row {
            Ok(record) => batch.accepted.push(record),
            Err(e) => batch
                .rejected
                .push(rejection::<S>(source, index, vec![e.to_string()])),
        }
    }
    Ok(batch)
}
