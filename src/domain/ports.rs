use crate::domain::model::{Dataset, DirectoryReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn cities_source(&self) -> &str;
    fn hotels_source(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn archive_name(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn request_headers(&self) -> Option<&HashMap<String, String>> {
        None
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, data: Dataset) -> Result<DirectoryReport>;
    async fn load(&self, report: DirectoryReport) -> Result<String>;
}
