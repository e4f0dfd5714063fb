use crate::core::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Storage rooted at a local directory; paths are relative to it.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        Ok(tokio::fs::read(full_path).await?)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read_creates_directories() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        tokio_test::block_on(async {
            storage.write_file("nested/out.zip", b"PK").await.unwrap();
            let data = storage.read_file("nested/out.zip").await.unwrap();
            assert_eq!(data, b"PK");
        });
    }
}
