use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// 本機檔案系統；相對路徑以 `base_path` 為根，絕對路徑直接使用
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = fs::read(self.resolve(path))?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().into_owned());

        storage.write_file("out/summary.csv", b"a,b").await.unwrap();
        assert_eq!(storage.read_file("out/summary.csv").await.unwrap(), b"a,b");

        let absolute = dir.path().join("out/summary.csv");
        let other = LocalStorage::new(".".to_string());
        assert_eq!(
            other.read_file(&absolute.to_string_lossy()).await.unwrap(),
            b"a,b"
        );
    }
}
