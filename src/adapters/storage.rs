use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::PathBuf;

/// Files under a base directory on the local disk.
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
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }

    fn locate(&self, path: &str) -> String {
        self.base_path.join(path).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage
            .write_file("search_1/emails/Loft_email.txt", b"Subject: Hi")
            .await
            .unwrap();

        let data = tokio::fs::read(dir.path().join("search_1/emails/Loft_email.txt"))
            .await
            .unwrap();
        assert_eq!(data, b"Subject: Hi");
        assert!(dir.path().join("search_1/emails").is_dir());
    }

    #[tokio::test]
    async fn test_write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_file("report.json", b"{\"a\": 1}").await.unwrap();
        storage.write_file("report.json", b"{}").await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("report.json")).unwrap(), b"{}");
    }

    #[test]
    fn test_locate_joins_base_path() {
        let storage = LocalStorage::new("/tmp/out");
        assert_eq!(storage.locate("a/b.json"), "/tmp/out/a/b.json");
    }
}
