use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Filesystem adapter rooting all harvest outputs under one directory.
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

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.resolve(path))?)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let target = self.resolve(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!(file = %target.display(), bytes = data.len(), "writing harvest output");
        fs::write(target, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_and_reads_back_through_base_path() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        tokio_test::block_on(async {
            storage.write_file("out/people.csv", b"name,id\n").await.unwrap();
            let data = storage.read_file("out/people.csv").await.unwrap();
            assert_eq!(data, b"name,id\n");
        });
    }

    #[test]
    fn read_of_missing_file_is_an_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        let result = tokio_test::block_on(storage.read_file("nope.csv"));
        assert!(result.is_err());
    }
}
