use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;
use std::path::PathBuf;
use tokio::fs;

/// A file found in storage, as reported by [`StorageService::list_files`].
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub key: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    /// Staging copy of `key` whose write never completed.
    pub partial: bool,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn upload_file(&self, key: &str, data: Vec<u8>) -> io::Result<()>;
    /// Removing a key that does not exist is not an error.
    async fn delete_file(&self, key: &str) -> io::Result<()>;
    /// Removes the staging copy left by an interrupted [`Self::upload_file`].
    async fn discard_partial(&self, key: &str) -> io::Result<()>;
    async fn list_files(&self) -> io::Result<Vec<StoredFile>>;
}

const PARTIAL_SUFFIX: &str = ".part";

/// `.{key}.part` -> `key`
fn partial_key(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix('.')?
        .strip_suffix(PARTIAL_SUFFIX)
        .filter(|key| !key.is_empty())
}

async fn remove_if_present(path: &std::path::Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Stores each object as a flat file named by its key under `root`.
pub struct LocalStorageService {
    root: PathBuf,
}

impl LocalStorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && !key.contains(|c: char| c == '/' || c == '\\')
            && !key.contains("..");
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage key: {key:?}"),
            ));
        }
        Ok(self.root.join(key))
    }

    fn staging_path_for(&self, key: &str) -> io::Result<PathBuf> {
        self.path_for(key)?;
        Ok(self.root.join(format!(".{key}{PARTIAL_SUFFIX}")))
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn upload_file(&self, key: &str, data: Vec<u8>) -> io::Result<()> {
        let path = self.path_for(key)?;
        // Write under a hidden name first so a partial file is never visible by key
        let staging = self.staging_path_for(key)?;
        fs::write(&staging, &data).await?;
        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e);
        }
        Ok(())
    }

    async fn delete_file(&self, key: &str) -> io::Result<()> {
        remove_if_present(&self.path_for(key)?).await
    }

    async fn discard_partial(&self, key: &str) -> io::Result<()> {
        remove_if_present(&self.staging_path_for(key)?).await
    }

    async fn list_files(&self) -> io::Result<Vec<StoredFile>> {
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let (key, partial) = if name.starts_with('.') {
                match partial_key(&name) {
                    Some(key) => (key.to_string(), true),
                    None => continue,
                }
            } else {
                (name, false)
            };
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            files.push(StoredFile {
                key,
                size: metadata.len(),
                modified: metadata.modified()?.into(),
                partial,
            });
        }

        Ok(files)
    }
}
