//! # Frontier FileSystem Store
//!
//! A local directory standing in for the bucket. Keys map to paths below the
//! root, so a deployment can be staged and inspected before it goes out.
//!
//! ## Features
//!
//! * **Atomic Writes**: Uses temporary files and rename operations so a
//!   reader never sees half an object.
//! * **CORS snapshot**: the bucket policy is written to `.cors.json` at the root.
//!
//! ## Usage
//!
//! ```no_run
//! use frontier_fs::FileSystemStore;
//!
//! let store = FileSystemStore::new("./mirror");
//! ```

use bytes::Bytes;
use frontier_core::prelude::*;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub const CORS_FILE: &str = ".cors.json";

async fn atomic_write(path: &Path, data: Bytes) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, data).await?;
    fs::rename(&tmp_path, path).await?;

    Ok(())
}

#[derive(Clone)]
pub struct FileSystemStore {
    root: PathBuf,
}

impl FileSystemStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { root: path.into() }
    }

    fn get_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let mut path = self.root.clone();
        for segment in key.split('/').filter(|segment| !segment.is_empty()) {
            if is_dot_segment(segment) {
                return Err(StoreError::Backend(format!(
                    "key '{key}' escapes the mirror root"
                )));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

impl ObjectStore for FileSystemStore {
    async fn put_object(&self, object: PutObject) -> Result<(), StoreError> {
        let path = self.get_path(object.key.as_str())?;
        debug!(key = %object.key, path = %path.display(), "Writing object");
        atomic_write(&path, object.body).await
    }

    /// The fingerprint is recomputed from the stored bytes.
    async fn head_object(&self, key: &ObjectKey) -> Result<Option<RemoteObject>, StoreError> {
        let path = self.get_path(key.as_str())?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(RemoteObject {
                fingerprint: Some(ContentFingerprint::of(&data)),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn put_bucket_cors(&self, policy: &CorsPolicy) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(policy)?;
        atomic_write(&self.root.join(CORS_FILE), Bytes::from(data)).await
    }
}
