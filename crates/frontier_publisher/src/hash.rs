use bytes::Bytes;
use frontier_core::error::DeployError;
use frontier_core::fingerprint::ContentFingerprint;
use std::path::Path;
use tokio::fs;

/// Reads a file once and fingerprints its contents.
///
/// The bytes are returned too since an upload needs exactly what was hashed.
pub async fn read_and_fingerprint(path: &Path) -> Result<(Bytes, ContentFingerprint), DeployError> {
    let data = fs::read(path).await.map_err(|source| DeployError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let fingerprint = ContentFingerprint::of(&data);
    Ok((Bytes::from(data), fingerprint))
}
