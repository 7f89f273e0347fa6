use crate::error::ManifestError;
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which deployment metadata is merged into the latest manifest.
pub const METADATA_FIELD: &str = "metadata";

/// The asset catalog as it was read from disk.
///
/// The raw bytes are what gets published under the version path; the parsed
/// document is only used to derive the latest manifest.
#[derive(Debug, Clone)]
pub struct VersionedManifest {
    raw: Bytes,
    document: Map<String, Value>,
}

impl VersionedManifest {
    pub fn from_bytes(raw: impl Into<Bytes>) -> Result<Self, ManifestError> {
        let raw = raw.into();
        match serde_json::from_slice::<Value>(&raw)? {
            Value::Object(document) => Ok(Self { raw, document }),
            _ => Err(ManifestError::NotAnObject),
        }
    }

    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Builds the latest manifest: the loaded document with its `metadata`
    /// field set to `metadata`. Other top-level fields keep their order.
    pub fn to_latest(&self, metadata: &DeploymentMetadata) -> Result<Value, ManifestError> {
        let mut document = self.document.clone();
        document.insert(METADATA_FIELD.to_string(), serde_json::to_value(metadata)?);
        Ok(Value::Object(document))
    }

    pub fn to_latest_bytes(&self, metadata: &DeploymentMetadata) -> Result<Bytes, ManifestError> {
        let latest = self.to_latest(metadata)?;
        Ok(Bytes::from(serde_json::to_vec_pretty(&latest)?))
    }
}

/// Metadata stamped onto the latest manifest by each run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentMetadata {
    pub deployed_version: String,

    /// RFC 3339, UTC, millisecond precision.
    pub deployed_at: String,

    /// Public root under which this version's assets are reachable.
    pub base_url: String,
}

impl DeploymentMetadata {
    pub fn new(version: &str, deployed_at: DateTime<Utc>, base_url: String) -> Self {
        Self {
            deployed_version: version.to_string(),
            deployed_at: deployed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            base_url,
        }
    }
}
