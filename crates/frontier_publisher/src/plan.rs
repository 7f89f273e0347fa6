use crate::hash::read_and_fingerprint;
use crate::walk::AssetFile;
use bytes::Bytes;
use frontier_core::prelude::*;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadReason {
    /// No object exists under the key yet.
    New,
    /// The remote fingerprint differs or is unknown.
    Changed,
    /// Force mode, the remote side was not consulted.
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadDecision {
    Skip,
    Upload(UploadReason),
}

impl UploadDecision {
    /// Compares a local fingerprint with what the store reported.
    pub fn compare(local: &ContentFingerprint, remote: Option<&RemoteObject>) -> Self {
        match remote {
            None => Self::Upload(UploadReason::New),
            Some(RemoteObject {
                fingerprint: Some(remote),
            }) if remote == local => Self::Skip,
            Some(_) => Self::Upload(UploadReason::Changed),
        }
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, Self::Upload(_))
    }
}

/// Cache lifetime classes, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Any `image/*` type. Versioned keys never change content.
    Immutable,
    /// `.json` files, so manifest updates show up within minutes.
    ShortLived,
    Default,
}

impl CachePolicy {
    pub fn select(content_type: &str, path: &str) -> Self {
        if content_type.starts_with("image/") {
            Self::Immutable
        } else if has_json_extension(path) {
            Self::ShortLived
        } else {
            Self::Default
        }
    }

    pub fn header_value(&self) -> &'static str {
        match self {
            Self::Immutable => "public, max-age=31536000, immutable",
            Self::ShortLived => "public, max-age=300",
            Self::Default => "public, max-age=86400",
        }
    }
}

fn has_json_extension(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHeaders {
    pub content_type: String,
    pub cache_control: CachePolicy,
}

impl ContentHeaders {
    pub fn for_path(path: &str) -> Self {
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        Self::new(content_type, path)
    }

    pub fn new(content_type: String, path: &str) -> Self {
        let cache_control = CachePolicy::select(&content_type, path);
        Self {
            content_type,
            cache_control,
        }
    }
}

/// Everything needed to act on one asset.
#[derive(Debug, Clone)]
pub struct UploadPlan {
    pub asset: AssetFile,
    pub key: ObjectKey,
    pub decision: UploadDecision,
    pub fingerprint: ContentFingerprint,
    pub headers: ContentHeaders,
    pub body: Bytes,
}

impl UploadPlan {
    pub fn into_put(self) -> PutObject {
        PutObject {
            key: self.key,
            body: self.body,
            content_type: self.headers.content_type,
            cache_control: self.headers.cache_control.header_value().to_string(),
            fingerprint: self.fingerprint,
        }
    }
}

pub struct UploadPlanner<'a, S: ObjectStore> {
    store: &'a S,
    config: &'a DeploymentConfig,
}

impl<'a, S: ObjectStore> UploadPlanner<'a, S> {
    pub fn new(store: &'a S, config: &'a DeploymentConfig) -> Self {
        Self { store, config }
    }

    /// Fingerprints the file and, unless forced, asks the store whether the
    /// versioned key already holds the same bytes.
    pub async fn plan(&self, asset: AssetFile) -> Result<UploadPlan, DeployError> {
        let key = self.config.versioned_key(&asset.relative_path);
        let (body, fingerprint) = read_and_fingerprint(&asset.local_path).await?;

        let decision = if self.config.force {
            UploadDecision::Upload(UploadReason::Forced)
        } else {
            let remote = self
                .store
                .head_object(&key)
                .await
                .map_err(|source| DeployError::RemoteLookup {
                    key: key.to_string(),
                    source,
                })?;
            UploadDecision::compare(&fingerprint, remote.as_ref())
        };
        debug!(%key, %fingerprint, ?decision, "Planned asset");

        let headers = ContentHeaders::for_path(&asset.relative_path);

        Ok(UploadPlan {
            asset,
            key,
            decision,
            fingerprint,
            headers,
            body,
        })
    }
}
