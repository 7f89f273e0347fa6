use crate::plan::UploadReason;
use frontier_core::cors::CorsPolicy;
use frontier_core::keys::ObjectKey;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssetStatus {
    Uploaded { reason: UploadReason },
    /// Dry run: the upload was decided but not performed.
    WouldUpload { reason: UploadReason },
    Skipped,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetOutcome {
    pub relative_path: String,
    pub key: ObjectKey,
    #[serde(flatten)]
    pub status: AssetStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct CorsOutcome {
    pub policy: CorsPolicy,
    /// `false` in dry runs.
    pub applied: bool,
}

/// Result of a completed run, in walk order.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentSummary {
    pub bucket: String,
    pub version: String,
    pub dry_run: bool,
    pub base_url: String,
    pub cors: Option<CorsOutcome>,
    pub assets: Vec<AssetOutcome>,
    pub versioned_manifest_key: ObjectKey,
    pub latest_manifest_key: ObjectKey,
    /// `false` in dry runs.
    pub manifests_published: bool,
}

impl DeploymentSummary {
    /// Uploaded files, or in a dry run, files that would be uploaded.
    pub fn uploaded(&self) -> usize {
        self.count(|s| {
            matches!(
                s,
                AssetStatus::Uploaded { .. } | AssetStatus::WouldUpload { .. }
            )
        })
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, AssetStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, AssetStatus::Failed { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = &AssetOutcome> {
        self.assets
            .iter()
            .filter(|a| matches!(a.status, AssetStatus::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&AssetStatus) -> bool) -> usize {
        self.assets.iter().filter(|a| predicate(&a.status)).count()
    }
}
