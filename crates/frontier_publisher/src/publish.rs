use crate::plan::{ContentHeaders, UploadDecision, UploadPlanner};
use crate::summary::{AssetOutcome, AssetStatus, CorsOutcome, DeploymentSummary};
use crate::walk::{AssetFile, WalkEntry, walk_assets};
use bytes::Bytes;
use chrono::Utc;
use frontier_core::prelude::*;
use futures::{StreamExt, stream};
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};

/// Runs a single deployment against one store.
///
/// Per-asset failures are recorded in the summary and the run carries on.
/// Everything else, including both manifest uploads, is fatal.
pub struct DeploymentPublisher<'a, S: ObjectStore> {
    store: S,
    config: &'a DeploymentConfig,
}

impl<'a, S: ObjectStore> DeploymentPublisher<'a, S> {
    pub fn new(store: S, config: &'a DeploymentConfig) -> Self {
        Self { store, config }
    }

    #[instrument(skip(self), fields(bucket = %self.config.bucket, version = %self.config.version))]
    pub async fn run(&self) -> Result<DeploymentSummary, DeployError> {
        let config = self.config;
        info!(
            dry_run = config.dry_run,
            force = config.force,
            prefix = %config.prefix,
            "Starting deployment"
        );

        let manifest = self.load_manifest().await?;

        let cors = if config.setup_cors {
            Some(self.configure_cors().await?)
        } else {
            None
        };

        let assets = self.collect_assets().await?;
        info!(count = assets.len(), root = %config.assets_dir.display(), "Collected assets");

        let outcomes = self.publish_assets(assets).await;

        let base_url = config.base_url();
        self.publish_manifests(&manifest, &base_url).await?;

        let summary = DeploymentSummary {
            bucket: config.bucket.clone(),
            version: config.version.clone(),
            dry_run: config.dry_run,
            base_url,
            cors,
            assets: outcomes,
            versioned_manifest_key: config.versioned_manifest_key(),
            latest_manifest_key: config.latest_manifest_key(),
            manifests_published: !config.dry_run,
        };
        info!(
            uploaded = summary.uploaded(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "Deployment finished"
        );
        Ok(summary)
    }

    async fn load_manifest(&self) -> Result<VersionedManifest, DeployError> {
        let path = &self.config.manifest_path;
        let raw = fs::read(path).await.map_err(|source| ManifestError::Read {
            path: path.clone(),
            source,
        })?;
        Ok(VersionedManifest::from_bytes(raw)?)
    }

    /// Walks the asset root on the blocking pool.
    async fn collect_assets(&self) -> Result<Vec<WalkEntry>, DeployError> {
        let root = self.config.assets_dir.clone();
        tokio::task::spawn_blocking(move || walk_assets(&root))
            .await
            .map_err(|e| DeployError::Walk {
                root: self.config.assets_dir.clone(),
                message: e.to_string(),
            })?
    }

    /// Applies the bucket CORS rule, or only reports it in a dry run.
    pub async fn configure_cors(&self) -> Result<CorsOutcome, DeployError> {
        let policy = CorsPolicy::for_origins(self.config.cors_origins.iter().cloned());

        if self.config.dry_run {
            info!(origins = ?policy.allowed_origins, "[dry run] Would configure bucket CORS");
            return Ok(CorsOutcome {
                policy,
                applied: false,
            });
        }

        self.store
            .put_bucket_cors(&policy)
            .await
            .map_err(DeployError::Cors)?;
        info!(origins = ?policy.allowed_origins, "Configured bucket CORS");

        Ok(CorsOutcome {
            policy,
            applied: true,
        })
    }

    /// Processes assets with up to `concurrency` in flight. Outcomes come back
    /// in walk order.
    async fn publish_assets(&self, assets: Vec<WalkEntry>) -> Vec<AssetOutcome> {
        let planner = UploadPlanner::new(&self.store, self.config);
        stream::iter(assets)
            .map(|asset| self.publish_asset(&planner, asset))
            .buffered(self.config.concurrency)
            .collect()
            .await
    }

    async fn publish_asset(&self, planner: &UploadPlanner<'_, S>, entry: WalkEntry) -> AssetOutcome {
        let (relative_path, result) = match entry {
            WalkEntry::File(asset) => {
                let relative_path = asset.relative_path.clone();
                (relative_path, self.upload_asset(planner, asset).await)
            }
            WalkEntry::Unreadable {
                relative_path,
                error,
            } => (relative_path, Err(error)),
        };
        let key = self.config.versioned_key(&relative_path);

        let status = match result {
            Ok(status) => status,
            Err(e) => {
                error!(%key, "Asset failed: {e}");
                AssetStatus::Failed {
                    error: e.to_string(),
                }
            }
        };

        AssetOutcome {
            relative_path,
            key,
            status,
        }
    }

    async fn upload_asset(
        &self,
        planner: &UploadPlanner<'_, S>,
        asset: AssetFile,
    ) -> Result<AssetStatus, DeployError> {
        let plan = planner.plan(asset).await?;

        let reason = match plan.decision {
            UploadDecision::Skip => {
                debug!(key = %plan.key, "Unchanged, skipping");
                return Ok(AssetStatus::Skipped);
            }
            UploadDecision::Upload(reason) => reason,
        };

        if self.config.dry_run {
            info!(key = %plan.key, ?reason, "[dry run] Would upload");
            return Ok(AssetStatus::WouldUpload { reason });
        }

        let key = plan.key.to_string();
        self.store
            .put_object(plan.into_put())
            .await
            .map_err(|source| DeployError::Upload { key: key.clone(), source })?;
        info!(%key, ?reason, "Uploaded");

        Ok(AssetStatus::Uploaded { reason })
    }

    /// Uploads the manifest verbatim under the version, then the rewritten
    /// copy under `latest`. The latest pointer only moves once the versioned
    /// copy is in place.
    async fn publish_manifests(
        &self,
        manifest: &VersionedManifest,
        base_url: &str,
    ) -> Result<(), DeployError> {
        let config = self.config;
        let metadata = DeploymentMetadata::new(&config.version, Utc::now(), base_url.to_string());
        let latest = manifest.to_latest_bytes(&metadata)?;

        self.put_manifest(config.versioned_manifest_key(), manifest.raw().clone())
            .await?;
        self.put_manifest(config.latest_manifest_key(), latest).await?;

        Ok(())
    }

    async fn put_manifest(&self, key: ObjectKey, body: Bytes) -> Result<(), DeployError> {
        let headers = ContentHeaders::for_path(&self.config.manifest_name);

        if self.config.dry_run {
            info!(%key, bytes = body.len(), "[dry run] Would publish manifest");
            return Ok(());
        }

        let object = PutObject {
            fingerprint: ContentFingerprint::of(&body),
            key: key.clone(),
            body,
            content_type: headers.content_type,
            cache_control: headers.cache_control.header_value().to_string(),
        };

        self.store.put_object(object).await.map_err(|source| {
            warn!(%key, "Manifest upload failed");
            DeployError::Upload {
                key: key.to_string(),
                source,
            }
        })?;
        info!(%key, "Published manifest");

        Ok(())
    }
}
