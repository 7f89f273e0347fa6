//! # Frontier Publisher
//!
//! Runs one deployment: walks the asset tree, decides per file whether the
//! remote copy is current, uploads what changed under the version prefix and
//! publishes the versioned and `latest` manifests.
//!
//! ```no_run
//! # async fn run<S: frontier_core::traits::ObjectStore>(
//! #     store: S,
//! #     config: frontier_core::config::DeploymentConfig,
//! # ) -> Result<(), frontier_core::error::DeployError> {
//! use frontier_publisher::DeploymentPublisher;
//!
//! let summary = DeploymentPublisher::new(store, &config).run().await?;
//! println!("{} uploaded, {} skipped", summary.uploaded(), summary.skipped());
//! # Ok(())
//! # }
//! ```

pub mod hash;
pub mod plan;
pub mod publish;
pub mod summary;
pub mod walk;

pub use plan::{CachePolicy, ContentHeaders, UploadDecision, UploadPlan, UploadPlanner, UploadReason};
pub use publish::DeploymentPublisher;
pub use summary::{AssetOutcome, AssetStatus, CorsOutcome, DeploymentSummary};
pub use walk::{AssetFile, WalkEntry, walk_assets};
