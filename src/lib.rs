//! # Frontier Deploy
//!
//! Publishes a directory of assets to an S3-compatible bucket under a
//! versioned key prefix and maintains a `latest` manifest pointer.
//!
//! The pieces live in separate crates and are re-exported here behind
//! features:
//!
//! * `publisher` (default): tree walk, upload planning and the deployment run.
//! * `s3`: the [`ObjectStore`](frontier_core::traits::ObjectStore) backed by `aws-sdk-s3`.
//! * `fs`: a local directory mirror, handy for staging and tests.

pub use frontier_core::*;

#[cfg(feature = "publisher")]
pub mod publisher {
    pub use frontier_publisher::*;
}

#[cfg(feature = "s3")]
pub mod s3 {
    pub use frontier_s3::*;
}

#[cfg(feature = "fs")]
pub mod fs {
    pub use frontier_fs::*;
}

pub mod prelude {
    pub use frontier_core::prelude::*;

    #[cfg(feature = "publisher")]
    pub use frontier_publisher::{DeploymentPublisher, DeploymentSummary};

    #[cfg(feature = "s3")]
    pub use frontier_s3::S3Store;

    #[cfg(feature = "fs")]
    pub use frontier_fs::FileSystemStore;
}
