use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Problems with the resolved settings. Always raised before any network
/// activity.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Bucket name is required")]
    MissingBucket,

    #[error("Credentials are required: set an access key pair or a profile name")]
    MissingCredentials,

    #[error("Incomplete access key pair: {0} is missing")]
    IncompleteKeyPair(&'static str),

    #[error("Assets directory not found: {0}")]
    MissingAssetsDir(PathBuf),

    #[error("Manifest file not found: {0}")]
    MissingManifest(PathBuf),

    #[error("Invalid version '{0}': must be non-empty, contain no '/' and not be '.' or '..'")]
    InvalidVersion(String),

    #[error("Invalid prefix '{0}': segments must be non-empty and not '.' or '..'")]
    InvalidPrefix(String),

    #[error("Invalid endpoint '{0}': expected scheme://host")]
    InvalidEndpoint(String),

    #[error("Concurrency must be at least 1")]
    InvalidConcurrency,
}

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Manifest root must be a JSON object")]
    NotAnObject,
}

/// Everything that can go wrong during a deployment run.
///
/// `FileRead`, `RemoteLookup` and `Upload` are recoverable per asset; the
/// publisher records them and moves on. Raised anywhere else they end the run.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to query remote object {key}: {source}")]
    RemoteLookup {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to upload {key}: {source}")]
    Upload {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to configure bucket CORS: {0}")]
    Cors(#[source] StoreError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Failed to walk {root}: {message}")]
    Walk { root: PathBuf, message: String },
}
