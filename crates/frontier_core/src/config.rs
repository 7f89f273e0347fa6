use crate::error::ConfigError;
use crate::keys::{DEFAULT_MANIFEST_NAME, DEFAULT_PREFIX, ObjectKey, is_dot_segment};
use crate::url::BaseUrlStrategy;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REGION: &str = "us-east-1";

/// `v{year}.{month}.{day}.{hour}{minute}`, e.g. `v2024.12.02.1430`.
pub fn default_version(now: DateTime<Utc>) -> String {
    now.format("v%Y.%m.%d.%H%M").to_string()
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Static {
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
    },
    /// A named profile from the shared AWS config/credentials files.
    Profile(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static { access_key_id, .. } => f
                .debug_struct("Static")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<redacted>")
                .finish_non_exhaustive(),
            Self::Profile(name) => f.debug_tuple("Profile").field(name).finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub force_path_style: bool,
}

/// Where objects are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    S3 { credentials: Credentials },
    /// Objects are written below a local directory instead of a bucket.
    LocalMirror { root: PathBuf },
}

/// Unvalidated settings as collected from flags and the environment.
#[derive(Debug, Clone)]
pub struct ConfigInput {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub profile: Option<String>,
    pub local_mirror: Option<PathBuf>,
    pub prefix: Option<String>,
    pub version: Option<String>,
    pub assets_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub public_url: Option<String>,
    pub dry_run: bool,
    pub force: bool,
    pub setup_cors: bool,
    pub cors_origins: Vec<String>,
    pub concurrency: usize,
    pub timeout: Option<Duration>,
}

impl Default for ConfigInput {
    fn default() -> Self {
        Self {
            bucket: None,
            region: None,
            endpoint: None,
            force_path_style: false,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            profile: None,
            local_mirror: None,
            prefix: None,
            version: None,
            assets_dir: PathBuf::from("assets"),
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_NAME),
            public_url: None,
            dry_run: false,
            force: false,
            setup_cors: false,
            cors_origins: Vec::new(),
            concurrency: 1,
            timeout: None,
        }
    }
}

/// Fully resolved settings for one run. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<Endpoint>,
    pub target: StoreTarget,
    pub prefix: String,
    pub version: String,
    pub assets_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest_name: String,
    pub url_strategy: BaseUrlStrategy,
    pub dry_run: bool,
    pub force: bool,
    pub setup_cors: bool,
    pub cors_origins: Vec<String>,
    pub concurrency: usize,
    pub timeout: Option<Duration>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ConfigInput {
    /// Validates the input. `now` provides the default version.
    pub fn resolve(self, now: DateTime<Utc>) -> Result<DeploymentConfig, ConfigError> {
        let bucket = non_empty(self.bucket).ok_or(ConfigError::MissingBucket)?;

        let target = match self.local_mirror {
            Some(root) => StoreTarget::LocalMirror { root },
            None => StoreTarget::S3 {
                credentials: resolve_credentials(
                    non_empty(self.access_key_id),
                    non_empty(self.secret_access_key),
                    non_empty(self.session_token),
                    non_empty(self.profile),
                )?,
            },
        };

        let version = match non_empty(self.version) {
            Some(v) if v.contains('/') || is_dot_segment(&v) => {
                return Err(ConfigError::InvalidVersion(v));
            }
            Some(v) => v,
            None => default_version(now),
        };

        let prefix = match self.prefix {
            Some(raw) => {
                let trimmed = raw.trim().trim_matches('/');
                if trimmed.is_empty()
                    || trimmed
                        .split('/')
                        .any(|segment| segment.is_empty() || is_dot_segment(segment))
                {
                    return Err(ConfigError::InvalidPrefix(raw));
                }
                trimmed.to_string()
            }
            None => DEFAULT_PREFIX.to_string(),
        };

        let region = non_empty(self.region).unwrap_or_else(|| DEFAULT_REGION.to_string());

        let endpoint = non_empty(self.endpoint).map(|url| Endpoint {
            url,
            force_path_style: self.force_path_style,
        });

        let url_strategy = match (non_empty(self.public_url), &endpoint) {
            (Some(base), _) => BaseUrlStrategy::Public { base },
            (None, Some(endpoint)) => BaseUrlStrategy::custom_endpoint(&endpoint.url)?,
            (None, None) => BaseUrlStrategy::VirtualHosted {
                region: region.clone(),
            },
        };

        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }

        if !self.assets_dir.is_dir() {
            return Err(ConfigError::MissingAssetsDir(self.assets_dir));
        }
        if !self.manifest_path.is_file() {
            return Err(ConfigError::MissingManifest(self.manifest_path));
        }

        let manifest_name = self
            .manifest_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(DEFAULT_MANIFEST_NAME)
            .to_string();

        Ok(DeploymentConfig {
            bucket,
            region,
            endpoint,
            target,
            prefix,
            version,
            assets_dir: self.assets_dir,
            manifest_path: self.manifest_path,
            manifest_name,
            url_strategy,
            dry_run: self.dry_run,
            force: self.force,
            setup_cors: self.setup_cors,
            cors_origins: self.cors_origins,
            concurrency: self.concurrency,
            timeout: self.timeout,
        })
    }
}

fn resolve_credentials(
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    session_token: Option<String>,
    profile: Option<String>,
) -> Result<Credentials, ConfigError> {
    match (access_key_id, secret_access_key, profile) {
        (Some(access_key_id), Some(secret_access_key), _) => Ok(Credentials::Static {
            access_key_id,
            secret_access_key,
            session_token,
        }),
        (Some(_), None, None) => Err(ConfigError::IncompleteKeyPair("secret access key")),
        (None, Some(_), None) => Err(ConfigError::IncompleteKeyPair("access key id")),
        (_, _, Some(profile)) => Ok(Credentials::Profile(profile)),
        (None, None, None) => Err(ConfigError::MissingCredentials),
    }
}

impl DeploymentConfig {
    pub fn versioned_key(&self, relative_path: &str) -> ObjectKey {
        ObjectKey::versioned(&self.prefix, &self.version, relative_path)
    }

    pub fn versioned_manifest_key(&self) -> ObjectKey {
        self.versioned_key(&self.manifest_name)
    }

    pub fn latest_manifest_key(&self) -> ObjectKey {
        ObjectKey::latest(&self.prefix, &self.manifest_name)
    }

    pub fn base_url(&self) -> String {
        self.url_strategy
            .base_url(&self.bucket, &self.prefix, &self.version)
    }
}
