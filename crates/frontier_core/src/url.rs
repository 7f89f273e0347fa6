use crate::error::ConfigError;

/// How the public root URL of a deployed version is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseUrlStrategy {
    /// AWS virtual-hosted style: `https://{bucket}.s3.{region}.amazonaws.com`.
    VirtualHosted { region: String },
    /// S3-compatible endpoint with the bucket as a subdomain label:
    /// `{scheme}://{bucket}.{host}`.
    CustomEndpoint { scheme: String, host: String },
    /// A fixed public root, e.g. a CDN in front of the bucket.
    Public { base: String },
}

impl BaseUrlStrategy {
    /// Parses `scheme://host[:port][/...]`. Anything after the authority is
    /// ignored.
    pub fn custom_endpoint(endpoint: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidEndpoint(endpoint.to_string());

        let (scheme, rest) = endpoint.trim().split_once("://").ok_or_else(invalid)?;
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if scheme.is_empty() || host.is_empty() {
            return Err(invalid());
        }

        Ok(Self::CustomEndpoint {
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_string(),
        })
    }

    pub fn base_url(&self, bucket: &str, prefix: &str, version: &str) -> String {
        let root = match self {
            Self::VirtualHosted { region } => {
                format!("https://{bucket}.s3.{region}.amazonaws.com")
            }
            Self::CustomEndpoint { scheme, host } => format!("{scheme}://{bucket}.{host}"),
            Self::Public { base } => base.trim_end_matches('/').to_string(),
        };
        format!("{root}/{prefix}/{version}")
    }
}
