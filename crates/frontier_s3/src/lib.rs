use aws_config::BehaviorVersion;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::head_object::HeadObjectOutput;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{ChecksumMode, CorsConfiguration, CorsRule};
use frontier_core::prelude::*;
use tracing::{debug, error, instrument};

/// User metadata entry holding the hex fingerprint of an uploaded object.
pub const FINGERPRINT_METADATA_KEY: &str = "sha256";

#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Builds a client for the configured region, endpoint and credentials.
    pub async fn connect(config: &DeploymentConfig, credentials: &Credentials) -> Self {
        let loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

        let loader = match credentials {
            Credentials::Static {
                access_key_id,
                secret_access_key,
                session_token,
            } => loader.credentials_provider(aws_credential_types::Credentials::new(
                access_key_id,
                secret_access_key,
                session_token.clone(),
                None,
                "frontier-deploy",
            )),
            Credentials::Profile(name) => loader.profile_name(name),
        };

        let loader = match config.timeout {
            Some(timeout) => loader.timeout_config(
                TimeoutConfig::builder().operation_timeout(timeout).build(),
            ),
            None => loader,
        };

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint {
            debug!(url = %endpoint.url, path_style = endpoint.force_path_style, "Using custom endpoint");
            builder = builder
                .endpoint_url(&endpoint.url)
                .force_path_style(endpoint.force_path_style);
        }

        Self::new(Client::from_conf(builder.build()), config.bucket.clone())
    }
}

/// Prefers our own metadata entry, falls back to an SDK checksum.
fn fingerprint_of(output: &HeadObjectOutput) -> Option<ContentFingerprint> {
    output
        .metadata()
        .and_then(|m| m.get(FINGERPRINT_METADATA_KEY))
        .and_then(|v| ContentFingerprint::from_hex(v))
        .or_else(|| {
            output
                .checksum_sha256()
                .and_then(ContentFingerprint::from_base64)
        })
}

impl ObjectStore for S3Store {
    #[instrument(skip(self, object), fields(bucket = %self.bucket, key = %object.key))]
    async fn put_object(&self, object: PutObject) -> Result<(), StoreError> {
        debug!(bytes = object.body.len(), "Uploading object to S3...");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(object.key.as_str())
            .body(ByteStream::from(object.body))
            .content_type(object.content_type)
            .cache_control(object.cache_control)
            .checksum_sha256(object.fingerprint.to_base64())
            .metadata(FINGERPRINT_METADATA_KEY, object.fingerprint.to_hex())
            .send()
            .await
            .map_err(|e| {
                error!("Failed to upload object: {e:?}");
                StoreError::Backend(format!("S3 Upload Error: {}", DisplayErrorContext(&e)))
            })?;

        debug!("Upload successful");
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket, key = %key))]
    async fn head_object(&self, key: &ObjectKey) -> Result<Option<RemoteObject>, StoreError> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .checksum_mode(ChecksumMode::Enabled)
            .send()
            .await;

        match res {
            Ok(output) => Ok(Some(RemoteObject {
                fingerprint: fingerprint_of(&output),
            })),
            Err(SdkError::ServiceError(err)) if err.err().is_not_found() => {
                debug!("Object not found in S3");
                Ok(None)
            }
            Err(e) => {
                error!("S3 Head Object Error: {e:?}");
                Err(StoreError::Backend(format!(
                    "S3 Head Object Error: {}",
                    DisplayErrorContext(&e)
                )))
            }
        }
    }

    #[instrument(skip(self, policy), fields(bucket = %self.bucket))]
    async fn put_bucket_cors(&self, policy: &CorsPolicy) -> Result<(), StoreError> {
        let rule = CorsRule::builder()
            .set_allowed_origins(Some(policy.allowed_origins.clone()))
            .set_allowed_methods(Some(policy.allowed_methods.clone()))
            .set_allowed_headers(Some(policy.allowed_headers.clone()))
            .set_expose_headers(Some(policy.expose_headers.clone()))
            .max_age_seconds(policy.max_age_seconds)
            .build()
            .map_err(|e| StoreError::Backend(format!("Invalid CORS rule: {e}")))?;

        let configuration = CorsConfiguration::builder()
            .cors_rules(rule)
            .build()
            .map_err(|e| StoreError::Backend(format!("Invalid CORS configuration: {e}")))?;

        self.client
            .put_bucket_cors()
            .bucket(&self.bucket)
            .cors_configuration(configuration)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to configure CORS: {e:?}");
                StoreError::Backend(format!("S3 CORS Error: {}", DisplayErrorContext(&e)))
            })?;

        debug!("CORS configuration replaced");
        Ok(())
    }
}
