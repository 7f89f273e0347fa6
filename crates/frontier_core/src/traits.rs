use crate::cors::CorsPolicy;
use crate::error::*;
use crate::fingerprint::ContentFingerprint;
use crate::keys::ObjectKey;

use bytes::Bytes;

/// A single object write.
#[derive(Debug, Clone)]
pub struct PutObject {
    pub key: ObjectKey,
    pub body: Bytes,
    pub content_type: String,
    pub cache_control: String,
    /// Sent along as the integrity check value and kept with the object so
    /// later runs can compare against it.
    pub fingerprint: ContentFingerprint,
}

/// What a HEAD request tells us about an existing object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    /// `None` when the object exists but carries no fingerprint we can read,
    /// e.g. it was written by another tool.
    pub fingerprint: Option<ContentFingerprint>,
}

/// The subset of an S3-compatible API a deployment needs.
pub trait ObjectStore: Send + Sync + 'static + Clone {
    fn put_object(
        &self,
        object: PutObject,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Returns `Ok(None)` only when the object does not exist. Any other
    /// failure is an error.
    fn head_object(
        &self,
        key: &ObjectKey,
    ) -> impl Future<Output = Result<Option<RemoteObject>, StoreError>> + Send;

    /// Replaces the bucket's CORS configuration.
    fn put_bucket_cors(
        &self,
        policy: &CorsPolicy,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
