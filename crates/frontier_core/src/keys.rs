use serde::Serialize;
use std::fmt;

pub const DEFAULT_PREFIX: &str = "frontier-icons";
pub const DEFAULT_MANIFEST_NAME: &str = "frontier_assets.json";
pub const LATEST_SEGMENT: &str = "latest";

/// `.` and `..` would step out of the key namespace once a key is mapped to
/// a filesystem path.
pub fn is_dot_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}

/// Destination key of an object in the bucket.
///
/// * versioned: `{prefix}/{version}/{relative_path}`
/// * latest: `{prefix}/latest/{manifest_name}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn versioned(prefix: &str, version: &str, relative_path: &str) -> Self {
        Self(format!("{prefix}/{version}/{relative_path}"))
    }

    pub fn latest(prefix: &str, manifest_name: &str) -> Self {
        Self(format!("{prefix}/{LATEST_SEGMENT}/{manifest_name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
