use serde::{Deserialize, Serialize};

pub const CORS_MAX_AGE_SECONDS: i32 = 3600;

/// The single cross-origin rule applied to the bucket.
///
/// Read-only access: `GET` and `HEAD`, every request header, `ETag` exposed
/// so clients can revalidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CorsPolicy {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub expose_headers: Vec<String>,
    pub max_age_seconds: i32,
}

impl CorsPolicy {
    /// Builds the policy for the given origins, falling back to `*` when
    /// none are configured.
    pub fn for_origins<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut allowed_origins: Vec<String> = origins
            .into_iter()
            .map(Into::into)
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if allowed_origins.is_empty() {
            allowed_origins.push("*".to_string());
        }

        Self {
            allowed_origins,
            allowed_methods: vec!["GET".to_string(), "HEAD".to_string()],
            allowed_headers: vec!["*".to_string()],
            expose_headers: vec!["ETag".to_string()],
            max_age_seconds: CORS_MAX_AGE_SECONDS,
        }
    }
}
