use frontier_publisher::{AssetStatus, DeploymentSummary};
use std::fmt::Write;

/// Renders a finished run for the terminal.
pub fn render(summary: &DeploymentSummary) -> String {
    let mut out = String::new();
    let verb = if summary.dry_run { "Would upload" } else { "Uploaded" };

    if let Some(cors) = &summary.cors {
        let state = if cors.applied { "Configured" } else { "Would configure" };
        let _ = writeln!(
            out,
            "🌐 {state} CORS for origins: {}",
            cors.policy.allowed_origins.join(", ")
        );
    }

    for asset in &summary.assets {
        let _ = match &asset.status {
            AssetStatus::Uploaded { reason } | AssetStatus::WouldUpload { reason } => {
                writeln!(out, "⬆️  {verb} ({reason:?}): {}", asset.key)
            }
            AssetStatus::Skipped => writeln!(out, "⏭️  Unchanged: {}", asset.key),
            AssetStatus::Failed { error } => writeln!(out, "❌ Failed: {} ({error})", asset.key),
        };
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{verb}: {}  Skipped: {}  Failed: {}",
        summary.uploaded(),
        summary.skipped(),
        summary.failed()
    );

    if summary.manifests_published {
        let _ = writeln!(out, "📄 Manifest: {}", summary.versioned_manifest_key);
        let _ = writeln!(out, "📌 Latest:   {}", summary.latest_manifest_key);
        let _ = writeln!(
            out,
            "✅ Published version {} at {}",
            summary.version, summary.base_url
        );
    } else {
        let _ = writeln!(
            out,
            "🔍 Dry run complete, nothing was written. Version {} would be served from {}",
            summary.version, summary.base_url
        );
    }

    if summary.failed() > 0 {
        let _ = writeln!(
            out,
            "⚠️ {} asset(s) failed, see the log above for details.",
            summary.failed()
        );
    }

    out
}
