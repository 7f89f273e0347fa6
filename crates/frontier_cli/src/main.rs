use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use frontier_core::prelude::*;
use frontier_fs::FileSystemStore;
use frontier_publisher::DeploymentPublisher;
use frontier_s3::S3Store;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod report;

#[derive(Parser, Debug)]
#[command(name = "frontier-deploy")]
#[command(about = "Publish the frontier icon set to an S3-compatible bucket")]
#[command(
    long_about = "Uploads every changed file below --assets-dir to \
                  {prefix}/{version}/..., publishes the manifest under the version \
                  and a copy with deployment metadata under {prefix}/latest/."
)]
struct Cli {
    /// Target bucket
    #[arg(long, env = "S3_BUCKET")]
    bucket: Option<String>,

    /// Bucket region (default: us-east-1)
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Custom S3-compatible endpoint, e.g. "https://nyc3.digitaloceanspaces.com"
    #[arg(long, env = "S3_ENDPOINT")]
    endpoint: Option<String>,

    /// Address the bucket as a path segment instead of a subdomain
    #[arg(long, env = "S3_FORCE_PATH_STYLE")]
    force_path_style: bool,

    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    access_key_id: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_access_key: Option<String>,

    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    session_token: Option<String>,

    /// Named profile from the shared AWS config files
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// Key prefix (default: frontier-icons)
    #[arg(long, env = "DEPLOY_PREFIX")]
    prefix: Option<String>,

    /// Deployment version (default: vYYYY.MM.DD.HHMM, UTC)
    #[arg(long, env = "DEPLOY_VERSION")]
    version: Option<String>,

    /// The directory containing assets
    #[arg(long, env = "ASSETS_DIR", default_value = "assets")]
    assets_dir: PathBuf,

    /// The manifest to publish; its file name becomes the manifest key
    #[arg(long, env = "MANIFEST_PATH", default_value = "frontier_assets.json")]
    manifest: PathBuf,

    /// Public root URL (e.g. a CDN) used for `baseUrl` instead of the bucket URL
    #[arg(long, env = "PUBLIC_BASE_URL")]
    public_url: Option<String>,

    /// Write into a local directory instead of the bucket
    #[arg(long, env = "LOCAL_MIRROR")]
    local_mirror: Option<PathBuf>,

    /// Report what would change without writing anything
    #[arg(long, env = "DRY_RUN")]
    dry_run: bool,

    /// Upload every file without comparing against the bucket
    #[arg(long, env = "FORCE_UPLOAD")]
    force: bool,

    /// Apply the bucket CORS policy before uploading
    #[arg(long, env = "SETUP_CORS")]
    setup_cors: bool,

    /// Allowed CORS origins, comma separated (default: "*")
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// Files in flight at once
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_input(self) -> ConfigInput {
        ConfigInput {
            bucket: self.bucket,
            region: self.region,
            endpoint: self.endpoint,
            force_path_style: self.force_path_style,
            access_key_id: self.access_key_id,
            secret_access_key: self.secret_access_key,
            session_token: self.session_token,
            profile: self.profile,
            local_mirror: self.local_mirror,
            prefix: self.prefix,
            version: self.version,
            assets_dir: self.assets_dir,
            manifest_path: self.manifest,
            public_url: self.public_url,
            dry_run: self.dry_run,
            force: self.force,
            setup_cors: self.setup_cors,
            cors_origins: self.cors_origins,
            concurrency: self.concurrency,
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    let config = cli
        .into_input()
        .resolve(Utc::now())
        .context("Invalid configuration")?;

    if !json {
        println!(
            "🚀 Deploying version '{}' to {}{}...",
            config.version,
            config.bucket,
            if config.dry_run { " (dry run)" } else { "" }
        );
    }

    let result = match &config.target {
        StoreTarget::S3 { credentials } => {
            let store = S3Store::connect(&config, credentials).await;
            DeploymentPublisher::new(store, &config).run().await
        }
        StoreTarget::LocalMirror { root } => {
            tracing::info!(root = %root.display(), "Writing to local mirror");
            DeploymentPublisher::new(FileSystemStore::new(root), &config)
                .run()
                .await
        }
    };
    let summary = result.context("Deployment failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", report::render(&summary));
    }

    Ok(())
}
