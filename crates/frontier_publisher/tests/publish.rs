use bytes::Bytes;
use frontier_core::prelude::*;
use frontier_publisher::{AssetStatus, DeploymentPublisher, UploadReason};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: String,
    cache_control: String,
    fingerprint: ContentFingerprint,
}

/// In-memory store with switchable failures.
#[derive(Clone, Default)]
struct MemoryStore {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    cors: Arc<Mutex<Option<CorsPolicy>>>,
    fail_puts: Arc<Mutex<HashSet<String>>>,
    fail_heads: Arc<Mutex<HashSet<String>>>,
    fail_cors: Arc<Mutex<bool>>,
    heads: Arc<AtomicUsize>,
    puts: Arc<AtomicUsize>,
}

impl MemoryStore {
    fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn fail_put(&self, key: &str) {
        self.fail_puts.lock().unwrap().insert(key.to_string());
    }

    fn fail_head(&self, key: &str) {
        self.fail_heads.lock().unwrap().insert(key.to_string());
    }
}

impl ObjectStore for MemoryStore {
    async fn put_object(&self, object: PutObject) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.lock().unwrap().contains(object.key.as_str()) {
            return Err(StoreError::Backend("simulated put failure".to_string()));
        }
        self.objects.lock().unwrap().insert(
            object.key.to_string(),
            StoredObject {
                body: object.body,
                content_type: object.content_type,
                cache_control: object.cache_control,
                fingerprint: object.fingerprint,
            },
        );
        Ok(())
    }

    async fn head_object(&self, key: &ObjectKey) -> Result<Option<RemoteObject>, StoreError> {
        self.heads.fetch_add(1, Ordering::SeqCst);
        if self.fail_heads.lock().unwrap().contains(key.as_str()) {
            return Err(StoreError::Backend("simulated access denied".to_string()));
        }
        Ok(self.object(key.as_str()).map(|o| RemoteObject {
            fingerprint: Some(o.fingerprint),
        }))
    }

    async fn put_bucket_cors(&self, policy: &CorsPolicy) -> Result<(), StoreError> {
        if *self.fail_cors.lock().unwrap() {
            return Err(StoreError::Backend("simulated cors failure".to_string()));
        }
        *self.cors.lock().unwrap() = Some(policy.clone());
        Ok(())
    }
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        let assets = dir.path().join("assets");
        std::fs::create_dir_all(&assets).unwrap();
        for (relative, content) in files {
            write_file(&assets.join(relative), content);
        }
        std::fs::write(
            dir.path().join("frontier_assets.json"),
            r#"{"icons":[{"name":"ActiveCooling"}],"schema":2}"#,
        )
        .unwrap();
        Self { dir }
    }

    fn with_icons(count: usize) -> Self {
        let files: Vec<(String, String)> = (0..count)
            .map(|i| (format!("ui/icons/icon_{i:02}.png"), format!("png {i}")))
            .collect();
        let refs: Vec<(&str, &str)> = files
            .iter()
            .map(|(p, c)| (p.as_str(), c.as_str()))
            .collect();
        Self::new(&refs)
    }

    fn input(&self) -> ConfigInput {
        ConfigInput {
            bucket: Some("bucket".to_string()),
            access_key_id: Some("AKIA".to_string()),
            secret_access_key: Some("secret".to_string()),
            version: Some("v1".to_string()),
            public_url: Some("https://bucket.example.com".to_string()),
            assets_dir: self.dir.path().join("assets"),
            manifest_path: self.dir.path().join("frontier_assets.json"),
            ..Default::default()
        }
    }

    fn config(&self) -> DeploymentConfig {
        self.input().resolve(chrono::Utc::now()).unwrap()
    }

    fn assets(&self) -> std::path::PathBuf {
        self.dir.path().join("assets")
    }
}

fn write_file(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[tokio::test]
async fn test_first_run_uploads_everything_and_publishes_manifests() {
    let fixture = Fixture::new(&[
        ("ui/texture/icons/frontier/ActiveCooling.png", "png"),
        ("readme.txt", "hello"),
    ]);
    let config = fixture.config();
    let store = MemoryStore::default();

    let summary = DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.uploaded(), 2);
    assert_eq!(summary.skipped(), 0);
    assert_eq!(summary.failed(), 0);
    assert!(summary.manifests_published);
    assert!(summary.assets.iter().all(|a| a.status
        == AssetStatus::Uploaded {
            reason: UploadReason::New
        }));

    let icon = store
        .object("frontier-icons/v1/ui/texture/icons/frontier/ActiveCooling.png")
        .unwrap();
    assert_eq!(icon.body.as_ref(), b"png");
    assert_eq!(icon.content_type, "image/png");
    assert_eq!(icon.cache_control, "public, max-age=31536000, immutable");
    assert_eq!(icon.fingerprint, ContentFingerprint::of(b"png"));

    let text = store.object("frontier-icons/v1/readme.txt").unwrap();
    assert_eq!(text.cache_control, "public, max-age=86400");

    let versioned = store.object("frontier-icons/v1/frontier_assets.json").unwrap();
    assert_eq!(
        versioned.body.as_ref(),
        br#"{"icons":[{"name":"ActiveCooling"}],"schema":2}"#
    );
    assert_eq!(versioned.content_type, "application/json");
    assert_eq!(versioned.cache_control, "public, max-age=300");

    assert!(store.object("frontier-icons/latest/frontier_assets.json").is_some());
    assert_eq!(store.len(), 4);
}

#[tokio::test]
async fn test_latest_manifest_carries_metadata() {
    let fixture = Fixture::new(&[("a.png", "a")]);
    let config = fixture.config();
    let store = MemoryStore::default();

    DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap();

    let latest = store
        .object("frontier-icons/latest/frontier_assets.json")
        .unwrap();
    let latest: Value = serde_json::from_slice(&latest.body).unwrap();

    assert_eq!(latest["icons"], json!([{"name": "ActiveCooling"}]));
    assert_eq!(latest["schema"], json!(2));

    let metadata = latest["metadata"].as_object().unwrap();
    assert_eq!(metadata.len(), 3);
    assert_eq!(metadata["deployedVersion"], json!("v1"));
    assert_eq!(
        metadata["baseUrl"],
        json!("https://bucket.example.com/frontier-icons/v1")
    );
    let deployed_at = metadata["deployedAt"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(deployed_at).is_ok());
}

#[tokio::test]
async fn test_second_run_skips_unchanged_files() {
    let fixture = Fixture::with_icons(3);
    let config = fixture.config();
    let store = MemoryStore::default();

    DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap();
    let puts_after_first = store.puts.load(Ordering::SeqCst);

    let summary = DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.uploaded(), 0);
    assert_eq!(summary.skipped(), 3);
    // Only the two manifests are written again.
    assert_eq!(store.puts.load(Ordering::SeqCst), puts_after_first + 2);
}

#[tokio::test]
async fn test_changed_file_is_uploaded_again() {
    let fixture = Fixture::with_icons(2);
    let config = fixture.config();
    let store = MemoryStore::default();

    DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap();
    write_file(&fixture.assets().join("ui/icons/icon_01.png"), "new pixels");

    let summary = DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.assets[0].status, AssetStatus::Skipped);
    assert_eq!(
        summary.assets[1].status,
        AssetStatus::Uploaded {
            reason: UploadReason::Changed
        }
    );
    let stored = store.object("frontier-icons/v1/ui/icons/icon_01.png").unwrap();
    assert_eq!(stored.body.as_ref(), b"new pixels");
}

#[tokio::test]
async fn test_force_uploads_without_probing() {
    let fixture = Fixture::with_icons(3);
    let store = MemoryStore::default();
    let config = fixture.config();
    DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap();
    store.heads.store(0, Ordering::SeqCst);

    let forced = ConfigInput {
        force: true,
        ..fixture.input()
    }
    .resolve(chrono::Utc::now())
    .unwrap();
    let summary = DeploymentPublisher::new(store.clone(), &forced)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.uploaded(), 3);
    assert!(summary.assets.iter().all(|a| a.status
        == AssetStatus::Uploaded {
            reason: UploadReason::Forced
        }));
    assert_eq!(store.heads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_one_failed_upload_does_not_stop_the_run() {
    let fixture = Fixture::with_icons(11);
    let config = fixture.config();
    let store = MemoryStore::default();
    store.fail_put("frontier-icons/v1/ui/icons/icon_04.png");

    let summary = DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.uploaded(), 10);
    let failure = summary.failures().next().unwrap();
    assert_eq!(failure.relative_path, "ui/icons/icon_04.png");

    assert!(store.object("frontier-icons/v1/frontier_assets.json").is_some());
    assert!(store.object("frontier-icons/latest/frontier_assets.json").is_some());
}

#[tokio::test]
async fn test_remote_lookup_failure_is_reported_not_guessed() {
    let fixture = Fixture::with_icons(2);
    let config = fixture.config();
    let store = MemoryStore::default();
    store.fail_head("frontier-icons/v1/ui/icons/icon_00.png");

    let summary = DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap();

    assert!(matches!(
        &summary.assets[0].status,
        AssetStatus::Failed { error } if error.contains("Failed to query remote object")
    ));
    assert_eq!(summary.uploaded(), 1);
    assert!(store.object("frontier-icons/v1/ui/icons/icon_00.png").is_none());
}

#[tokio::test]
async fn test_versioned_manifest_failure_is_fatal() {
    let fixture = Fixture::with_icons(3);
    let config = fixture.config();
    let store = MemoryStore::default();
    store.fail_put("frontier-icons/v1/frontier_assets.json");

    let err = DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DeployError::Upload { ref key, .. } if key == "frontier-icons/v1/frontier_assets.json"
    ));
    // The pointer must not move to a version without a manifest.
    assert!(store.object("frontier-icons/latest/frontier_assets.json").is_none());
}

#[tokio::test]
async fn test_latest_manifest_failure_is_fatal() {
    let fixture = Fixture::with_icons(1);
    let config = fixture.config();
    let store = MemoryStore::default();
    store.fail_put("frontier-icons/latest/frontier_assets.json");

    let result = DeploymentPublisher::new(store.clone(), &config).run().await;
    assert!(matches!(result, Err(DeployError::Upload { .. })));
}

#[tokio::test]
async fn test_dry_run_decides_but_never_writes() {
    let fixture = Fixture::with_icons(2);
    let store = MemoryStore::default();
    let config = ConfigInput {
        dry_run: true,
        setup_cors: true,
        ..fixture.input()
    }
    .resolve(chrono::Utc::now())
    .unwrap();

    let summary = DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap();

    assert!(summary.dry_run);
    assert!(!summary.manifests_published);
    assert_eq!(summary.uploaded(), 2);
    assert!(summary.assets.iter().all(|a| a.status
        == AssetStatus::WouldUpload {
            reason: UploadReason::New
        }));
    let cors = summary.cors.unwrap();
    assert!(!cors.applied);
    assert_eq!(cors.policy.allowed_origins, vec!["*"]);

    assert_eq!(store.heads.load(Ordering::SeqCst), 2);
    assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    assert!(store.cors.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_dry_run_still_reports_read_errors() {
    let fixture = Fixture::with_icons(1);
    let store = MemoryStore::default();
    let config = ConfigInput {
        dry_run: true,
        ..fixture.input()
    }
    .resolve(chrono::Utc::now())
    .unwrap();
    std::fs::write(config.manifest_path.clone(), "not json").unwrap();

    let err = DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::Manifest(ManifestError::Parse(_))));
}

#[tokio::test]
async fn test_cors_is_applied_before_assets() {
    let fixture = Fixture::with_icons(1);
    let store = MemoryStore::default();
    let config = ConfigInput {
        setup_cors: true,
        cors_origins: vec!["https://game.example.com".to_string()],
        ..fixture.input()
    }
    .resolve(chrono::Utc::now())
    .unwrap();

    let summary = DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap();

    assert!(summary.cors.unwrap().applied);
    let applied = store.cors.lock().unwrap().clone().unwrap();
    assert_eq!(applied.allowed_origins, vec!["https://game.example.com"]);
    assert_eq!(applied.allowed_methods, vec!["GET", "HEAD"]);
}

#[tokio::test]
async fn test_requested_cors_failure_aborts_before_uploads() {
    let fixture = Fixture::with_icons(2);
    let store = MemoryStore::default();
    *store.fail_cors.lock().unwrap() = true;
    let config = ConfigInput {
        setup_cors: true,
        ..fixture.input()
    }
    .resolve(chrono::Utc::now())
    .unwrap();

    let err = DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::Cors(_)));
    assert_eq!(store.puts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_manifest_fails_before_network() {
    let fixture = Fixture::with_icons(2);
    let config = fixture.config();
    std::fs::write(&config.manifest_path, "[1, 2]").unwrap();
    let store = MemoryStore::default();

    let err = DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::Manifest(ManifestError::NotAnObject)));
    assert_eq!(store.heads.load(Ordering::SeqCst), 0);
    assert_eq!(store.puts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concurrent_uploads_keep_order_and_counts() {
    let fixture = Fixture::with_icons(20);
    let store = MemoryStore::default();
    store.fail_put("frontier-icons/v1/ui/icons/icon_07.png");
    store.fail_put("frontier-icons/v1/ui/icons/icon_13.png");
    let config = ConfigInput {
        concurrency: 4,
        ..fixture.input()
    }
    .resolve(chrono::Utc::now())
    .unwrap();

    let summary = DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.uploaded(), 18);
    assert_eq!(summary.failed(), 2);
    let paths: Vec<&str> = summary
        .assets
        .iter()
        .map(|a| a.relative_path.as_str())
        .collect();
    let expected: Vec<String> = (0..20).map(|i| format!("ui/icons/icon_{i:02}.png")).collect();
    assert_eq!(paths, expected);
}

#[cfg(unix)]
#[tokio::test]
async fn test_dangling_symlink_is_counted_and_the_run_continues() {
    let fixture = Fixture::with_icons(3);
    let broken = fixture.assets().join("ui/icons/broken.png");
    std::os::unix::fs::symlink(fixture.assets().join("ui/icons/missing.png"), &broken).unwrap();
    let config = fixture.config();
    let store = MemoryStore::default();

    let summary = DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.assets.len(), 4);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.uploaded(), 3);
    let failure = summary.failures().next().unwrap();
    assert_eq!(failure.relative_path, "ui/icons/broken.png");
    assert_eq!(failure.key.to_string(), "frontier-icons/v1/ui/icons/broken.png");

    assert!(summary.manifests_published);
    assert!(store.object("frontier-icons/v1/frontier_assets.json").is_some());
    assert!(store.object("frontier-icons/latest/frontier_assets.json").is_some());
    assert!(store.object("frontier-icons/v1/ui/icons/broken.png").is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn test_unreadable_asset_root_fails_the_run() {
    let fixture = Fixture::with_icons(2);
    let config = fixture.config();
    std::fs::remove_dir_all(fixture.assets()).unwrap();
    let store = MemoryStore::default();

    let err = DeploymentPublisher::new(store.clone(), &config)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::Walk { .. }));
    assert!(store.object("frontier-icons/v1/frontier_assets.json").is_none());
}
