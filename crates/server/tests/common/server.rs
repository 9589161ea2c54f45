//! Server test utilities.

use bytes::Bytes;
use prism_core::config::{AppConfig, StorageConfig};
use prism_server::{AppState, RasterCodec, create_router};
use prism_storage::{FilesystemBackend, ObjectStore, PutOptions};
use std::sync::Arc;
use tempfile::TempDir;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary filesystem storage.
    pub async fn new() -> Self {
        Self::with_config(AppConfig::for_testing()).await
    }

    /// Create a test server from `config`; the storage section is replaced
    /// with a temporary directory.
    pub async fn with_config(mut config: AppConfig) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let storage_path = temp_dir.path().join("storage");
        let storage: Arc<dyn ObjectStore> = Arc::new(
            FilesystemBackend::new(&storage_path)
                .await
                .expect("Failed to create storage backend"),
        );
        config.storage = StorageConfig::Filesystem { path: storage_path };

        prism_server::metrics::register_metrics();

        let codec = Arc::new(RasterCodec::new(&config.codec));
        let state = AppState::new(config, storage, codec);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Upload a source object.
    pub async fn put_source(&self, key: &str, data: Bytes) {
        self.state
            .storage
            .put(key, data, &PutOptions::default())
            .await
            .expect("Failed to store source");
    }
}
