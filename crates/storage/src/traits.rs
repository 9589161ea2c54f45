//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;

/// HTTP-facing attributes written alongside an object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
}

impl PutOptions {
    /// Options for an immutable public image.
    pub fn image(content_type: &str, cache_control: String) -> Self {
        Self {
            content_type: Some(content_type.to_string()),
            cache_control: Some(cache_control),
        }
    }
}

/// Object store holding uploaded sources and generated derivatives.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Check if an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get an object's content.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Put an object atomically, replacing any existing value.
    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> StorageResult<()>;

    /// Name of this backend, for logs and metrics.
    fn backend_name(&self) -> &'static str;

    /// Verify storage backend connectivity.
    ///
    /// Called at startup before accepting requests.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
