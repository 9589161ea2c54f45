//! In-memory store and scripted codec for pipeline tests.

use async_trait::async_trait;
use bytes::Bytes;
use prism_core::ImageFormat;
use prism_server::codec::{CodecError, CodecResult, ImageCodec};
use prism_storage::{ObjectStore, PutOptions, StorageError, StorageResult};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Object store backed by a `HashMap`, with call logs and failure injection.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, (Bytes, PutOptions)>>,
    failing_lookups: Mutex<HashSet<String>>,
    failing_puts: Mutex<HashSet<String>>,
    puts: Mutex<Vec<String>>,
    gets: Mutex<Vec<String>>,
    lookups: AtomicUsize,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object.
    pub fn insert(&self, key: &str, data: impl Into<Bytes>) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data.into(), PutOptions::default()));
    }

    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).map(|(b, _)| b.clone())
    }

    pub fn options(&self, key: &str) -> Option<PutOptions> {
        self.objects.lock().unwrap().get(key).map(|(_, o)| o.clone())
    }

    /// Make `exists` fail for `key`.
    pub fn fail_exists(&self, key: &str) {
        self.failing_lookups.lock().unwrap().insert(key.to_string());
    }

    /// Make `put` fail for `key`. Failed writes are not logged.
    pub fn fail_put(&self, key: &str) {
        self.failing_puts.lock().unwrap().insert(key.to_string());
    }

    /// Keys written, in order.
    pub fn put_keys(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }

    /// Keys read, in order.
    pub fn get_keys(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }

    /// Number of `exists` calls.
    pub fn exists_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing_lookups.lock().unwrap().contains(key) {
            return Err(StorageError::Io(std::io::Error::other("lookup failed")));
        }
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.gets.lock().unwrap().push(key.to_string());
        self.object(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> StorageResult<()> {
        if self.failing_puts.lock().unwrap().contains(key) {
            return Err(StorageError::Io(std::io::Error::other("write failed")));
        }
        self.puts.lock().unwrap().push(key.to_string());
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, options.clone()));
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Codec that records calls and returns scripted payloads.
///
/// By default every operation returns its input unchanged.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeCodec {
    ops: Mutex<Vec<String>>,
    encoded: Option<Bytes>,
    fail_encode: bool,
}

#[allow(dead_code)]
impl FakeCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `payload` from every encode and recompress.
    pub fn with_encoded(payload: impl Into<Bytes>) -> Self {
        Self {
            encoded: Some(payload.into()),
            ..Self::default()
        }
    }

    /// Fail every encode with a decode error.
    pub fn failing() -> Self {
        Self {
            fail_encode: true,
            ..Self::default()
        }
    }

    /// Operations performed, e.g. `resize 300x-`, `encode jpg`.
    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    fn record(&self, op: String) {
        self.ops.lock().unwrap().push(op);
    }
}

fn axis(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

#[async_trait]
impl ImageCodec for FakeCodec {
    async fn resize(
        &self,
        data: Bytes,
        width: Option<u32>,
        height: Option<u32>,
    ) -> CodecResult<Bytes> {
        self.record(format!("resize {}x{}", axis(width), axis(height)));
        Ok(data)
    }

    async fn encode(&self, data: Bytes, format: ImageFormat) -> CodecResult<Bytes> {
        self.record(format!("encode {format}"));
        if self.fail_encode {
            return Err(CodecError::Decode("scripted failure".to_string()));
        }
        Ok(self.encoded.clone().unwrap_or(data))
    }

    async fn recompress(&self, data: Bytes, format: ImageFormat) -> CodecResult<Bytes> {
        self.record(format!("recompress {format}"));
        Ok(self.encoded.clone().unwrap_or(data))
    }
}
