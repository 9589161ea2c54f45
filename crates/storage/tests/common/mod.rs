use bytes::Bytes;
use prism_storage::FilesystemBackend;
use tempfile::TempDir;

/// Filesystem store rooted in a temporary directory.
pub struct TestStorage {
    pub backend: FilesystemBackend,
    _dir: TempDir,
}

impl TestStorage {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let backend = FilesystemBackend::new(dir.path())
            .await
            .expect("failed to create filesystem backend");
        Self { backend, _dir: dir }
    }
}

/// Deterministic pseudo-random payload; same seed, same bytes.
#[allow(dead_code)]
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    let mut state = seed;
    let data = (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as u8
        })
        .collect::<Vec<_>>();
    Bytes::from(data)
}
