//! Materializing a single derivation step.

use crate::codec::ImageCodec;
use crate::error::DeriveError;
use crate::metrics;
use bytes::Bytes;
use prism_core::{DerivationStep, ImageFormat, cache_control};
use prism_storage::{ObjectStore, PutOptions};
use std::sync::Arc;
use tracing::instrument;

/// Result of materializing a step.
#[derive(Clone, Debug)]
pub struct Materialized {
    /// Bytes written to the destination key.
    pub bytes: Bytes,
    /// Whether the source was stored unchanged because re-encoding grew it.
    pub kept_original: bool,
}

/// Reads a step's source, transforms it and writes the destination.
#[derive(Clone)]
pub struct TransformEngine {
    store: Arc<dyn ObjectStore>,
    codec: Arc<dyn ImageCodec>,
}

impl TransformEngine {
    pub fn new(store: Arc<dyn ObjectStore>, codec: Arc<dyn ImageCodec>) -> Self {
        Self { store, codec }
    }

    /// Run one step: fetch, resize if commanded, encode, recompress, store.
    ///
    /// When a step neither resizes nor converts to WebP and the encoded
    /// payload ends up larger than the source, the source bytes are stored
    /// instead.
    #[instrument(skip(self, step), fields(stage = step.stage.as_str(), key = %step.destination_key))]
    pub async fn materialize(&self, step: &DerivationStep) -> Result<Materialized, DeriveError> {
        let source = self
            .store
            .get(&step.source_key)
            .await
            .map_err(|e| DeriveError::storage(&step.source_key, e))?;

        let mut working = source.clone();
        if let Some((width, height)) = step.resize_target() {
            working = self.codec.resize(working, width, height).await?;
        }
        working = self.codec.encode(working, step.format).await?;
        if step.format != ImageFormat::Webp {
            working = self.codec.recompress(working, step.format).await?;
        }

        let kept_original = step.format != ImageFormat::Webp
            && !step.has_dimensions()
            && working.len() > source.len();
        let payload = if kept_original {
            tracing::debug!(
                source_bytes = source.len(),
                encoded_bytes = working.len(),
                "re-encoded payload larger than source, keeping source"
            );
            metrics::ORIGINAL_KEPT.inc();
            source
        } else {
            working
        };

        let options = PutOptions::image(step.format.mime_type(), cache_control(step.max_age));
        self.store
            .put(&step.destination_key, payload.clone(), &options)
            .await
            .map_err(|e| DeriveError::storage(&step.destination_key, e))?;

        metrics::STEPS_GENERATED
            .with_label_values(&[step.stage.as_str()])
            .inc();
        tracing::debug!(bytes = payload.len(), "step materialized");

        Ok(Materialized {
            bytes: payload,
            kept_original,
        })
    }
}
