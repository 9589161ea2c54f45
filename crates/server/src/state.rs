//! Application state shared across handlers.

use crate::codec::ImageCodec;
use crate::engine::DerivativeEngine;
use crate::response::ResponseEmitter;
use prism_core::config::AppConfig;
use prism_storage::ObjectStore;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Object storage holding sources and derivatives.
    pub storage: Arc<dyn ObjectStore>,
    pub engine: Arc<DerivativeEngine>,
    pub emitter: Arc<ResponseEmitter>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn ObjectStore>,
        codec: Arc<dyn ImageCodec>,
    ) -> Self {
        let engine = DerivativeEngine::new(storage.clone(), codec);
        let emitter = ResponseEmitter::from_config(&config.server);
        Self {
            config: Arc::new(config),
            storage,
            engine: Arc::new(engine),
            emitter: Arc::new(emitter),
        }
    }
}
