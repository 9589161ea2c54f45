//! Request orchestration: parse, plan, short-circuit, decide, transform.

use crate::codec::ImageCodec;
use crate::decision::{Decision, decide};
use crate::error::DeriveError;
use crate::existence::remaining_steps;
use crate::metrics;
use crate::response::Outcome;
use crate::transform::TransformEngine;
use prism_core::{DerivationPlan, MediaRequest};
use prism_storage::ObjectStore;
use std::sync::Arc;
use std::time::Instant;

/// Turns request paths into outcomes.
#[derive(Clone)]
pub struct DerivativeEngine {
    store: Arc<dyn ObjectStore>,
    transform: TransformEngine,
}

impl DerivativeEngine {
    pub fn new(store: Arc<dyn ObjectStore>, codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            transform: TransformEngine::new(store.clone(), codec),
            store,
        }
    }

    /// Resolve `uri` to exactly one outcome.
    ///
    /// Failures of any kind are logged and become the error fallback.
    pub async fn handle(&self, uri: &str) -> Outcome {
        let started = Instant::now();
        let outcome = match self.run(uri).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(uri, kind = e.kind(), error = %e, "derivation failed");
                metrics::record_derive_error(e.kind());
                Outcome::ErrorFallback
            }
        };

        metrics::OUTCOMES.with_label_values(&[outcome.kind()]).inc();
        metrics::DERIVE_DURATION
            .with_label_values(&[outcome.kind()])
            .observe(started.elapsed().as_secs_f64());
        outcome
    }

    async fn run(&self, uri: &str) -> Result<Outcome, DeriveError> {
        let request = MediaRequest::parse(uri)?;
        let plan = DerivationPlan::build(&request)?;

        // Plans always carry at least the origin step.
        let Some(terminal) = plan.terminal() else {
            return Ok(Outcome::ErrorFallback);
        };
        let object_key = terminal.destination_key.clone();
        let format = terminal.format;

        let steps = remaining_steps(self.store.as_ref(), &plan).await;
        if steps.is_empty() {
            tracing::debug!(uri, "derivative already present");
        }

        for step in &steps {
            if let Decision::Redirect { path, max_age } = decide(step) {
                tracing::info!(uri, location = %path, "redirecting oversized request");
                return Ok(Outcome::Redirect { path, max_age });
            }
            self.transform.materialize(step).await?;
        }

        Ok(Outcome::PassThrough { object_key, format })
    }
}
