//! Tail-first existence short-circuit.

use crate::metrics;
use prism_core::{DerivationPlan, DerivationStep};
use prism_storage::ObjectStore;

/// Steps of `plan` that still need to be generated, in forward order.
///
/// Scans from the terminal step backwards. A present terminal object means
/// nothing is left to do. Present intermediates are dropped; absent ones are
/// kept. A failed lookup counts as absent, so the step is regenerated.
pub async fn remaining_steps(store: &dyn ObjectStore, plan: &DerivationPlan) -> Vec<DerivationStep> {
    let mut remaining = Vec::with_capacity(plan.len());

    for step in plan.steps().iter().rev() {
        match store.exists(&step.destination_key).await {
            Ok(true) if step.terminal => {
                tracing::debug!(key = %step.destination_key, "terminal object present");
                metrics::STEPS_SKIPPED.inc_by(plan.len() as u64);
                return Vec::new();
            }
            Ok(true) => {
                tracing::debug!(
                    key = %step.destination_key,
                    stage = step.stage.as_str(),
                    "intermediate object present"
                );
                metrics::STEPS_SKIPPED.inc();
            }
            Ok(false) => remaining.push(step.clone()),
            Err(e) => {
                tracing::debug!(
                    key = %step.destination_key,
                    error = %e,
                    "existence check failed, regenerating"
                );
                remaining.push(step.clone());
            }
        }
    }

    remaining.reverse();
    remaining
}
