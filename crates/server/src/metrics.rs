//! Prometheus metrics for the Prism server.
//!
//! The `/metrics` endpoint is unauthenticated and only mounted when
//! `server.metrics_enabled` is set. Keep it off public networks.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Request outcomes
pub static OUTCOMES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "prism_outcomes_total",
            "Derivative requests by outcome (pass_through, redirect, error_fallback)",
        ),
        &["outcome"],
    )
    .expect("metric creation failed")
});

pub static DERIVE_ERRORS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "prism_derive_errors_total",
            "Derivation failures by error kind",
        ),
        &["kind"],
    )
    .expect("metric creation failed")
});

// Pipeline steps
pub static STEPS_GENERATED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "prism_steps_generated_total",
            "Derivation steps written to storage, by stage",
        ),
        &["stage"],
    )
    .expect("metric creation failed")
});

pub static STEPS_SKIPPED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "prism_steps_skipped_total",
        "Derivation steps skipped because their object already existed",
    )
    .expect("metric creation failed")
});

pub static ORIGINAL_KEPT: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "prism_original_kept_total",
        "Steps that stored their source because re-encoding made it larger",
    )
    .expect("metric creation failed")
});

// Latency
pub static DERIVE_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "prism_derive_duration_seconds",
            "Time to resolve a derivative request, by outcome",
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["outcome"],
    )
    .expect("metric creation failed")
});

static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so tests can build many routers.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(OUTCOMES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(DERIVE_ERRORS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(STEPS_GENERATED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(STEPS_SKIPPED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ORIGINAL_KEPT.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(DERIVE_DURATION.clone()))
            .expect("metric registration failed");
    });
}

/// Handler for the `/metrics` endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Record a derivation failure by kind.
pub fn record_derive_error(kind: &str) {
    DERIVE_ERRORS.with_label_values(&[kind]).inc();
}
