//! On-demand image derivative engine and its HTTP surface.
//!
//! A request path names a source image, its natural size and optionally a
//! transform command and a WebP rendition. This crate provides:
//! - The derivation pipeline (existence short-circuit, redirect decisions,
//!   transforms)
//! - The image codec capability
//! - Origin mode (`GET /media/{file}`) and edge mode
//!   (`POST /v1/edge/origin-request`)

pub mod codec;
pub mod decision;
pub mod edge;
pub mod engine;
pub mod error;
pub mod existence;
pub mod handlers;
pub mod metrics;
pub mod response;
pub mod routes;
pub mod state;
pub mod transform;

pub use codec::{CodecError, ImageCodec, RasterCodec};
pub use engine::DerivativeEngine;
pub use error::{ApiError, DeriveError};
pub use response::{Outcome, ResponseEmitter};
pub use routes::create_router;
pub use state::AppState;
