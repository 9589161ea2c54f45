//! Core domain types and shared logic for the Prism derivative engine.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Media request path grammar
//! - Transform commands, the size ladder and the aspect table
//! - Derivation plans and their storage keys
//! - Shared configuration

pub mod command;
pub mod config;
pub mod error;
pub mod media;
pub mod plan;
pub mod request;

pub use command::{AspectTag, Command, Dimensions, Direction, LADDER};
pub use error::{Error, Result};
pub use media::{ImageFormat, MediaId};
pub use plan::{DerivationPlan, DerivationStep, NaturalSize, RedirectBase, Stage};
pub use request::MediaRequest;

/// Cache lifetime for every generated derivative and permanent redirect: 1 year.
pub const DERIVATIVE_MAX_AGE: u64 = 365 * 86400;

/// Cache lifetime for the error fallback redirect.
pub const ERROR_MAX_AGE: u64 = 10;

/// Render a `Cache-Control` value for immutable public content.
pub fn cache_control(max_age: u64) -> String {
    format!("max-age={max_age},public,immutable")
}
