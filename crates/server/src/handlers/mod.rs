//! HTTP request handlers.

pub mod edge;
pub mod health;
pub mod media;

pub use edge::*;
pub use health::*;
pub use media::*;
