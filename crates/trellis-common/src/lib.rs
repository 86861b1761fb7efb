//! Common types for trellis: errors, YAML canonicalization, templating and logging

#![deny(missing_docs)]

pub mod error;
pub mod telemetry;
pub mod template;
pub mod yaml;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
