/// Configuration serialization and deserialization.
pub mod config;

/// Error kinds.
pub mod error;

/// Provisioning plan types.
pub mod plan;

/// Domain and server type validation.
pub mod validate;

/// Web server auto-detection.
pub mod detect;

/// Interactive prompting.
pub mod prompt;

/// SSL mode resolution.
pub mod ssl;

/// Dependency checks.
pub mod preflight;

/// Real and dry-run side effects.
pub mod effects;

/// Site provisioning steps.
pub mod provision;

/// Resolution and provisioning pipeline.
pub mod pipeline;

/// Utility functions for common operations.
pub mod utils;

/// CLI interface and entry points.
pub mod cli;

pub use error::{Error, Result};
