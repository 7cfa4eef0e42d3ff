//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `WhError` as one variant
//! where they need to surface a core failure.

use thiserror::Error;

use crate::AgentId;

/// The top-level error type for `wh-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum WhError {
    #[error("{0} not found")]
    AgentNotFound(AgentId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `wh-*` crates.
pub type WhResult<T> = Result<T, WhError>;
