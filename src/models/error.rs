//! Error types for linkrisk.
//!
//! Epistemic taxonomy:
//! - B_i falsified: Expected failures (bad configuration, inconsistent data)
//! - I^B materialized: Infrastructure failures (filesystem)
//! - K_i violated: Internal invariant violations (bugs)
//!
//! Nothing in this crate catches and suppresses an error: a silently wrong
//! experimental setup invalidates every privacy measurement computed
//! downstream, so all failures propagate to the driver and abort the run.

use thiserror::Error;

/// Top-level error type for linkrisk.
#[derive(Debug, Error)]
pub enum LinkriskError {
    // ═══════════════════════════════════════════════════════════════════
    // B_i FALSIFIED — Belief proven wrong (expected failures)
    // ═══════════════════════════════════════════════════════════════════

    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    /// Loaded data contradicts what the run configuration assumes
    /// (e.g. a pinned target identifier absent from the population index).
    #[error("Data consistency error: {0}")]
    DataConsistency(String),

    #[error("Parse error: {0}")]
    Parse(String),

    // ═══════════════════════════════════════════════════════════════════
    // I^B MATERIALIZED — Bounded ignorance became known-bad
    // ═══════════════════════════════════════════════════════════════════

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // ═══════════════════════════════════════════════════════════════════
    // K_i VIOLATED — Invariant broken (bug, should not happen)
    // ═══════════════════════════════════════════════════════════════════

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LinkriskError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a data-consistency error.
    pub fn data(message: impl Into<String>) -> Self {
        Self::DataConsistency(message.into())
    }
}

/// Result type alias for linkrisk.
pub type Result<T> = std::result::Result<T, LinkriskError>;
