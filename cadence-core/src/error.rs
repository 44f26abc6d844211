//! Error types for the pacing pipeline.
//!
//! The scheduling and reveal paths are infallible by construction; the only
//! fallible surface is configuration parsing, where an unrecognized separator
//! policy must be rejected loudly rather than silently defaulted (a silent
//! default in a pacing system produces timing bugs that are very hard to
//! trace back to their cause).

/// Errors raised while building or updating a [`crate::StreamConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The separator policy string is not one of the recognized values.
    #[error("invalid separator policy `{0}` (expected `word` or `char`)")]
    InvalidSeparatorPolicy(String),
}
