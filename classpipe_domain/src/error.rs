// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A single hierarchical error type for the pipeline domain, organized around
//! the error kinds a stage worker or the orchestrator must distinguish between:
//! not-found, invalid-state, validation, transient, external, fatal, and
//! configuration. Stage workers translate `Transient` into bounded retries;
//! every other kind is surfaced to the orchestrator, which decides based on
//! the job's retry budget.
//!
//! TOML/YAML parsing and `sqlx::Error` conversions are deliberately NOT
//! implemented here — those are infrastructure concerns, and repositories map
//! their own storage errors to the appropriate variant (usually `Transient`).
//! The domain only converts from `std::io::Error` and `serde_json::Error`.

use thiserror::Error;

/// Domain-specific errors for the pipeline processing system.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// A referenced parent entity does not exist (e.g. assembling an upload session
    /// whose ClassSession was deleted).
    #[error("not found: {0}")]
    NotFound(String),

    /// An operation was attempted against an entity whose current state forbids it
    /// (e.g. uploading a chunk to a terminal UploadSession).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Input failed validation: size limits, checksum mismatch, unsupported format.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A transient failure: I/O timeout, 5xx, disconnect. Retriable with backoff.
    #[error("transient failure: {0}")]
    Transient(String),

    /// A downstream service rejected the request. Recorded as a warning if the
    /// caller treats the failure as partial; otherwise fatal.
    #[error("external failure: {0}")]
    External(String),

    /// Exceeded retry budget, cancellation, or data corruption. Terminal.
    #[error("fatal: {0}")]
    Fatal(String),

    /// Missing or invalid configuration. The service refuses to start.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PipelineError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        Self::External(msg.into())
    }

    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether a stage worker should retry the operation rather than surface it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PipelineError::Transient(_))
    }

    /// Whether the failure should be recorded as a job-owning warning instead of
    /// failing the whole operation (only meaningful for `External`; callers that
    /// treat a source as required still propagate it as fatal).
    pub fn is_partial_candidate(&self) -> bool {
        matches!(self, PipelineError::External(_))
    }

    pub fn category(&self) -> &'static str {
        match self {
            PipelineError::NotFound(_) => "not_found",
            PipelineError::InvalidState(_) => "invalid_state",
            PipelineError::Validation(_) => "validation",
            PipelineError::Transient(_) => "transient",
            PipelineError::External(_) => "external",
            PipelineError::Fatal(_) => "fatal",
            PipelineError::Configuration(_) => "configuration",
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Transient(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_is_recoverable() {
        assert!(PipelineError::transient("timeout").is_recoverable());
        assert!(!PipelineError::fatal("boom").is_recoverable());
    }

    #[test]
    fn category_matches_variant() {
        assert_eq!(PipelineError::not_found("x").category(), "not_found");
        assert_eq!(PipelineError::configuration("x").category(), "configuration");
    }

    #[test]
    fn io_error_converts_to_transient() {
        let io_err = std::io::Error::other("disk full");
        let err: PipelineError = io_err.into();
        assert!(matches!(err, PipelineError::Transient(_)));
    }
}
