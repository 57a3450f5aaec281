//! Job error types.
//!
//! Errors are grouped by where they surface:
//!
//! | Category | Variants | Channel |
//! |----------|----------|---------|
//! | **Property** | `ReadOnly`, `PropertyType`, `UnknownProperty` | returned synchronously by `Job::set` / parsing |
//! | **Execution** | `Function`, `Failed` | run handle rejection |
//! | **Cancellation** | `Cancelled` | run handle rejection |
//! | **Lifecycle** | `AlreadyStarted`, `Aborted` | run handle rejection |
//! | **Config** | `Configuration` | returned by `JobConfig::from_json` |

use thiserror::Error;

use crate::property::Property;

/// Boxed error produced by a job function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Message carried by [`JobError::Cancelled`].
pub const CANCELED_MESSAGE: &str = "Job canceled by user";

/// Errors that can occur while configuring or running a mock job.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JobError {
    // ── Property errors ──────────────────────────────────────────────
    /// Attempted to write a read-only property.
    #[error("Cannot write read-only property `{0}`")]
    ReadOnly(Property),

    /// Value of the wrong kind for a writable property.
    #[error("Property `{property}` expects {expected}")]
    PropertyType {
        /// Property being written.
        property: Property,
        /// Human-readable description of the accepted value.
        expected: &'static str,
    },

    /// Property name does not exist.
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    // ── Execution errors ─────────────────────────────────────────────
    /// The job function itself failed.
    #[error("Job function failed: {0}")]
    Function(#[source] BoxError),

    /// Simulated failure from the random draw.
    #[error("Job failed: {0}")]
    Failed(String),

    // ── Cancellation ─────────────────────────────────────────────────
    /// The run was cancelled before it settled.
    #[error("Job canceled by user")]
    Cancelled,

    // ── Lifecycle errors ─────────────────────────────────────────────
    /// `run()` was called on a job that already started.
    #[error("Job already started: {0}")]
    AlreadyStarted(String),

    /// The completion task went away without settling the run.
    #[error("Job run was aborted before it settled")]
    Aborted,

    // ── Config errors ────────────────────────────────────────────────
    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl JobError {
    /// Returns `true` if the run settled through the cancellation path.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` if the job function or the failure draw rejected the run.
    pub fn is_execution_failure(&self) -> bool {
        matches!(self, Self::Function(_) | Self::Failed(_))
    }
}

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_message() {
        assert_eq!(JobError::Cancelled.to_string(), CANCELED_MESSAGE);
        assert!(JobError::Cancelled.is_cancellation());
        assert!(!JobError::Cancelled.is_execution_failure());
    }

    #[test]
    fn test_execution_failures() {
        let err = JobError::Function("boom".into());
        assert!(err.is_execution_failure());
        assert_eq!(err.to_string(), "Job function failed: boom");
        assert!(std::error::Error::source(&err).is_some());

        assert!(JobError::Failed("simulated".into()).is_execution_failure());
        assert!(!JobError::Aborted.is_execution_failure());
    }

    #[test]
    fn test_error_display() {
        let err = JobError::ReadOnly(Property::StartTime);
        assert_eq!(err.to_string(), "Cannot write read-only property `startTime`");

        let err = JobError::PropertyType {
            property: Property::Delay,
            expected: "a duration",
        };
        assert_eq!(err.to_string(), "Property `delay` expects a duration");
    }
}
