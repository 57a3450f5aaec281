//! Job lifecycle types.
//!
//! The job state machine:
//!
//! ```text
//!   run() ──→ Idle ──→ Running ──→ Completed
//!                         │
//!                         ├──→ Failed(reason)
//!                         │
//!                         └──→ Cancelled
//! ```
//!
//! **Invariants:**
//! - A job leaves `Idle` only through `run()`.
//! - Transitions are monotonic — a job never moves backward.
//! - Terminal states (`Completed`, `Failed`, `Cancelled`) are permanent.
//! - `done_time` is set only for `Completed`/`Failed`, `cancel_time` only for `Cancelled`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Generate a fresh random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for JobId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Status of a job.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JobStatus {
    /// Job has not been run yet.
    #[default]
    Idle,
    /// Job is waiting out its delay or awaiting its function.
    Running,
    /// Job completed successfully.
    Completed,
    /// Job failed with an error message.
    Failed(String),
    /// Job was cancelled.
    Cancelled,
}

impl JobStatus {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed(_) | JobStatus::Cancelled
        )
    }

    /// Check if the job is inside its cancellation window.
    pub fn is_running(&self) -> bool {
        matches!(self, JobStatus::Running)
    }

    /// Check if the job completed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Idle => write!(f, "Idle"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Failed(msg) => write!(f, "Failed: {msg}"),
            JobStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Point-in-time audit record of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub id: JobId,
    pub name: String,
    pub job_type: String,
    pub delay_ms: u64,
    pub fail_prob: f64,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_time: Option<DateTime<Utc>>,
    /// Elapsed time from start to settlement, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_time_ms: Option<u64>,
}

/// Convert a duration to whole milliseconds, saturating at `u64::MAX`.
pub(crate) fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_terminal() {
        assert!(!JobStatus::Idle.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed("error".into()).is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_job_status_running() {
        assert!(JobStatus::Running.is_running());
        assert!(!JobStatus::Idle.is_running());
        assert!(!JobStatus::Cancelled.is_running());
        assert!(JobStatus::Completed.is_success());
        assert_eq!(JobStatus::default(), JobStatus::Idle);
    }

    #[test]
    fn test_job_status_display() {
        assert_eq!(JobStatus::Idle.to_string(), "Idle");
        assert_eq!(JobStatus::Running.to_string(), "Running");
        assert_eq!(
            JobStatus::Failed("timeout".into()).to_string(),
            "Failed: timeout"
        );
    }

    #[test]
    fn test_job_id_unique() {
        let a = JobId::new();
        let b = JobId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), a.0.to_string());
    }

    #[test]
    fn test_snapshot_skips_unset_times() {
        let snapshot = JobSnapshot {
            id: JobId::new(),
            name: "email_x".into(),
            job_type: "email".into(),
            delay_ms: 10,
            fail_prob: 0.0,
            status: JobStatus::Idle,
            start_time: None,
            done_time: None,
            cancel_time: None,
            run_time_ms: None,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["delayMs"], 10);
        assert_eq!(json["status"], "Idle");
        assert!(json.get("startTime").is_none());
        assert!(json.get("runTimeMs").is_none());
    }

    #[test]
    fn test_as_millis() {
        assert_eq!(as_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(as_millis(Duration::MAX), u64::MAX);
    }
}
