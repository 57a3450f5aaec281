//! Job configuration.
//!
//! ```json
//! { "jobType": "email", "delayMs": 10, "failProb": 0.0, "seed": 42 }
//! ```
//!
//! Every field is optional; missing fields take the job defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{JobError, JobResult};
use crate::mock::Job;

/// Job type used when none is given.
pub const DEFAULT_JOB_TYPE: &str = "email";

/// Simulated work duration used when none is given.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(10);

/// Failure probability used when none is given.
pub const DEFAULT_FAIL_PROB: f64 = 0.0;

/// Declarative description of a mock job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobConfig {
    /// Type prefix of the job name.
    pub job_type: String,
    /// Simulated work duration in milliseconds.
    pub delay_ms: u64,
    /// Probability that the simulated work fails.
    pub fail_prob: f64,
    /// Seed for the failure draw. `None` seeds from OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            job_type: DEFAULT_JOB_TYPE.to_string(),
            delay_ms: crate::job::as_millis(DEFAULT_DELAY),
            fail_prob: DEFAULT_FAIL_PROB,
            seed: None,
        }
    }
}

impl JobConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> JobResult<Self> {
        serde_json::from_str(json).map_err(|e| JobError::Configuration(e.to_string()))
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Build a job from this configuration.
    pub fn build(&self) -> Job {
        Job::from_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = JobConfig::default();
        assert_eq!(config.job_type, "email");
        assert_eq!(config.delay(), Duration::from_millis(10));
        assert_eq!(config.fail_prob, 0.0);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_from_json_partial() {
        let config = JobConfig::from_json(r#"{"jobType": "sms", "seed": 7}"#).unwrap();
        assert_eq!(config.job_type, "sms");
        assert_eq!(config.delay_ms, 10);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_from_json_invalid() {
        let err = JobConfig::from_json(r#"{"delayMs": "soon"}"#).unwrap_err();
        assert!(matches!(err, JobError::Configuration(_)));
    }

    #[test]
    fn test_build() {
        let config = JobConfig {
            job_type: "report".into(),
            delay_ms: 250,
            fail_prob: 0.25,
            seed: Some(1),
        };
        let job = config.build();
        assert!(job.name().starts_with("report_"));
        assert_eq!(job.delay(), Duration::from_millis(250));
        assert_eq!(job.fail_prob(), 0.25);
    }
}
