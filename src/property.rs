//! Dynamic property surface of a job.
//!
//! Jobs expose two disjoint attribute sets:
//!
//! | Set | Properties | Writes |
//! |-----|------------|--------|
//! | **Configuration** | `delay`, `failProb`, `fn` | overwrite immediately |
//! | **Lifecycle** | `id`, `name`, `startTime`, `doneTime`, `cancelTime`, `runTime` | rejected with [`JobError::ReadOnly`] |
//!
//! The typed accessors on `Job` enforce this at compile time; [`Property`]
//! and [`PropertyValue`] offer the same contract for callers that address
//! properties by name.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::JobError;
use crate::func::JobFn;
use crate::job::JobId;

/// A named job property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    Id,
    Name,
    Delay,
    FailProb,
    Fn,
    StartTime,
    DoneTime,
    CancelTime,
    RunTime,
}

impl Property {
    /// Every property, configuration set first.
    pub const ALL: [Property; 9] = [
        Property::Delay,
        Property::FailProb,
        Property::Fn,
        Property::Id,
        Property::Name,
        Property::StartTime,
        Property::DoneTime,
        Property::CancelTime,
        Property::RunTime,
    ];

    /// The camelCase name of the property.
    pub fn as_str(self) -> &'static str {
        match self {
            Property::Id => "id",
            Property::Name => "name",
            Property::Delay => "delay",
            Property::FailProb => "failProb",
            Property::Fn => "fn",
            Property::StartTime => "startTime",
            Property::DoneTime => "doneTime",
            Property::CancelTime => "cancelTime",
            Property::RunTime => "runTime",
        }
    }

    /// Check if the property belongs to the writable configuration set.
    pub fn is_writable(self) -> bool {
        matches!(self, Property::Delay | Property::FailProb | Property::Fn)
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Property {
    type Err = JobError;

    /// Accepts both the camelCase and the snake_case spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let property = match s {
            "id" => Property::Id,
            "name" => Property::Name,
            "delay" => Property::Delay,
            "failProb" | "fail_prob" => Property::FailProb,
            "fn" | "func" => Property::Fn,
            "startTime" | "start_time" => Property::StartTime,
            "doneTime" | "done_time" => Property::DoneTime,
            "cancelTime" | "cancel_time" => Property::CancelTime,
            "runTime" | "run_time" => Property::RunTime,
            other => return Err(JobError::UnknownProperty(other.to_string())),
        };
        Ok(property)
    }
}

/// A property value read from or written to a job.
#[derive(Clone)]
pub enum PropertyValue {
    Id(JobId),
    Text(String),
    Delay(Duration),
    Probability(f64),
    Fn(Arc<dyn JobFn>),
    Timestamp(Option<DateTime<Utc>>),
    Elapsed(Option<Duration>),
}

impl std::fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Id(id) => f.debug_tuple("Id").field(id).finish(),
            PropertyValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            PropertyValue::Delay(delay) => f.debug_tuple("Delay").field(delay).finish(),
            PropertyValue::Probability(p) => f.debug_tuple("Probability").field(p).finish(),
            PropertyValue::Fn(_) => f.write_str("Fn(..)"),
            PropertyValue::Timestamp(ts) => f.debug_tuple("Timestamp").field(ts).finish(),
            PropertyValue::Elapsed(e) => f.debug_tuple("Elapsed").field(e).finish(),
        }
    }
}

impl From<Duration> for PropertyValue {
    fn from(delay: Duration) -> Self {
        PropertyValue::Delay(delay)
    }
}

impl From<f64> for PropertyValue {
    fn from(p: f64) -> Self {
        PropertyValue::Probability(p)
    }
}

impl From<Arc<dyn JobFn>> for PropertyValue {
    fn from(f: Arc<dyn JobFn>) -> Self {
        PropertyValue::Fn(f)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(ts: DateTime<Utc>) -> Self {
        PropertyValue::Timestamp(Some(ts))
    }
}

impl From<&str> for PropertyValue {
    fn from(text: &str) -> Self {
        PropertyValue::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writable_set() {
        let writable: Vec<_> = Property::ALL
            .iter()
            .copied()
            .filter(|p| p.is_writable())
            .collect();
        assert_eq!(
            writable,
            vec![Property::Delay, Property::FailProb, Property::Fn]
        );
    }

    #[test]
    fn test_parse_names() {
        for property in Property::ALL {
            assert_eq!(property.as_str().parse::<Property>().unwrap(), property);
        }
        assert_eq!("fail_prob".parse::<Property>().unwrap(), Property::FailProb);
        assert_eq!("run_time".parse::<Property>().unwrap(), Property::RunTime);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "color".parse::<Property>().unwrap_err();
        assert!(matches!(err, JobError::UnknownProperty(ref name) if name == "color"));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Property::CancelTime).unwrap();
        assert_eq!(json, "\"cancelTime\"");
    }

    #[test]
    fn test_value_debug_hides_fn() {
        let value = PropertyValue::Fn(crate::func::noop());
        assert_eq!(format!("{value:?}"), "Fn(..)");
    }
}
