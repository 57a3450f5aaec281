//! Job Mock — a deterministic, configurable stand-in for asynchronous background jobs
//!
//! This crate provides a [`Job`] that behaves like a unit of background work
//! without running any: it completes after a configurable delay, fails with a
//! configurable probability, and can be cancelled while in flight. Test suites
//! use it to exercise timing windows, success/failure handling and
//! cancellation races in code that consumes jobs.
//!
//! # Overview
//!
//! The crate defines:
//! - [`Job`] with its property contract and execution lifecycle
//! - [`RunHandle`] / [`CancelHandle`] futures returned by `run` and `cancel`
//! - [`JobFn`] for the caller-supplied stand-in work
//! - [`JobId`] / [`JobStatus`] / [`JobSnapshot`] for job tracking
//! - [`Property`] / [`PropertyValue`] for by-name property access
//! - [`JobConfig`] for declarative construction
//! - [`JobError`] with property, execution, cancellation and lifecycle variants
//!
//! # Lifecycle
//!
//! ```text
//!   new() ──→ set_*() ──→ run(args) ──→ Completed | Failed | Cancelled
//!   (idle)     (idle)     (running)       (terminal, exactly once)
//! ```
//!
//! ```ignore
//! use job_mock::{Job, func};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! let job = Job::new("email")
//!     .with_delay(Duration::from_millis(1000))
//!     .with_fn(func::from_fn(|args| Ok(json!(args.len()))));
//!
//! let run = job.run(vec![json!("to@example.com")]);
//! assert!(job.cancel(Duration::from_millis(10)).await);
//! assert!(run.await.unwrap_err().is_cancellation());
//! ```

pub mod config;
pub mod error;
pub mod func;
pub mod job;
pub mod mock;
pub mod property;

pub use config::{DEFAULT_DELAY, DEFAULT_FAIL_PROB, DEFAULT_JOB_TYPE, JobConfig};
pub use error::{BoxError, CANCELED_MESSAGE, JobError, JobResult};
pub use func::JobFn;
pub use job::{JobId, JobSnapshot, JobStatus};
pub use mock::{CancelHandle, Job, RunHandle};
pub use property::{Property, PropertyValue};
