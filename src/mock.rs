//! The mock job entity.
//!
//! # Execution
//!
//! ```text
//!   run(args) ──→ sleep(delay) ──→ fn(args) ──→ draw < failProb? ──→ settle
//!       │                                                              ▲
//!   cancel(after) ──→ sleep(after) ──→ still running? ─────────────────┘
//! ```
//!
//! `run` and `cancel` each spawn one tokio timer task. Both race to settle
//! the run through the same guard: the run's `oneshot::Sender`, taken at
//! most once under the job's lock. The loser finds it gone and does nothing.
//! Cancellation aborts the completion task, and settling wakes any pending
//! cancel timer, so no timer outlives the run.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::Value;
use tokio::sync::{oneshot, watch};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::config::{DEFAULT_DELAY, DEFAULT_FAIL_PROB, DEFAULT_JOB_TYPE, JobConfig};
use crate::error::{JobError, JobResult};
use crate::func::{self, JobFn};
use crate::job::{JobId, JobSnapshot, JobStatus, as_millis};
use crate::property::{Property, PropertyValue};

type SharedRng = Arc<Mutex<Box<dyn RngCore + Send>>>;
type Settle = oneshot::Sender<JobResult<Value>>;

fn shared_rng<R: RngCore + Send + 'static>(rng: R) -> SharedRng {
    let rng: Box<dyn RngCore + Send> = Box::new(rng);
    Arc::new(Mutex::new(rng))
}

/// Lifecycle fields, written only by `run` and the two timer tasks.
struct Lifecycle {
    status: JobStatus,
    start_time: Option<DateTime<Utc>>,
    started_at: Option<Instant>,
    done_time: Option<DateTime<Utc>>,
    cancel_time: Option<DateTime<Utc>>,
    run_time: Option<Duration>,
    pending: Option<Settle>,
    completion: Option<AbortHandle>,
    settled: watch::Sender<bool>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            status: JobStatus::Idle,
            start_time: None,
            started_at: None,
            done_time: None,
            cancel_time: None,
            run_time: None,
            pending: None,
            completion: None,
            settled: watch::channel(false).0,
        }
    }
}

impl Lifecycle {
    /// Record the terminal transition and hand back the settlement sender.
    ///
    /// Returns `None` unless the job is running and unsettled.
    fn settle(&mut self, status: JobStatus) -> Option<(Settle, Option<AbortHandle>)> {
        if !self.status.is_running() {
            return None;
        }
        let tx = self.pending.take()?;
        let now = Utc::now();
        self.run_time = self.started_at.map(|started| started.elapsed());
        if status == JobStatus::Cancelled {
            self.cancel_time = Some(now);
        } else {
            self.done_time = Some(now);
        }
        self.status = status;
        self.settled.send_replace(true);
        Some((tx, self.completion.take()))
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A simulated unit of asynchronous work.
///
/// Configuration (`delay`, `fail_prob`, `func`) is writable; identity and
/// lifecycle fields are read-only. A job runs at most once.
pub struct Job {
    id: JobId,
    job_type: String,
    name: String,
    delay: Duration,
    fail_prob: f64,
    func: Arc<dyn JobFn>,
    rng: SharedRng,
    state: Arc<Mutex<Lifecycle>>,
}

impl Job {
    /// Create a job of the given type with default configuration.
    pub fn new(job_type: impl Into<String>) -> Self {
        let id = JobId::new();
        let job_type = job_type.into();
        let name = format!("{job_type}_{id}");
        Self {
            id,
            job_type,
            name,
            delay: DEFAULT_DELAY,
            fail_prob: DEFAULT_FAIL_PROB,
            func: func::noop(),
            rng: shared_rng(StdRng::from_entropy()),
            state: Arc::new(Mutex::new(Lifecycle::default())),
        }
    }

    /// Create a job from a declarative configuration.
    pub fn from_config(config: &JobConfig) -> Self {
        let job = Self::new(config.job_type.clone())
            .with_delay(config.delay())
            .with_fail_prob(config.fail_prob);
        match config.seed {
            Some(seed) => job.with_seed(seed),
            None => job,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_fail_prob(mut self, fail_prob: f64) -> Self {
        self.fail_prob = fail_prob;
        self
    }

    pub fn with_fn(mut self, func: Arc<dyn JobFn>) -> Self {
        self.func = func;
        self
    }

    /// Use a seeded generator for the failure draw.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    /// Use a caller-supplied generator for the failure draw.
    pub fn with_rng<R: RngCore + Send + 'static>(mut self, rng: R) -> Self {
        self.rng = shared_rng(rng);
        self
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    /// `"<type>_<id>"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn fail_prob(&self) -> f64 {
        self.fail_prob
    }

    pub fn set_fail_prob(&mut self, fail_prob: f64) {
        self.fail_prob = fail_prob;
    }

    pub fn func(&self) -> &Arc<dyn JobFn> {
        &self.func
    }

    pub fn set_fn(&mut self, func: Arc<dyn JobFn>) {
        self.func = func;
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        lock(&self.state).start_time
    }

    /// Set on success or failure, never on cancellation.
    pub fn done_time(&self) -> Option<DateTime<Utc>> {
        lock(&self.state).done_time
    }

    /// Set only when a cancellation took effect.
    pub fn cancel_time(&self) -> Option<DateTime<Utc>> {
        lock(&self.state).cancel_time
    }

    /// Elapsed time from start to completion or cancellation.
    pub fn run_time(&self) -> Option<Duration> {
        lock(&self.state).run_time
    }

    pub fn status(&self) -> JobStatus {
        lock(&self.state).status.clone()
    }

    /// True strictly between `run()` and the run's terminal settlement.
    pub fn is_running(&self) -> bool {
        lock(&self.state).status.is_running()
    }

    /// Read a property by name.
    pub fn get(&self, property: Property) -> PropertyValue {
        match property {
            Property::Id => PropertyValue::Id(self.id),
            Property::Name => PropertyValue::Text(self.name.clone()),
            Property::Delay => PropertyValue::Delay(self.delay),
            Property::FailProb => PropertyValue::Probability(self.fail_prob),
            Property::Fn => PropertyValue::Fn(Arc::clone(&self.func)),
            Property::StartTime => PropertyValue::Timestamp(self.start_time()),
            Property::DoneTime => PropertyValue::Timestamp(self.done_time()),
            Property::CancelTime => PropertyValue::Timestamp(self.cancel_time()),
            Property::RunTime => PropertyValue::Elapsed(self.run_time()),
        }
    }

    /// Write a property by name.
    ///
    /// Only `delay`, `failProb` and `fn` accept writes. Every other property
    /// fails with [`JobError::ReadOnly`]; a rejected write leaves the job
    /// unchanged.
    pub fn set(&mut self, property: Property, value: PropertyValue) -> JobResult<()> {
        match (property, value) {
            (Property::Delay, PropertyValue::Delay(delay)) => self.set_delay(delay),
            (Property::FailProb, PropertyValue::Probability(p)) => self.set_fail_prob(p),
            (Property::Fn, PropertyValue::Fn(func)) => self.set_fn(func),
            (property, _) if !property.is_writable() => {
                return Err(JobError::ReadOnly(property));
            }
            (property, _) => {
                let expected = match property {
                    Property::Delay => "a duration",
                    Property::FailProb => "a probability",
                    _ => "a job function",
                };
                return Err(JobError::PropertyType { property, expected });
            }
        }
        Ok(())
    }

    /// Capture the job's current state for audit output.
    pub fn snapshot(&self) -> JobSnapshot {
        let lc = lock(&self.state);
        JobSnapshot {
            id: self.id,
            name: self.name.clone(),
            job_type: self.job_type.clone(),
            delay_ms: as_millis(self.delay),
            fail_prob: self.fail_prob,
            status: lc.status.clone(),
            start_time: lc.start_time,
            done_time: lc.done_time,
            cancel_time: lc.cancel_time,
            run_time_ms: lc.run_time.map(as_millis),
        }
    }

    /// Start the simulated work.
    ///
    /// The job is running as soon as this returns. The handle resolves with
    /// the job function's value after `delay`, or rejects with the function's
    /// error, a simulated failure, or [`JobError::Cancelled`]. A job that has
    /// already been run rejects with [`JobError::AlreadyStarted`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn run(&self, args: Vec<Value>) -> RunHandle {
        let (tx, rx) = oneshot::channel();
        let mut lc = lock(&self.state);
        if lc.status != JobStatus::Idle {
            debug!(job = %self.name, status = %lc.status, "run rejected");
            let _ = tx.send(Err(JobError::AlreadyStarted(self.name.clone())));
            return RunHandle { rx };
        }
        lc.status = JobStatus::Running;
        lc.start_time = Some(Utc::now());
        lc.started_at = Some(Instant::now());
        lc.pending = Some(tx);

        // The completion task only locks after its delay, so spawning under
        // the lock is safe and no cancel can settle before the handle is stored.
        let task = tokio::spawn(complete(Completion {
            name: self.name.clone(),
            delay: self.delay,
            fail_prob: self.fail_prob,
            func: Arc::clone(&self.func),
            args,
            rng: Arc::clone(&self.rng),
            state: Arc::clone(&self.state),
        }));
        lc.completion = Some(task.abort_handle());
        drop(lc);

        debug!(job = %self.name, delay_ms = as_millis(self.delay), "job started");
        RunHandle { rx }
    }

    /// Attempt to cancel the run after `after` has elapsed.
    ///
    /// The check happens when the timer fires, not now: the handle resolves
    /// `true` only if the job is running and unsettled at that moment. The
    /// timer fires whether or not the handle is awaited. If the run settles
    /// first the timer is released early and the handle resolves `false`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn cancel(&self, after: Duration) -> CancelHandle {
        let state = Arc::clone(&self.state);
        let name = self.name.clone();
        let mut settled = lock(&self.state).settled.subscribe();
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = sleep(after) => {}
                _ = async { let _ = settled.wait_for(|done| *done).await; } => {
                    debug!(job = %name, after_ms = as_millis(after), "cancel released, run already settled");
                    return false;
                }
            }

            let mut lc = lock(&state);
            let Some((tx, completion)) = lc.settle(JobStatus::Cancelled) else {
                debug!(job = %name, status = %lc.status, after_ms = as_millis(after), "cancel had no effect");
                return false;
            };
            if let Some(completion) = completion {
                completion.abort();
            }
            drop(lc);

            debug!(job = %name, after_ms = as_millis(after), "job cancelled");
            let _ = tx.send(Err(JobError::Cancelled));
            true
        });
        CancelHandle { task }
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new(DEFAULT_JOB_TYPE)
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("delay", &self.delay)
            .field("fail_prob", &self.fail_prob)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

struct Completion {
    name: String,
    delay: Duration,
    fail_prob: f64,
    func: Arc<dyn JobFn>,
    args: Vec<Value>,
    rng: SharedRng,
    state: Arc<Mutex<Lifecycle>>,
}

async fn complete(run: Completion) {
    sleep(run.delay).await;

    let outcome = run.func.call(run.args).await;
    let draw: f64 = lock(&run.rng).gen_range(0.0..1.0);
    let result = match outcome {
        Err(e) => Err(JobError::Function(e)),
        Ok(_) if draw < run.fail_prob => Err(JobError::Failed(format!(
            "simulated failure (draw {draw:.3} < failProb {})",
            run.fail_prob
        ))),
        Ok(value) => Ok(value),
    };
    let status = match &result {
        Ok(_) => JobStatus::Completed,
        Err(e) => JobStatus::Failed(e.to_string()),
    };

    let outcome = if result.is_ok() { "completed" } else { "failed" };
    let settled = lock(&run.state).settle(status);
    match settled {
        Some((tx, _)) => {
            debug!(job = %run.name, outcome, "job settled");
            let _ = tx.send(result);
        }
        None => debug!(job = %run.name, "completion suppressed, run already settled"),
    }
}

/// Handle to a job run; resolves exactly once.
#[derive(Debug)]
pub struct RunHandle {
    rx: oneshot::Receiver<JobResult<Value>>,
}

impl Future for RunHandle {
    type Output = JobResult<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(JobError::Aborted)))
    }
}

/// Handle to a cancellation attempt; resolves to whether it took effect.
#[derive(Debug)]
pub struct CancelHandle {
    task: JoinHandle<bool>,
}

impl Future for CancelHandle {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task)
            .poll(cx)
            .map(|joined| joined.unwrap_or(false))
    }
}
