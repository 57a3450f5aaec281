//! Walk-through of the mock job lifecycle.
//!
//! Runs three jobs: one that completes, one cancelled mid-flight, and one
//! whose cancellation arrives too late. Set `RUST_LOG=debug` to see the
//! job's own trace events.

use std::time::Duration;

use job_mock::{Job, JobConfig, JobError, func};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Completes after its delay with the function's value.
    let sender = func::from_fn(|args| Ok(json!({ "sent_to": args })));
    let job = Job::new("email")
        .with_delay(Duration::from_millis(50))
        .with_fn(sender);
    println!("Job:     {}", job.name());

    let result = job.run(vec![json!("ada@example.com")]).await?;
    println!("Result:  {result}");
    println!("Runtime: {:?}", job.run_time().unwrap_or_default());
    println!();

    // Cancelled while still waiting out its delay.
    let config = JobConfig::from_json(r#"{ "jobType": "report", "delayMs": 1000, "seed": 7 }"#)?;
    let job = config.build();
    let run = job.run(vec![]);
    let canceled = job.cancel(Duration::from_millis(20)).await;
    match run.await {
        Err(JobError::Cancelled) => info!(job = job.name(), "cancelled as expected"),
        other => info!(job = job.name(), ?other, "unexpected outcome"),
    }
    println!("Canceled:    {canceled}");
    println!("Cancel time: {:?}", job.cancel_time());
    println!();

    // Cancellation fires after the job has already finished.
    let job = Job::new("sms").with_delay(Duration::from_millis(10));
    let run = job.run(vec![]);
    let late = job.cancel(Duration::from_millis(30));
    run.await?;
    println!("Late cancel took effect: {}", late.await);

    println!("\nSnapshot:");
    println!("{}", serde_json::to_string_pretty(&job.snapshot())?);

    Ok(())
}
