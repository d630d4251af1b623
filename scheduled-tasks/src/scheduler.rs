//! Interval-based job scheduler.
//!
//! [`JobScheduler`] owns a set of [`JobDefinition`]s and, once started, runs
//! one timer loop per job:
//!
//! - the first execution fires immediately, then one per interval
//! - ticks missed while the runtime was busy are skipped, not replayed
//! - every execution runs in its own task, so an error or panic is logged and
//!   the loop keeps going
//! - at most `max_concurrency` executions run at once across all jobs
//!
//! # Shutdown
//!
//! [`JobScheduler::run`] returns once the shutdown signal is set **and**
//! every in-flight execution has finished.
//!
//! ```ignore
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! let mut scheduler = JobScheduler::new("scheduled-tasks", Arc::new(SystemClock), 4);
//! scheduler.register(SampleJob::definition(database, Duration::from_secs(10)))?;
//!
//! tokio::spawn(async move {
//!     tokio::signal::ctrl_c().await.ok();
//!     shutdown_tx.send(true).ok();
//! });
//!
//! scheduler.run(shutdown_rx).await;
//! ```

use crate::job::{JobContext, JobDefinition};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use webapi_core::{Clock, ClockSnapshot};

/// Registration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The job's interval is zero.
    #[error("Job '{job}' must have a positive interval")]
    ZeroInterval {
        /// Job name
        job: String,
    },
}

/// Runs registered jobs on fixed intervals until shut down.
pub struct JobScheduler {
    name: String,
    clock: Arc<dyn Clock>,
    max_concurrency: usize,
    definitions: BTreeMap<String, JobDefinition>,
}

impl JobScheduler {
    /// An empty scheduler. `max_concurrency` is raised to 1 if zero.
    #[must_use]
    pub fn new(name: impl Into<String>, clock: Arc<dyn Clock>, max_concurrency: usize) -> Self {
        Self {
            name: name.into(),
            clock,
            max_concurrency: max_concurrency.max(1),
            definitions: BTreeMap::new(),
        }
    }

    /// Scheduler name, used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Upper bound on simultaneous executions.
    #[must_use]
    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Register `definition`, replacing any job with the same name.
    ///
    /// Returns `true` if an earlier registration was replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ZeroInterval`] if the interval is zero.
    pub fn register(&mut self, definition: JobDefinition) -> Result<bool, SchedulerError> {
        if definition.interval.is_zero() {
            return Err(SchedulerError::ZeroInterval {
                job: definition.name,
            });
        }

        tracing::info!(
            scheduler = %self.name,
            job = %definition.name,
            description = %definition.description,
            trigger = %definition.trigger_name,
            interval_ms = definition.interval.as_millis(),
            "Registering job"
        );

        let Some(previous) = self
            .definitions
            .insert(definition.name.clone(), definition)
        else {
            return Ok(false);
        };

        tracing::warn!(
            scheduler = %self.name,
            job = %previous.name,
            trigger = %previous.trigger_name,
            "Overwriting existing job registration"
        );
        Ok(true)
    }

    /// The registered definition for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&JobDefinition> {
        self.definitions.get(name)
    }

    /// Registered job names, sorted.
    pub fn job_names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Number of registered jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no jobs are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Fire jobs until `shutdown` becomes `true` (or its sender is dropped),
    /// then wait for in-flight executions.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            scheduler = %self.name,
            jobs = self.definitions.len(),
            max_concurrency = self.max_concurrency,
            "Starting scheduler"
        );

        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let mut loops = JoinSet::new();

        for definition in self.definitions.into_values() {
            loops.spawn(run_job_loop(
                definition,
                Arc::clone(&self.clock),
                Arc::clone(&permits),
                shutdown.clone(),
            ));
        }

        if loops.is_empty() {
            tracing::warn!(scheduler = %self.name, "No jobs registered");
            wait_for_shutdown(&mut shutdown).await;
        }

        while let Some(result) = loops.join_next().await {
            if let Err(error) = result {
                tracing::error!(scheduler = %self.name, error = %error, "Job loop failed");
            }
        }

        tracing::info!(scheduler = %self.name, "Scheduler stopped");
    }
}

impl std::fmt::Debug for JobScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobScheduler")
            .field("name", &self.name)
            .field("max_concurrency", &self.max_concurrency)
            .field("definitions", &self.definitions)
            .finish_non_exhaustive()
    }
}

/// Resolve once shutdown is requested or the sender is gone.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

async fn run_job_loop(
    definition: JobDefinition,
    clock: Arc<dyn Clock>,
    permits: Arc<Semaphore>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(definition.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut runs = JoinSet::new();

    loop {
        tokio::select! {
            () = wait_for_shutdown(&mut shutdown) => break,
            _ = ticker.tick() => {
                runs.spawn(execute_once(
                    definition.clone(),
                    Arc::clone(&clock),
                    Arc::clone(&permits),
                ));
            }
            Some(result) = runs.join_next() => log_run_outcome(&definition.name, result),
        }
    }

    if !runs.is_empty() {
        tracing::info!(
            job = %definition.name,
            in_flight = runs.len(),
            "Waiting for running executions to finish"
        );
    }
    while let Some(result) = runs.join_next().await {
        log_run_outcome(&definition.name, result);
    }
}

async fn execute_once(definition: JobDefinition, clock: Arc<dyn Clock>, permits: Arc<Semaphore>) {
    let Ok(_permit) = permits.acquire_owned().await else {
        return;
    };

    let context = JobContext {
        job_name: definition.name.clone(),
        trigger_name: definition.trigger_name.clone(),
        fired_at: ClockSnapshot::new(clock.as_ref()),
    };

    tracing::debug!(
        job = %context.job_name,
        trigger = %context.trigger_name,
        fired_at = %context.fired_at,
        "Starting job"
    );
    let start = Instant::now();

    match definition.job.execute(&context).await {
        Ok(()) => {
            tracing::info!(
                job = %context.job_name,
                elapsed_ms = start.elapsed().as_millis(),
                "Completed job"
            );
            metrics::counter!("scheduler.job.runs", "job" => context.job_name, "outcome" => "success")
                .increment(1);
        }
        Err(error) => {
            tracing::error!(
                job = %context.job_name,
                elapsed_ms = start.elapsed().as_millis(),
                error = %format!("{error:#}"),
                "Job failed"
            );
            metrics::counter!("scheduler.job.runs", "job" => context.job_name, "outcome" => "failure")
                .increment(1);
        }
    }
}

fn log_run_outcome(job: &str, result: Result<(), tokio::task::JoinError>) {
    if let Err(error) = result {
        if error.is_panic() {
            tracing::error!(job = %job, "Job panicked");
            metrics::counter!("scheduler.job.runs", "job" => job.to_string(), "outcome" => "panic")
                .increment(1);
        } else {
            tracing::warn!(job = %job, error = %error, "Job execution was cancelled");
        }
    }
}
