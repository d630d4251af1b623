//! Job abstraction.
//!
//! A [`Job`] is one unit of periodic work. It is registered with the
//! scheduler through a [`JobDefinition`] naming it and saying how often it
//! fires, and every execution receives a fresh [`JobContext`].

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use webapi_core::ClockSnapshot;

/// Periodic work run by the scheduler.
///
/// # Example
///
/// ```ignore
/// struct PurgeExpiredSessions {
///     database: Arc<dyn Database>,
/// }
///
/// #[async_trait]
/// impl Job for PurgeExpiredSessions {
///     async fn execute(&self, context: &JobContext) -> anyhow::Result<()> {
///         purge_before(&self.database, context.fired_at.instant()).await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Job: Send + Sync {
    /// Run once.
    ///
    /// # Errors
    ///
    /// Any error is logged by the scheduler; later executions still fire.
    async fn execute(&self, context: &JobContext) -> anyhow::Result<()>;
}

/// Information about one execution.
#[derive(Debug, Clone)]
pub struct JobContext {
    /// Registered job name
    pub job_name: String,
    /// Name of the trigger that fired
    pub trigger_name: String,
    /// Frozen "now" for the whole execution
    pub fired_at: ClockSnapshot,
}

/// A named job plus its repeating trigger.
#[derive(Clone)]
pub struct JobDefinition {
    /// Unique job name; re-registering a name replaces the earlier job
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Trigger name, e.g. `Every 10 seconds`
    pub trigger_name: String,
    /// Time between executions; the first fires immediately
    pub interval: Duration,
    /// Implementation
    pub job: Arc<dyn Job>,
}

impl JobDefinition {
    /// Define `job` under `name`, firing every `interval`.
    #[must_use]
    pub fn new(name: impl Into<String>, interval: Duration, job: Arc<dyn Job>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            trigger_name: trigger_name_for(interval),
            interval,
            job,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Override the trigger name.
    #[must_use]
    pub fn with_trigger_name(mut self, trigger_name: impl Into<String>) -> Self {
        self.trigger_name = trigger_name.into();
        self
    }
}

impl fmt::Debug for JobDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("trigger_name", &self.trigger_name)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

fn trigger_name_for(interval: Duration) -> String {
    match interval.as_secs() {
        1 if interval.subsec_nanos() == 0 => "Every second".to_string(),
        secs if interval.subsec_nanos() == 0 => format!("Every {secs} seconds"),
        _ => format!("Every {} milliseconds", interval.as_millis()),
    }
}
