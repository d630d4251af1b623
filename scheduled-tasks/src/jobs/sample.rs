//! Sample job: a database round trip every interval.

use crate::job::{Job, JobContext, JobDefinition};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use webapi_postgres::Database;

/// Registered job name.
pub const SAMPLE_JOB_NAME: &str = "SampleJob";

/// Runs `SELECT NULL;` against the database.
pub struct SampleJob {
    database: Arc<dyn Database>,
}

impl SampleJob {
    /// Create the job.
    #[must_use]
    pub fn new(database: Arc<dyn Database>) -> Self {
        Self { database }
    }

    /// The job registered as `SampleJob`, firing every `interval`.
    #[must_use]
    pub fn definition(database: Arc<dyn Database>, interval: Duration) -> JobDefinition {
        JobDefinition::new(SAMPLE_JOB_NAME, interval, Arc::new(Self::new(database)))
            .with_description("A sample job.")
    }
}

#[async_trait]
impl Job for SampleJob {
    async fn execute(&self, context: &JobContext) -> anyhow::Result<()> {
        tracing::debug!(fired_at = %context.fired_at, "Starting sample job");

        self.database.execute_noop().await?;

        tracing::info!("Completed sample job");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use webapi_core::ClockSnapshot;
    use webapi_testing::{MockDatabase, test_clock};

    fn context() -> JobContext {
        JobContext {
            job_name: SAMPLE_JOB_NAME.to_string(),
            trigger_name: "Every 10 seconds".to_string(),
            fired_at: ClockSnapshot::new(&test_clock()),
        }
    }

    #[test]
    fn test_definition() {
        let definition =
            SampleJob::definition(Arc::new(MockDatabase::healthy()), Duration::from_secs(10));

        assert_eq!(definition.name, "SampleJob");
        assert_eq!(definition.description, "A sample job.");
        assert_eq!(definition.trigger_name, "Every 10 seconds");
        assert_eq!(definition.interval, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_runs_noop_query() {
        let database = Arc::new(MockDatabase::healthy());
        let job = SampleJob::new(database.clone());

        job.execute(&context()).await.unwrap();

        assert_eq!(database.probe_count(), 1);
    }

    #[tokio::test]
    async fn test_database_failure_is_returned() {
        let database = Arc::new(MockDatabase::failing());
        let job = SampleJob::new(database.clone());

        let error = job.execute(&context()).await.unwrap_err();

        assert!(error.to_string().contains("mock database is down"));
        assert_eq!(database.probe_count(), 1);
    }
}
