//! Scheduled tasks worker for Company Product.
//!
//! A long-running process that fires registered [`Job`]s on fixed intervals
//! until it receives a shutdown signal. Jobs share the same `PostgreSQL`
//! database as the API.
//!
//! # Modules
//!
//! - [`job`]: the [`Job`] trait and [`JobDefinition`]
//! - [`scheduler`]: [`JobScheduler`], the interval runner
//! - [`jobs`]: concrete jobs
//! - [`config`]: environment-variable configuration

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]

pub mod config;
pub mod job;
pub mod jobs;
pub mod scheduler;

pub use config::Config;
pub use job::{Job, JobContext, JobDefinition};
pub use jobs::SampleJob;
pub use scheduler::{JobScheduler, SchedulerError};
