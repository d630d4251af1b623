//! Jobs run by the worker.

pub mod sample;

pub use sample::SampleJob;
