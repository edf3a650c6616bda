//! # storesync-scheduler
//!
//! Background execution for StoreSync.
//!
//! - `runner`: bounded task queue, worker pool, retries and timeouts
//! - `registry`: task status lookup
//! - `sweeps`: activation, completion and audit retention passes
//! - `scheduler`: tokio timers driving the sweeps

pub mod registry;
pub mod retry;
pub mod runner;
pub mod scheduler;
pub mod sweeps;
pub mod task;

pub use registry::TaskRegistry;
pub use retry::{is_retryable, RetryPolicy};
pub use runner::{TaskContext, TaskOutput, TaskRunner};
pub use scheduler::{run_sweeps, PeriodicScheduler, SchedulerHandle, SweepRun};
pub use sweeps::{SweepReport, Sweeper};
pub use task::{Task, TaskRecord, TaskStatus};
