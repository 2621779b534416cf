//! Concurrent fetch, transform and save pipeline
//!
//! - `queue`: shared task source with a completion barrier
//! - `worker`: per-card task protocol and the fixed worker pool
//! - `dispatcher`: enqueues the catalog and waits for every card

pub mod dispatcher;
pub mod queue;
pub mod worker;

pub use dispatcher::{prepare, Dispatcher};
pub use queue::TaskQueue;
pub use worker::{RunReport, RunSummary};
