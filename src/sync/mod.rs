//! Batch synchronization core: batching, remote upserts, and run-level accounting.

pub mod batch;
pub mod client;
pub mod stats;
pub mod summary;
mod wire;

pub use batch::{batches, Batch};
pub use client::{ClearOutcome, PostProcessOutcome, SyncClient};
pub use summary::{BatchResult, RunSummary, ERROR_DISPLAY_CAP};
