//! Prompt-size batching
//!
//! Splits eligible notes into batches whose rendered prompt fits a
//! character budget while rendering as few trial prompts as possible:
//! - `estimator`: average note size from an evenly spaced sample
//! - `predictor`: closed-form first guess of notes per batch
//! - `search`: adaptive grow/shrink search with a learned accuracy factor
//! - `batcher`: the partitioning loop tying them together
//! - `stats`: per-run statistics

pub mod batcher;
pub mod estimator;
pub mod predictor;
pub mod search;
pub mod stats;

pub use batcher::{Batch, Batcher, OversizePolicy, Partition};
pub use estimator::{estimate_average_note_size, evenly_spaced_sample};
pub use predictor::predict_batch_size;
pub use search::{find_batch_size, SearchOutcome};
pub use stats::BatchingStats;
