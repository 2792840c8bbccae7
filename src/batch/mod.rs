//! Batch processing: a FIFO of video files drained by one background worker.
//!
//! Progress is reported as plain strings through a single listener:
//! `"Processing <name>"`, `"Completed <name>"`, `"Error processing file: <message>"`
//! and finally `"Batch processing completed"`.

pub mod pipeline;
pub mod queue;
pub mod store;
pub mod worker;

pub use pipeline::{Pipeline, EXTRACT_FAILED, TRANSCRIBE_FAILED};
pub use queue::JobQueue;
pub use store::{PipelineResult, PipelineStatus, ResultStore};
pub use worker::{BatchWorker, ProgressListener, BATCH_COMPLETED};
