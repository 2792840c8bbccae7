//! ytmeta - turn video files into YouTube metadata
//!
//! This library extracts audio from videos, transcribes it, and asks a language model to
//! write titles, descriptions, tags, hashtags, chapters and captions. Multiple files are
//! driven through a background [`BatchWorker`] that reports progress as plain strings.

pub mod batch;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod generate;
pub mod output;
pub mod transcribe;
pub mod utils;

pub use batch::{BatchWorker, Pipeline, PipelineResult, PipelineStatus, ResultStore};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{AudioExtractor, FfmpegExtractor};
pub use generate::{ContentGenerator, ContentKind, GenerationError, PerplexityClient};
pub use transcribe::{Transcriber, WhisperCliTranscriber};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to ytmeta
#[derive(thiserror::Error, Debug)]
pub enum YtmetaError {
    #[error("Audio extraction failed: {0}")]
    AudioExtractionFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Perplexity API key not set")]
    MissingApiKey,

    #[error("Configuration error: {0}")]
    Config(String),
}
