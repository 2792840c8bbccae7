use async_trait::async_trait;
use std::path::Path;

use crate::Result;

pub mod whisper;

pub use whisper::WhisperCliTranscriber;

/// Speech-to-text backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio file to plain text
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}
