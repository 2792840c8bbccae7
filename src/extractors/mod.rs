use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod ffmpeg;

pub use ffmpeg::FfmpegExtractor;

use crate::Result;

/// Audio codecs ffmpeg can stream-copy into a standalone file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioFormat {
    Aac,
    Mp3,
    Flac,
    Opus,
    Vorbis,
}

impl AudioFormat {
    /// File extension used for the extracted track
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Aac => "aac",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Flac => "flac",
            AudioFormat::Opus => "opus",
            AudioFormat::Vorbis => "ogg",
        }
    }

    /// Map an ffprobe `codec_name` to a copyable format
    pub fn from_codec(codec: &str) -> Option<Self> {
        match codec.to_lowercase().as_str() {
            "aac" => Some(AudioFormat::Aac),
            "mp3" => Some(AudioFormat::Mp3),
            "flac" => Some(AudioFormat::Flac),
            "opus" => Some(AudioFormat::Opus),
            "vorbis" => Some(AudioFormat::Vorbis),
            _ => None,
        }
    }
}

/// Pulls the audio track out of a video file.
///
/// The returned path points at a temporary artifact owned by the caller, who is
/// expected to remove it once transcription is done.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    async fn extract_audio(&self, video_path: &Path) -> Result<PathBuf>;
}
