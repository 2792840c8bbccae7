use super::{AudioExtractor, AudioFormat};
use crate::{Result, YtmetaError};
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;
use tokio::process::Command;
use uuid::Uuid;

/// Extracts audio tracks with the `ffmpeg` / `ffprobe` binaries.
///
/// Every call writes to a uniquely named file inside a private temporary
/// directory, so concurrent or repeated extractions never clobber each other.
pub struct FfmpegExtractor {
    temp_dir: TempDir,
}

impl FfmpegExtractor {
    pub fn new(temp_root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("ytmeta-audio-");

        let temp_dir = match temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .context("Failed to create temporary directory")?;

        Ok(Self { temp_dir })
    }

    /// Directory the extracted audio files are written to
    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Check if the file exists and is accessible
    async fn validate_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            anyhow::bail!("File does not exist: {}", path.display());
        }

        if !path.is_file() {
            anyhow::bail!("Path is not a file: {}", path.display());
        }

        match fs::metadata(path).await {
            Ok(metadata) => {
                if metadata.len() == 0 {
                    anyhow::bail!("File is empty: {}", path.display());
                }
            }
            Err(e) => {
                anyhow::bail!("Cannot access file {}: {}", path.display(), e);
            }
        }

        Ok(())
    }

    /// Codec of the first audio stream, as reported by ffprobe
    async fn probe_audio_codec(&self, path: &Path) -> Result<String> {
        let output = Command::new("ffprobe")
            .args([
                "-v", "quiet",
                "-print_format", "json",
                "-show_streams",
                "-select_streams", "a",
                &path.to_string_lossy(),
            ])
            .output()
            .await
            .context("Failed to run ffprobe")?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Failed to analyze file with ffprobe: {}", error);
        }

        let info: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        parse_audio_codec(&info)
            .ok_or_else(|| anyhow::anyhow!("File does not contain any audio streams: {}", path.display()))
    }

    fn target_path(&self, format: AudioFormat) -> PathBuf {
        let filename = format!("audio_{}.{}", &Uuid::new_v4().to_string()[..8], format.as_str());
        self.temp_dir.path().join(filename)
    }

    async fn run_ffmpeg(&self, source: &Path, target: &Path, codec_args: &[&str]) -> Result<()> {
        let source_arg = source.to_string_lossy();
        let target_arg = target.to_string_lossy();

        let mut args: Vec<&str> = vec!["-i", &*source_arg, "-vn"];
        args.extend_from_slice(codec_args);
        args.extend_from_slice(&["-y", &*target_arg]);

        let output = Command::new("ffmpeg")
            .args(&args)
            .output()
            .await
            .context("Failed to run ffmpeg")?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(YtmetaError::AudioExtractionFailed(error.trim().to_string()).into());
        }

        Ok(())
    }
}

#[async_trait]
impl AudioExtractor for FfmpegExtractor {
    async fn extract_audio(&self, video_path: &Path) -> Result<PathBuf> {
        self.validate_file(video_path).await?;

        let codec = self.probe_audio_codec(video_path).await?;

        let audio_path = match AudioFormat::from_codec(&codec) {
            Some(format) => {
                let target = self.target_path(format);
                tracing::debug!("Copying {} audio stream to {}", codec, target.display());
                self.run_ffmpeg(video_path, &target, &["-acodec", "copy"]).await?;
                target
            }
            None => {
                // Codecs without a standalone container get re-encoded
                let target = self.target_path(AudioFormat::Mp3);
                tracing::debug!("Converting {} audio stream to MP3 at {}", codec, target.display());
                self.run_ffmpeg(video_path, &target, &["-acodec", "mp3", "-ab", "128k"]).await?;
                target
            }
        };

        Ok(audio_path)
    }
}

fn parse_audio_codec(info: &serde_json::Value) -> Option<String> {
    info["streams"]
        .as_array()?
        .iter()
        .find(|stream| stream["codec_type"].as_str() == Some("audio"))
        .and_then(|stream| stream["codec_name"].as_str())
        .map(str::to_string)
}
