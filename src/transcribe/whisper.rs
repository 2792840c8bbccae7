use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::process::Command;

use super::Transcriber;
use crate::config::TranscriptionConfig;
use crate::{Result, YtmetaError};

/// Runs the `whisper` command line tool and reads back its `.txt` output
pub struct WhisperCliTranscriber {
    command: String,
    model_size: String,
    language: Option<String>,
}

impl WhisperCliTranscriber {
    pub fn new(config: &TranscriptionConfig) -> Self {
        Self {
            command: config.whisper_command.clone(),
            model_size: config.model_size.clone(),
            language: config.language.clone(),
        }
    }

    fn build_args(&self, audio_path: &Path, output_dir: &Path) -> Vec<String> {
        let mut args = vec![
            audio_path.to_string_lossy().into_owned(),
            "--model".to_string(),
            self.model_size.clone(),
            "--output_format".to_string(),
            "txt".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().into_owned(),
        ];

        if let Some(language) = &self.language {
            args.push("--language".to_string());
            args.push(language.clone());
        }

        args
    }
}

/// Whisper names its output after the input file stem
fn transcript_path(audio_path: &Path, output_dir: &Path) -> PathBuf {
    let stem = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    output_dir.join(format!("{}.txt", stem))
}

/// Join whisper's line-per-segment output into a single transcript
fn normalize_transcript(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let output_dir = TempDir::new().context("Failed to create temporary directory")?;

        tracing::info!(
            "Transcribing {} with whisper model '{}'",
            audio_path.display(),
            self.model_size
        );

        let output = Command::new(&self.command)
            .args(self.build_args(audio_path, output_dir.path()))
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.command))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(YtmetaError::TranscriptionFailed(error.trim().to_string()).into());
        }

        let txt_path = transcript_path(audio_path, output_dir.path());
        let raw = fs_err::read_to_string(&txt_path)
            .map_err(|e| YtmetaError::TranscriptionFailed(e.to_string()))?;

        let transcript = normalize_transcript(&raw);
        if transcript.is_empty() {
            return Err(YtmetaError::TranscriptionFailed(
                "whisper produced an empty transcript".to_string(),
            )
            .into());
        }

        tracing::debug!("Transcript length: {} characters", transcript.len());
        Ok(transcript)
    }
}
