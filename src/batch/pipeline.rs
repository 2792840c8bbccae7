use std::path::Path;
use std::sync::Arc;

use super::store::{PipelineResult, PipelineStatus};
use crate::extractors::AudioExtractor;
use crate::generate::{ContentGenerator, ContentKind};
use crate::transcribe::Transcriber;

pub const EXTRACT_FAILED: &str = "Failed to extract audio";
pub const TRANSCRIBE_FAILED: &str = "Failed to transcribe audio";

/// Runs extraction, transcription and every content kind for one file
pub struct Pipeline {
    extractor: Arc<dyn AudioExtractor>,
    transcriber: Arc<dyn Transcriber>,
    generator: Arc<dyn ContentGenerator>,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn AudioExtractor>,
        transcriber: Arc<dyn Transcriber>,
        generator: Arc<dyn ContentGenerator>,
    ) -> Self {
        Self {
            extractor,
            transcriber,
            generator,
        }
    }

    /// Process a single file.
    ///
    /// Extraction and transcription failures stop the run and mark the result
    /// failed. Generation failures only affect their own content kind.
    pub async fn run(&self, file_id: &str) -> PipelineResult {
        let mut result = PipelineResult::new(file_id, PipelineStatus::Pending);

        tracing::info!("Extracting audio from {}", file_id);
        let audio_path = match self.extractor.extract_audio(Path::new(file_id)).await {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Audio extraction failed for {}: {:#}", file_id, e);
                return PipelineResult::failed(file_id, EXTRACT_FAILED);
            }
        };

        tracing::info!("Transcribing audio for {}", file_id);
        let transcript = match self.transcriber.transcribe(&audio_path).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                tracing::warn!("Transcription of {} produced no text", file_id);
                remove_audio(&audio_path).await;
                return PipelineResult::failed(file_id, TRANSCRIBE_FAILED);
            }
            Err(e) => {
                tracing::warn!("Transcription failed for {}: {:#}", file_id, e);
                remove_audio(&audio_path).await;
                return PipelineResult::failed(file_id, TRANSCRIBE_FAILED);
            }
        };

        tracing::info!("Generating content for {}", file_id);
        for kind in ContentKind::ALL {
            let text = match self.generator.generate(kind, &transcript).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Generating {} for {} failed: {}", kind, file_id, e);
                    result.failed_kinds.insert(kind);
                    e.to_string()
                }
            };
            result.content.insert(kind, text);
        }

        result.transcript = Some(transcript);
        result.status = PipelineStatus::Success;

        remove_audio(&audio_path).await;

        result
    }
}

/// Best-effort removal of the temporary audio file
async fn remove_audio(audio_path: &Path) {
    match tokio::fs::remove_file(audio_path).await {
        Ok(()) => tracing::debug!("Removed temporary audio file {}", audio_path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            "Could not remove temporary audio file {}: {}",
            audio_path.display(),
            e
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::MockAudioExtractor;
    use crate::generate::{GenerationError, MockContentGenerator};
    use crate::transcribe::MockTranscriber;
    use std::path::PathBuf;

    fn extractor_returning(path: PathBuf) -> MockAudioExtractor {
        let mut extractor = MockAudioExtractor::new();
        extractor.expect_extract_audio().times(1).returning(move |_| Ok(path.clone()));
        extractor
    }

    fn transcriber_returning(text: &'static str) -> MockTranscriber {
        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .times(1)
            .returning(move |_| Ok(text.to_string()));
        transcriber
    }

    fn pipeline(
        extractor: MockAudioExtractor,
        transcriber: MockTranscriber,
        generator: MockContentGenerator,
    ) -> Pipeline {
        Pipeline::new(Arc::new(extractor), Arc::new(transcriber), Arc::new(generator))
    }

    #[tokio::test]
    async fn test_successful_run() {
        let mut generator = MockContentGenerator::new();
        generator
            .expect_generate()
            .times(6)
            .returning(|kind, transcript| Ok(format!("{} for {}", kind, transcript)));

        let pipeline = pipeline(
            extractor_returning(PathBuf::from("/nonexistent/audio.aac")),
            transcriber_returning("hello world"),
            generator,
        );

        let result = pipeline.run("clip.mp4").await;
        assert_eq!(result.file_id, "clip.mp4");
        assert_eq!(result.status, PipelineStatus::Success);
        assert_eq!(result.error_message, None);
        assert_eq!(result.transcript.as_deref(), Some("hello world"));
        assert_eq!(result.content.len(), 6);
        assert_eq!(result.content_for(ContentKind::Chapters), Some("chapters for hello world"));
        assert!(result.failed_kinds.is_empty());
    }

    #[tokio::test]
    async fn test_extraction_failure_is_hard_stop() {
        let mut extractor = MockAudioExtractor::new();
        extractor
            .expect_extract_audio()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("no audio stream")));

        let mut transcriber = MockTranscriber::new();
        transcriber.expect_transcribe().never();
        let mut generator = MockContentGenerator::new();
        generator.expect_generate().never();

        let result = pipeline(extractor, transcriber, generator).run("silent.mp4").await;
        assert_eq!(result.status, PipelineStatus::Failed);
        assert_eq!(result.error_message.as_deref(), Some(EXTRACT_FAILED));
        assert!(result.content.is_empty());
        assert!(result.transcript.is_none());
    }

    #[tokio::test]
    async fn test_transcription_failure_is_hard_stop() {
        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("model crashed")));
        let mut generator = MockContentGenerator::new();
        generator.expect_generate().never();

        let result = pipeline(
            extractor_returning(PathBuf::from("/nonexistent/audio.aac")),
            transcriber,
            generator,
        )
        .run("x.mp4")
        .await;

        assert_eq!(result.status, PipelineStatus::Failed);
        assert_eq!(result.error_message.as_deref(), Some(TRANSCRIBE_FAILED));
        assert!(result.content.is_empty());
        assert!(result.transcript.is_none());
    }

    #[tokio::test]
    async fn test_empty_transcript_counts_as_failure() {
        let mut generator = MockContentGenerator::new();
        generator.expect_generate().never();

        let result = pipeline(
            extractor_returning(PathBuf::from("/nonexistent/audio.aac")),
            transcriber_returning(""),
            generator,
        )
        .run("quiet.mp4")
        .await;

        assert_eq!(result.status, PipelineStatus::Failed);
        assert_eq!(result.error_message.as_deref(), Some(TRANSCRIBE_FAILED));
    }

    #[tokio::test]
    async fn test_whitespace_transcript_is_still_generated_from() {
        let mut generator = MockContentGenerator::new();
        generator
            .expect_generate()
            .times(6)
            .returning(|kind, _| Ok(format!("{} text", kind)));

        let result = pipeline(
            extractor_returning(PathBuf::from("/nonexistent/audio.aac")),
            transcriber_returning("   "),
            generator,
        )
        .run("hum.mp4")
        .await;

        assert_eq!(result.status, PipelineStatus::Success);
        assert_eq!(result.transcript.as_deref(), Some("   "));
        assert_eq!(result.content.len(), 6);
    }

    #[tokio::test]
    async fn test_generation_failure_is_soft() {
        let mut generator = MockContentGenerator::new();
        generator.expect_generate().times(6).returning(|kind, _| {
            if kind == ContentKind::Tags {
                Err(GenerationError::Http { status: 500, body: "boom".to_string() })
            } else {
                Ok(format!("{} text", kind))
            }
        });

        let result = pipeline(
            extractor_returning(PathBuf::from("/nonexistent/audio.aac")),
            transcriber_returning("transcript"),
            generator,
        )
        .run("x.mp4")
        .await;

        assert_eq!(result.status, PipelineStatus::Success);
        assert_eq!(result.error_message, None);
        assert_eq!(result.content.len(), 6);
        assert!(result.failed_kinds.contains(&ContentKind::Tags));
        assert_eq!(result.failed_kinds.len(), 1);

        let tags = result.content_for(ContentKind::Tags).unwrap();
        assert!(tags.starts_with("HTTP Error calling Perplexity API"));

        for kind in ContentKind::ALL.into_iter().filter(|k| *k != ContentKind::Tags) {
            assert_eq!(result.content_for(kind), Some(format!("{} text", kind).as_str()));
        }
    }

    #[tokio::test]
    async fn test_audio_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("audio_1234.aac");
        fs_err::write(&audio, b"fake audio").unwrap();

        let mut generator = MockContentGenerator::new();
        generator.expect_generate().returning(|_, _| Ok("ok".to_string()));

        let result = pipeline(
            extractor_returning(audio.clone()),
            transcriber_returning("words"),
            generator,
        )
        .run("clip.mp4")
        .await;

        assert!(result.is_success());
        assert!(!audio.exists());
    }
}
