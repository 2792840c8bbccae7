use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod perplexity;
pub mod prompts;

pub use perplexity::PerplexityClient;

/// The pieces of YouTube metadata generated for every video
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Title,
    Description,
    Tags,
    Hashtags,
    Chapters,
    Captions,
}

impl ContentKind {
    /// All kinds, in generation order
    pub const ALL: [ContentKind; 6] = [
        ContentKind::Title,
        ContentKind::Description,
        ContentKind::Tags,
        ContentKind::Hashtags,
        ContentKind::Chapters,
        ContentKind::Captions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Title => "title",
            ContentKind::Description => "description",
            ContentKind::Tags => "tags",
            ContentKind::Hashtags => "hashtags",
            ContentKind::Chapters => "chapters",
            ContentKind::Captions => "captions",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a generation call produced no content.
///
/// The display strings are what ends up stored in place of the content, so
/// they stay readable on their own.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Error: Perplexity API key not set. Please configure it in the settings.")]
    MissingApiKey,

    #[error("HTTP Error calling Perplexity API: status code {status}. Response: {body}")]
    Http { status: u16, body: String },

    #[error("Error calling Perplexity API: {0}")]
    Request(String),

    #[error("Unexpected error calling Perplexity API: {0}")]
    Unexpected(String),
}

/// Writes one kind of content from a transcript
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, kind: ContentKind, transcript: &str) -> Result<String, GenerationError>;
}

/// Heuristic for text that reads like a failed generation call.
///
/// Generators report failures through [`GenerationError`]; this only exists to
/// flag model output that merely looks like an error message.
pub fn looks_like_error(text: &str) -> bool {
    text.starts_with("Error:") || text.starts_with("HTTP Error") || text.to_lowercase().contains("error")
}
