use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::generate::ContentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Pending,
    Success,
    Failed,
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStatus::Pending => write!(f, "pending"),
            PipelineStatus::Success => write!(f, "success"),
            PipelineStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of running the pipeline on one file.
///
/// `content` can hold error text for a kind while `status` is `Success`:
/// generation failures are stored in place of the content and listed in
/// `failed_kinds`, they never fail the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub file_id: String,

    pub status: PipelineStatus,

    /// Set iff `status` is `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Set iff transcription succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,

    pub content: BTreeMap<ContentKind, String>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub failed_kinds: BTreeSet<ContentKind>,
}

impl PipelineResult {
    pub fn new(file_id: impl Into<String>, status: PipelineStatus) -> Self {
        Self {
            file_id: file_id.into(),
            status,
            error_message: None,
            transcript: None,
            content: BTreeMap::new(),
            failed_kinds: BTreeSet::new(),
        }
    }

    /// A failed record carrying only an error message
    pub fn failed(file_id: impl Into<String>, error_message: impl Into<String>) -> Self {
        let mut result = Self::new(file_id, PipelineStatus::Failed);
        result.error_message = Some(error_message.into());
        result
    }

    pub fn is_success(&self) -> bool {
        self.status == PipelineStatus::Success
    }

    pub fn content_for(&self, kind: ContentKind) -> Option<&str> {
        self.content.get(&kind).map(String::as_str)
    }
}

/// Results keyed by file id, remembering the order files finished in.
///
/// Re-processing a file overwrites its entry and moves it to the end.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    entries: HashMap<String, PipelineResult>,
    order: Vec<String>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, result: PipelineResult) {
        let file_id = result.file_id.clone();
        if self.entries.insert(file_id.clone(), result).is_some() {
            self.order.retain(|id| id != &file_id);
        }
        self.order.push(file_id);
    }

    pub fn get(&self, file_id: &str) -> Option<&PipelineResult> {
        self.entries.get(file_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recently stored result
    pub fn last(&self) -> Option<&PipelineResult> {
        self.order.last().and_then(|id| self.entries.get(id))
    }

    /// Results in the order they were stored
    pub fn iter(&self) -> impl Iterator<Item = &PipelineResult> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn succeeded(&self) -> usize {
        self.entries.values().filter(|r| r.is_success()).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_record_is_not_success() {
        let result = PipelineResult::new("a.mp4", PipelineStatus::Pending);
        assert!(!result.is_success());
        assert_eq!(result.status.to_string(), "pending");
        assert_eq!(serde_json::to_value(&result).unwrap()["status"], "pending");
    }

    fn success(file_id: &str, title: &str) -> PipelineResult {
        let mut result = PipelineResult::new(file_id, PipelineStatus::Success);
        result.content.insert(ContentKind::Title, title.to_string());
        result
    }

    #[test]
    fn test_overwrite_moves_to_end() {
        let mut store = ResultStore::new();
        store.insert(success("a.mp4", "first"));
        store.insert(success("b.mp4", "b"));
        store.insert(success("a.mp4", "second"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a.mp4").unwrap().content_for(ContentKind::Title), Some("second"));
        assert_eq!(store.last().unwrap().file_id, "a.mp4");

        let order: Vec<&str> = store.iter().map(|r| r.file_id.as_str()).collect();
        assert_eq!(order, ["b.mp4", "a.mp4"]);
    }

    #[test]
    fn test_succeeded_and_clear() {
        let mut store = ResultStore::new();
        store.insert(success("a.mp4", "A"));
        store.insert(PipelineResult::failed("b.mp4", "Failed to extract audio"));

        assert_eq!(store.succeeded(), 1);
        store.clear();
        assert!(store.is_empty());
        assert!(store.last().is_none());
    }

    #[test]
    fn test_failed_record_shape() {
        let result = PipelineResult::failed("x.mp4", "Failed to transcribe audio");
        assert_eq!(result.status, PipelineStatus::Failed);
        assert_eq!(result.error_message.as_deref(), Some("Failed to transcribe audio"));
        assert!(result.content.is_empty());
        assert!(result.transcript.is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let mut result = success("a.mp4", "T");
        result.transcript = Some("hello".to_string());

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["content"]["title"], "T");
        assert!(value.get("error_message").is_none());
        assert!(value.get("failed_kinds").is_none());
    }
}
