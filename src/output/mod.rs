use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::batch::{PipelineResult, ResultStore};
use crate::cli::OutputFormat;
use crate::generate::{looks_like_error, ContentKind};

/// Write each non-blank content kind to `<base>_<kind>.txt`, the composed
/// description block to `<base>_youtube_description.txt` and everything to
/// `<base>_all_content.json`. Files that fail to write are logged and skipped.
pub fn export_content(
    content: &BTreeMap<ContentKind, String>,
    base_name: &str,
    output_dir: &Path,
) -> Vec<PathBuf> {
    let mut exported = Vec::new();

    for (kind, text) in content {
        if text.trim().is_empty() {
            continue;
        }

        let path = output_dir.join(format!("{}_{}.txt", base_name, kind));
        match fs_err::write(&path, text) {
            Ok(()) => exported.push(path),
            Err(e) => tracing::warn!("Error exporting {}: {}", kind, e),
        }
    }

    let description = format_for_youtube_description(content);
    if !description.is_empty() {
        let path = output_dir.join(format!("{}_youtube_description.txt", base_name));
        match fs_err::write(&path, description) {
            Ok(()) => exported.push(path),
            Err(e) => tracing::warn!("Error exporting YouTube description: {}", e),
        }
    }

    let json_path = output_dir.join(format!("{}_all_content.json", base_name));
    match serde_json::to_string_pretty(content) {
        Ok(json) => match fs_err::write(&json_path, json) {
            Ok(()) => exported.push(json_path),
            Err(e) => tracing::warn!("Error exporting JSON: {}", e),
        },
        Err(e) => tracing::warn!("Error serializing content: {}", e),
    }

    exported
}

/// Compose title, description, chapters, tags and hashtags into one description block
pub fn format_for_youtube_description(content: &BTreeMap<ContentKind, String>) -> String {
    let field = |kind: ContentKind| content.get(&kind).filter(|text| !text.is_empty());
    let mut description = String::new();

    if let Some(title) = field(ContentKind::Title) {
        description.push_str(&format!("Title: {}\n\n", title));
    }
    if let Some(body) = field(ContentKind::Description) {
        description.push_str(&format!("{}\n\n", body));
    }
    if let Some(chapters) = field(ContentKind::Chapters) {
        description.push_str(&format!("Chapters:\n{}\n\n", chapters));
    }
    if let Some(tags) = field(ContentKind::Tags) {
        description.push_str(&format!("Tags: {}\n\n", tags));
    }
    if let Some(hashtags) = field(ContentKind::Hashtags) {
        description.push_str(&format!("Hashtags: {}\n\n", hashtags));
    }

    description.trim().to_string()
}

/// Save captions as `<base>.srt`
pub fn save_captions_as_srt(captions: &str, base_path: &Path) -> Result<PathBuf> {
    let mut srt_path = base_path.as_os_str().to_owned();
    srt_path.push(".srt");
    let srt_path = PathBuf::from(srt_path);

    fs_err::write(&srt_path, captions)?;
    Ok(srt_path)
}

/// Export every successful result of a batch, one base name per source file
pub fn export_results(results: &ResultStore, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs_err::create_dir_all(output_dir)?;
    let batch_base = crate::utils::timestamped_base_name("youtube_batch_content");
    let mut exported = Vec::new();

    for result in results.iter().filter(|r| r.is_success()) {
        let stem = Path::new(&result.file_id)
            .file_stem()
            .map(|s| crate::utils::sanitize_filename(&s.to_string_lossy()))
            .unwrap_or_default();
        let base_name = format!("{}_{}", batch_base, stem);

        let content: BTreeMap<ContentKind, String> = result
            .content
            .iter()
            .filter(|(kind, _)| !result.failed_kinds.contains(kind))
            .map(|(kind, text)| (*kind, text.clone()))
            .collect();

        exported.extend(export_content(&content, &base_name, output_dir));

        if let Some(captions) = content.get(&ContentKind::Captions) {
            exported.push(save_captions_as_srt(captions, &output_dir.join(&base_name))?);
        }
    }

    Ok(exported)
}

/// Render the batch summary in the requested format
pub fn format_summary(results: &ResultStore, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let all: Vec<&PipelineResult> = results.iter().collect();
            Ok(serde_json::to_string_pretty(&all)?)
        }
        OutputFormat::Text => Ok(format_as_text(results)),
    }
}

fn format_as_text(results: &ResultStore) -> String {
    let mut out = String::new();

    for result in results.iter() {
        let name = crate::utils::display_name(&result.file_id);
        if !result.is_success() {
            out.push_str(&format!(
                "✗ {}: {}\n\n",
                name,
                result.error_message.as_deref().unwrap_or("unknown error")
            ));
            continue;
        }

        out.push_str(&format!("✓ {}\n", name));
        for kind in ContentKind::ALL {
            let text = result.content_for(kind).unwrap_or("");
            let marker = if result.failed_kinds.contains(&kind) || looks_like_error(text) {
                " (!)"
            } else {
                ""
            };
            out.push_str(&format!("  [{}]{}\n", kind, marker));
            for line in text.lines() {
                out.push_str(&format!("    {}\n", line));
            }
        }
        out.push('\n');
    }

    out.push_str(&format!("{} of {} file(s) succeeded", results.succeeded(), results.len()));
    out
}
