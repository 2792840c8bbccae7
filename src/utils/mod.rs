use anyhow::Result;
use std::path::Path;

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Sanitize filename for safe filesystem usage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            match c {
                // Keep alphanumeric characters, spaces, hyphens, underscores, and dots
                c if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' => c,
                // Replace everything else with underscore
                _ => '_',
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Final path component, used in progress messages
pub fn display_name(file_id: &str) -> String {
    Path::new(file_id)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_id.to_string())
}

/// Check if a file exists and is readable
pub fn check_file_accessible(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("Path is not a file: {}", path.display());
    }

    // Try to read metadata to check permissions
    std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("Cannot access file {}: {}", path.display(), e))?;

    Ok(())
}

/// Timestamped base name for export files, e.g. `youtube_batch_content_20240101_120000`
pub fn timestamped_base_name(prefix: &str) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}", sanitize_filename(prefix), timestamp)
}

/// Show only the first five characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(5).collect();
    format!("{}*****", prefix)
}

/// Check if the current environment has required tools
pub async fn check_dependencies(whisper_command: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available("ffmpeg", "-version").await {
        missing.push("ffmpeg - required for audio extraction".to_string());
    }

    if !check_command_available("ffprobe", "-version").await {
        missing.push("ffprobe - required to detect audio streams".to_string());
    }

    if !check_command_available(whisper_command, "--help").await {
        missing.push(format!("{} - required for transcription (pip install openai-whisper)", whisper_command));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str, probe_arg: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg(probe_arg)
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
