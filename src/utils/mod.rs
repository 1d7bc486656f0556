use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::{Result, TranscriptorError};

static YOUTUBE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^((?:https?:)?//)?((?:www|m)\.)?(youtube(?:-nocookie)?\.com|youtu\.be)(/(?:[\w\-]+\?v=|embed/|live/|v/)?)([\w\-]+)(\S+)?$",
    )
    .expect("YouTube URL pattern is valid")
});

/// Best-effort syntactic check for a YouTube video address. No network access.
pub fn is_valid_youtube_url(candidate: &str) -> bool {
    YOUTUBE_URL_RE.is_match(candidate)
}

/// Reject a URL that does not look like a YouTube video
pub fn ensure_youtube_url(candidate: &str) -> Result<()> {
    if !is_valid_youtube_url(candidate) {
        return Err(TranscriptorError::InvalidUrl(candidate.to_string()).into());
    }
    Ok(())
}

/// Path of the transcript that mirrors `media` inside `transcripts_dir`
pub fn transcript_path_for(media: &Path, transcripts_dir: &Path) -> Result<PathBuf> {
    let stem = media
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            TranscriptorError::FileError(format!(
                "Cannot derive a transcript name from {}",
                media.display()
            ))
        })?;

    Ok(transcripts_dir.join(format!("{}.txt", stem)))
}

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log10() / THRESHOLD.log10()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    let size = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Make sure an output directory is usable, creating it only when allowed
pub fn prepare_output_dir(path: &Path, create: bool) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    if path.exists() {
        return Err(TranscriptorError::Configuration(format!(
            "{} exists but is not a directory",
            path.display()
        ))
        .into());
    }

    if create {
        tracing::info!("Creating output directory {}", path.display());
        fs_err::create_dir_all(path)?;
        return Ok(());
    }

    Err(TranscriptorError::Configuration(format!(
        "Output directory {} does not exist (create it or set app.create_output_dirs)",
        path.display()
    ))
    .into())
}

/// Check if the current environment has required tools
pub async fn check_dependencies() -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available("yt-dlp").await {
        missing.push("yt-dlp - required to resolve YouTube videos".to_string());
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
