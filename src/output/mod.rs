use anyhow::Context;
use console::style;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::transcribe::{TranscriptStatus, TranscriptionReport};
use crate::{Result, TranscriptorError};

/// Write a transcript verbatim, replacing any previous version
pub fn save_transcript(transcript: &str, path: &Path) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = parent {
        if !dir.is_dir() {
            return Err(TranscriptorError::FileError(format!(
                "Transcript directory {} does not exist",
                dir.display()
            ))
            .into());
        }
    }

    fs_err::write(path, transcript).context("Failed to write transcript")?;
    Ok(())
}

/// Print the files a run downloaded
pub fn print_downloads(out: &mut impl Write, files: &[PathBuf]) -> Result<()> {
    if files.is_empty() {
        writeln!(out, "{}", style("No videos were downloaded").yellow())?;
        return Ok(());
    }

    writeln!(out, "{}", style(format!("Downloaded {} video(s):", files.len())).bold())?;
    for file in files {
        writeln!(out, "  • {}", file.display())?;
    }
    Ok(())
}

/// Print one line per transcribed file
pub fn print_report(out: &mut impl Write, report: &TranscriptionReport) -> Result<()> {
    if report.outcomes.is_empty() {
        writeln!(out, "{}", style("No videos to transcribe").yellow())?;
        return Ok(());
    }

    for outcome in &report.outcomes {
        match &outcome.status {
            TranscriptStatus::Written(path) => writeln!(
                out,
                "  {} {} -> {}",
                style("✓").green(),
                outcome.source.display(),
                path.display()
            )?,
            TranscriptStatus::Failed(reason) => writeln!(
                out,
                "  {} {}: {}",
                style("✗").red(),
                outcome.source.display(),
                reason
            )?,
        }
    }

    let failed = report.failure_count();
    let written = report.outcomes.len() - failed;
    writeln!(out, "{} transcript(s) written, {} failed", written, failed)?;
    Ok(())
}
