use anyhow::Context;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::FailurePolicy;
use crate::output;
use crate::utils::transcript_path_for;
use crate::{Result, TranscriptorError};

pub mod whisper;

pub use whisper::WhisperClient;

/// Plain transcript text as returned by the service
pub type TranscriptText = String;

/// Model requested when none is configured
pub const DEFAULT_MODEL: &str = "whisper-1";

/// A speech-to-text service
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Submit `media` and return the service's structured response
    async fn transcribe(&self, media: &Path, model: &str) -> Result<Value>;
}

/// Pull the transcript out of a service response
pub fn extract_text(response: &Value) -> Result<TranscriptText> {
    let record = response.as_object().ok_or_else(|| TranscriptorError::TypeMismatch {
        expected: "a JSON object",
        actual: json_type_name(response).to_string(),
    })?;

    let text = record
        .get("text")
        .ok_or_else(|| TranscriptorError::MissingField("text".to_string()))?;

    text.as_str().map(str::to_string).ok_or_else(|| {
        TranscriptorError::TypeMismatch {
            expected: "a string `text` field",
            actual: json_type_name(text).to_string(),
        }
        .into()
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// What happened to one media file
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptOutcome {
    pub source: PathBuf,
    pub status: TranscriptStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptStatus {
    Written(PathBuf),
    Failed(String),
}

/// Outcomes of a batch, in processing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptionReport {
    pub outcomes: Vec<TranscriptOutcome>,
}

impl TranscriptionReport {
    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.status {
            TranscriptStatus::Written(path) => Some(path.as_path()),
            TranscriptStatus::Failed(_) => None,
        })
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, TranscriptStatus::Failed(_)))
            .count()
    }
}

/// Transcribes every media file of a directory into a mirrored transcripts directory
pub struct TranscriptionPipeline<T: Transcriber> {
    transcriber: T,
    model: String,
    failure_policy: FailurePolicy,
    show_progress: bool,
}

impl<T: Transcriber> TranscriptionPipeline<T> {
    pub fn new(transcriber: T) -> Self {
        Self {
            transcriber,
            model: DEFAULT_MODEL.to_string(),
            failure_policy: FailurePolicy::default(),
            show_progress: false,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Transcribe one file and write `{transcripts_dir}/{stem}.txt`
    pub async fn transcribe_file(&self, media: &Path, transcripts_dir: &Path) -> Result<PathBuf> {
        let target = transcript_path_for(media, transcripts_dir)?;

        tracing::info!("Transcribing {} with {}", media.display(), self.model);
        let response = self.transcriber.transcribe(media, &self.model).await?;
        let text = extract_text(&response)?;

        output::save_transcript(&text, &target)?;
        tracing::info!("Transcript saved to {}", target.display());

        Ok(target)
    }

    /// Transcribe every regular file in `videos_dir`, sorted by file name
    pub async fn transcribe_directory(&self, videos_dir: &Path, transcripts_dir: &Path) -> Result<TranscriptionReport> {
        let media_files = list_media_files(videos_dir)?;
        tracing::info!("Videos in path {} are {:?}", videos_dir.display(), media_files);

        let progress = self.spinner()?;
        let mut report = TranscriptionReport::default();

        for media in media_files {
            progress.set_message(format!("Transcribing {}...", media.display()));

            match self.transcribe_file(&media, transcripts_dir).await {
                Ok(target) => report.outcomes.push(TranscriptOutcome {
                    source: media,
                    status: TranscriptStatus::Written(target),
                }),
                Err(e) => match self.failure_policy {
                    FailurePolicy::Abort => {
                        progress.finish_and_clear();
                        return Err(e).with_context(|| format!("Failed to transcribe {}", media.display()));
                    }
                    FailurePolicy::Continue => {
                        tracing::warn!("Skipping {}: {:#}", media.display(), e);
                        report.outcomes.push(TranscriptOutcome {
                            source: media,
                            status: TranscriptStatus::Failed(format!("{:#}", e)),
                        });
                    }
                },
            }
            progress.inc(1);
        }

        progress.finish_with_message("Transcription complete");
        Ok(report)
    }

    fn spinner(&self) -> Result<ProgressBar> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }

        let progress = ProgressBar::new_spinner();
        progress.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
        progress.enable_steady_tick(std::time::Duration::from_millis(120));
        Ok(progress)
    }
}

fn list_media_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs_err::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        } else {
            tracing::warn!("Skipping {}: not a regular file", path.display());
        }
    }

    files.sort();
    Ok(files)
}
