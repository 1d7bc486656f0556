//! Subtitles Creator - A Rust CLI tool for turning YouTube videos into text transcripts
//!
//! This library downloads the best progressive stream of one or more YouTube videos
//! and sends the saved media files to the OpenAI Whisper API for transcription.

pub mod cli;
pub mod config;
pub mod download;
pub mod output;
pub mod session;
pub mod transcribe;
pub mod utils;
pub mod video;

#[cfg(test)]
pub(crate) mod test_support;

pub use cli::{Cli, Commands};
pub use config::{Config, FailurePolicy};
pub use download::{DownloadStrategy, DownloadStrategyFactory, DownloadStrategyKind};
pub use session::Session;
pub use transcribe::{TranscriptionPipeline, TranscriptionReport, Transcriber};
pub use video::{StreamDescriptor, VideoHandle, VideoHost};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the subtitles creator
#[derive(thiserror::Error, Debug)]
pub enum TranscriptorError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not a valid YouTube video URL: {0}")]
    InvalidUrl(String),

    #[error("{service} request failed: {message}")]
    ExternalService { service: &'static str, message: String },

    #[error("Unexpected transcription response: expected {expected}, got {actual}")]
    TypeMismatch { expected: &'static str, actual: String },

    #[error("Transcription response is missing the `{0}` field")]
    MissingField(String),

    #[error("File operation failed: {0}")]
    FileError(String),

    #[error("Input closed before a value was entered")]
    InputClosed,
}
