use anyhow::Context;
use async_trait::async_trait;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{StreamDescriptor, VideoHandle, VideoHost};
use crate::utils::{ensure_youtube_url, format_file_size};
use crate::{Result, TranscriptorError};

/// YouTube host backed by yt-dlp for metadata and reqwest for the media transfer
pub struct YtDlpHost {
    yt_dlp_path: String,
    client: reqwest::Client,
    show_progress: bool,
}

/// Subset of `yt-dlp --dump-json` output we rely on
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    webpage_url: Option<String>,
    #[serde(default)]
    formats: Vec<YtDlpFormat>,
}

#[derive(Debug, Deserialize)]
struct YtDlpFormat {
    format_id: String,
    url: Option<String>,
    ext: Option<String>,
    height: Option<u32>,
    vcodec: Option<String>,
    acodec: Option<String>,
    #[serde(default)]
    protocol: Option<String>,
    #[serde(default)]
    http_headers: HashMap<String, String>,
}

impl YtDlpFormat {
    /// Only formats fetched with a single plain GET are usable; HLS and DASH
    /// formats point at manifests, not media.
    fn into_descriptor(self) -> Option<StreamDescriptor> {
        if !self.is_direct() {
            return None;
        }

        let url = self.url?;
        let has_codec = |codec: &Option<String>| {
            codec.as_deref().is_some_and(|c| !c.is_empty() && c != "none")
        };

        Some(StreamDescriptor {
            has_video: has_codec(&self.vcodec),
            has_audio: has_codec(&self.acodec),
            format_id: self.format_id,
            url,
            container: self.ext.unwrap_or_default(),
            height: self.height,
            http_headers: self.http_headers,
        })
    }

    fn is_direct(&self) -> bool {
        match self.protocol.as_deref() {
            Some(protocol) => matches!(protocol, "http" | "https"),
            None => true,
        }
    }
}

impl YtDlpInfo {
    fn into_handle(self, requested_url: &str) -> VideoHandle {
        VideoHandle {
            id: self.id,
            title: self.title,
            webpage_url: self.webpage_url.unwrap_or_else(|| requested_url.to_string()),
            streams: self
                .formats
                .into_iter()
                .filter_map(YtDlpFormat::into_descriptor)
                .collect(),
        }
    }
}

impl YtDlpHost {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            client: reqwest::Client::new(),
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Use a preconfigured HTTP client for the media transfer
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<YtDlpInfo> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--no-playlist", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| TranscriptorError::ExternalService {
                service: "yt-dlp",
                message: format!("could not run {}: {}", self.yt_dlp_path, e),
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(TranscriptorError::ExternalService {
                service: "yt-dlp",
                message: error.trim().to_string(),
            }
            .into());
        }

        parse_video_info(&output.stdout)
    }

    fn progress_bar(&self, total: u64) -> Result<ProgressBar> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }

        let progress = ProgressBar::new(total);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")?,
        );
        Ok(progress)
    }
}

fn parse_video_info(stdout: &[u8]) -> Result<YtDlpInfo> {
    serde_json::from_slice(stdout).context("Failed to parse yt-dlp output")
}

#[async_trait]
impl VideoHost for YtDlpHost {
    async fn resolve(&self, url: &str) -> Result<VideoHandle> {
        ensure_youtube_url(url)?;

        tracing::info!("Getting video from url: {}", url);
        let handle = self.get_video_info(url).await?.into_handle(url);
        tracing::debug!("Resolved \"{}\" with {} streams", handle.title, handle.streams.len());

        Ok(handle)
    }

    async fn download(&self, stream: &StreamDescriptor, destination: &Path) -> Result<()> {
        let mut request = self.client.get(&stream.url);
        for (name, value) in &stream.http_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| TranscriptorError::ExternalService {
            service: "YouTube",
            message: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(TranscriptorError::ExternalService {
                service: "YouTube",
                message: format!("stream download returned HTTP {}", response.status()),
            }
            .into());
        }

        let total_size = response.content_length().unwrap_or(0);
        let progress = self.progress_bar(total_size)?;
        progress.set_message(format!("Downloading {}", destination.display()));

        let mut file = fs_err::File::create(destination)?;
        let mut downloaded = 0u64;
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
            progress.set_position(downloaded);
        }
        file.flush()?;

        progress.finish_with_message("Download complete");
        tracing::info!(
            "Saved {} ({})",
            destination.display(),
            format_file_size(downloaded)
        );

        Ok(())
    }

    fn platform_name(&self) -> &'static str {
        "YouTube"
    }
}

impl Default for YtDlpHost {
    fn default() -> Self {
        Self::new()
    }
}
