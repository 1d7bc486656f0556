//! Strategies for saving one or several resolved videos to disk.
//!
//! The factory picks a [`DownloadStrategy`] from a [`DownloadStrategyKind`] and the
//! handles the user resolved. The single video strategy names its file after a fixed
//! name, the multiple video strategy names each file after its position in the input.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::video::{VideoHandle, VideoHost};
use crate::{Result, TranscriptorError};

/// Name given to a single downloaded video when none is supplied
pub const DEFAULT_VIDEO_NAME: &str = "0";

/// Extension given to downloaded files when none is configured
pub const DEFAULT_VIDEO_EXTENSION: &str = "mp3";

/// Which strategy the factory should build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStrategyKind {
    SingleVideo,
    MultipleVideos,
}

impl DownloadStrategyKind {
    /// Menu entries in display order
    pub const ALL: [DownloadStrategyKind; 2] = [Self::SingleVideo, Self::MultipleVideos];

    /// Number the interactive menu shows for this kind
    pub fn menu_choice(&self) -> u32 {
        match self {
            DownloadStrategyKind::SingleVideo => 1,
            DownloadStrategyKind::MultipleVideos => 2,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DownloadStrategyKind::SingleVideo => "Download a single video",
            DownloadStrategyKind::MultipleVideos => "Download multiple videos",
        }
    }
}

impl TryFrom<u32> for DownloadStrategyKind {
    type Error = TranscriptorError;

    fn try_from(choice: u32) -> std::result::Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.menu_choice() == choice)
            .ok_or_else(|| TranscriptorError::InvalidArgument(format!("Invalid download strategy {}", choice)))
    }
}

impl FromStr for DownloadStrategyKind {
    type Err = TranscriptorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let choice: u32 = s
            .trim()
            .parse()
            .map_err(|_| TranscriptorError::InvalidArgument(format!("Invalid download strategy {:?}", s)))?;
        Self::try_from(choice)
    }
}

impl fmt::Display for DownloadStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadStrategyKind::SingleVideo => write!(f, "single-video"),
            DownloadStrategyKind::MultipleVideos => write!(f, "multiple-videos"),
        }
    }
}

/// Downloads one video under a fixed file name
pub struct SingleVideoStrategy {
    host: Arc<dyn VideoHost>,
    video: VideoHandle,
    name: String,
    extension: String,
}

impl SingleVideoStrategy {
    pub fn new(host: Arc<dyn VideoHost>, video: VideoHandle, name: Option<String>) -> Self {
        Self {
            host,
            video,
            name: name.unwrap_or_else(|| DEFAULT_VIDEO_NAME.to_string()),
            extension: DEFAULT_VIDEO_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }

    /// Save the best progressive mp4 stream to `destination/{name}.{extension}`
    pub async fn download(&self, destination: &Path) -> Result<PathBuf> {
        let stream = self.video.best_progressive_mp4().ok_or_else(|| TranscriptorError::ExternalService {
            service: self.host.platform_name(),
            message: format!("\"{}\" has no progressive mp4 stream", self.video.title),
        })?;

        let target = destination.join(self.file_name());
        tracing::info!(
            "Downloading \"{}\" ({}p, format {}) to {}",
            self.video.title,
            stream.height.unwrap_or(0),
            stream.format_id,
            target.display()
        );

        self.host.download(stream, &target).await?;
        Ok(target)
    }
}

/// Downloads every video in order, naming each file after its index
pub struct MultipleVideoStrategy {
    host: Arc<dyn VideoHost>,
    videos: Vec<VideoHandle>,
    extension: String,
}

impl MultipleVideoStrategy {
    pub fn new(host: Arc<dyn VideoHost>, videos: Vec<VideoHandle>) -> Self {
        Self {
            host,
            videos,
            extension: DEFAULT_VIDEO_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub async fn download(&self, destination: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.videos.len());

        for (index, video) in self.videos.iter().enumerate() {
            let single = SingleVideoStrategy::new(self.host.clone(), video.clone(), Some(index.to_string()))
                .with_extension(self.extension.clone());
            written.push(single.download(destination).await?);
        }

        Ok(written)
    }
}

/// A download strategy chosen once, at construction time
pub enum DownloadStrategy {
    Single(SingleVideoStrategy),
    Multiple(MultipleVideoStrategy),
}

impl DownloadStrategy {
    pub fn kind(&self) -> DownloadStrategyKind {
        match self {
            DownloadStrategy::Single(_) => DownloadStrategyKind::SingleVideo,
            DownloadStrategy::Multiple(_) => DownloadStrategyKind::MultipleVideos,
        }
    }

    /// Write every video to `destination`, returning the files in download order.
    /// Files with the same name are overwritten.
    pub async fn download(&self, destination: &Path) -> Result<Vec<PathBuf>> {
        match self {
            DownloadStrategy::Single(strategy) => Ok(vec![strategy.download(destination).await?]),
            DownloadStrategy::Multiple(strategy) => strategy.download(destination).await,
        }
    }
}

/// Builds download strategies bound to one video host
pub struct DownloadStrategyFactory {
    host: Arc<dyn VideoHost>,
    extension: String,
    default_name: Option<String>,
}

impl DownloadStrategyFactory {
    pub fn new(host: Arc<dyn VideoHost>) -> Self {
        Self {
            host,
            extension: DEFAULT_VIDEO_EXTENSION.to_string(),
            default_name: None,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = Some(name.into());
        self
    }

    /// Build the strategy for `kind`.
    ///
    /// `SingleVideo` needs exactly one handle. `MultipleVideos` needs a sequence,
    /// which may be empty.
    pub fn create(&self, kind: DownloadStrategyKind, videos: Option<Vec<VideoHandle>>) -> Result<DownloadStrategy> {
        match kind {
            DownloadStrategyKind::SingleVideo => {
                let mut videos = videos.unwrap_or_default();
                if videos.len() != 1 {
                    return Err(TranscriptorError::InvalidArgument(format!(
                        "The single video strategy needs exactly one video, got {}",
                        videos.len()
                    ))
                    .into());
                }

                let video = videos.remove(0);
                Ok(DownloadStrategy::Single(
                    SingleVideoStrategy::new(self.host.clone(), video, self.default_name.clone())
                        .with_extension(self.extension.clone()),
                ))
            }
            DownloadStrategyKind::MultipleVideos => {
                let videos = videos.ok_or_else(|| {
                    TranscriptorError::InvalidArgument(
                        "The multiple videos strategy needs a list of videos".to_string(),
                    )
                })?;

                Ok(DownloadStrategy::Multiple(
                    MultipleVideoStrategy::new(self.host.clone(), videos).with_extension(self.extension.clone()),
                ))
            }
        }
    }
}
