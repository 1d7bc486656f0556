use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

pub mod youtube;

use crate::Result;

/// A resolved remote video and the streams it can be downloaded from
#[derive(Debug, Clone, PartialEq)]
pub struct VideoHandle {
    /// Platform identifier of the video
    pub id: String,

    /// Title of the video
    pub title: String,

    /// Page the video was resolved from
    pub webpage_url: String,

    /// Every stream the host offers for this video
    pub streams: Vec<StreamDescriptor>,
}

/// One downloadable rendition of a video
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDescriptor {
    /// Host specific format identifier
    pub format_id: String,

    /// Direct media URL
    pub url: String,

    /// Container extension (mp4, webm, m4a, ...)
    pub container: String,

    /// Vertical resolution in pixels, absent for audio-only streams
    pub height: Option<u32>,

    pub has_video: bool,

    pub has_audio: bool,

    /// Headers the host expects on the media request
    pub http_headers: HashMap<String, String>,
}

impl StreamDescriptor {
    /// Progressive streams carry both audio and video in one file
    pub fn is_progressive(&self) -> bool {
        self.has_video && self.has_audio
    }
}

impl VideoHandle {
    /// Highest resolution progressive stream in an mp4 container
    pub fn best_progressive_mp4(&self) -> Option<&StreamDescriptor> {
        self.streams
            .iter()
            .filter(|stream| stream.is_progressive() && stream.container.eq_ignore_ascii_case("mp4"))
            .max_by_key(|stream| stream.height.unwrap_or(0))
    }
}

/// A video hosting service that can resolve URLs and download streams
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoHost: Send + Sync {
    /// Resolve a video URL to a handle listing its streams
    async fn resolve(&self, url: &str) -> Result<VideoHandle>;

    /// Write `stream` to `destination`, replacing any existing file
    async fn download(&self, stream: &StreamDescriptor, destination: &Path) -> Result<()>;

    /// Get the name of this platform
    fn platform_name(&self) -> &'static str;
}

/// Resolve every URL in order, stopping at the first failure
pub async fn resolve_all(host: &dyn VideoHost, urls: &[String]) -> Result<Vec<VideoHandle>> {
    let mut videos = Vec::with_capacity(urls.len());
    for url in urls {
        videos.push(host.resolve(url).await?);
    }
    Ok(videos)
}
