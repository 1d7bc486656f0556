use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use subtitles_creator::{StreamDescriptor, VideoHandle, VideoHost};

/// Resolves any URL to a fake video and writes the stream URL as the file body
#[derive(Clone, Default)]
pub struct MockVideoHost {
    pub resolved: Arc<Mutex<Vec<String>>>,
    pub downloads: Arc<Mutex<Vec<(String, PathBuf)>>>,
    pub fail_resolve_for: Option<String>,
}

impl MockVideoHost {
    pub fn failing_for(url: &str) -> Self {
        Self {
            fail_resolve_for: Some(url.to_string()),
            ..Self::default()
        }
    }
}

fn stream(format_id: &str, id: &str, height: u32, audio: bool) -> StreamDescriptor {
    StreamDescriptor {
        format_id: format_id.to_string(),
        url: format!("https://media.example/{}/{}", id, format_id),
        container: "mp4".to_string(),
        height: Some(height),
        has_video: true,
        has_audio: audio,
        http_headers: HashMap::new(),
    }
}

#[async_trait]
impl VideoHost for MockVideoHost {
    async fn resolve(&self, url: &str) -> anyhow::Result<VideoHandle> {
        if self.fail_resolve_for.as_deref() == Some(url) {
            return Err(anyhow::anyhow!("video unavailable: {}", url));
        }
        self.resolved.lock().unwrap().push(url.to_string());

        let id = url.rsplit(['/', '=']).next().unwrap_or_default().to_string();
        Ok(VideoHandle {
            title: format!("Video {}", id),
            webpage_url: url.to_string(),
            streams: vec![
                stream("18", &id, 360, true),
                stream("22", &id, 720, true),
                stream("137", &id, 1080, false),
            ],
            id,
        })
    }

    async fn download(&self, stream: &StreamDescriptor, destination: &Path) -> anyhow::Result<()> {
        self.downloads
            .lock()
            .unwrap()
            .push((stream.url.clone(), destination.to_path_buf()));
        std::fs::write(destination, stream.url.as_bytes())?;
        Ok(())
    }

    fn platform_name(&self) -> &'static str {
        "MockTube"
    }
}
