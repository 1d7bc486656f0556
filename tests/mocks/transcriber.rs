use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use subtitles_creator::Transcriber;

/// Echoes the media body back as the transcript
#[derive(Clone, Default)]
pub struct MockTranscriber {
    pub calls: Arc<Mutex<Vec<(PathBuf, String)>>>,
    pub fail_for: Option<String>,
}

impl MockTranscriber {
    pub fn failing_for(file_name: &str) -> Self {
        Self {
            fail_for: Some(file_name.to_string()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, media: &Path, model: &str) -> anyhow::Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((media.to_path_buf(), model.to_string()));

        let name = media.file_name().unwrap().to_string_lossy().to_string();
        if self.fail_for.as_deref() == Some(name.as_str()) {
            return Err(anyhow::anyhow!("HTTP 500 for {}", name));
        }

        let body = std::fs::read_to_string(media)?;
        Ok(json!({ "text": format!("transcript of {}", body) }))
    }
}
