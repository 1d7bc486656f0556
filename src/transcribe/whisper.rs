use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::path::Path;

use super::Transcriber;
use crate::config::OpenAiConfig;
use crate::{Result, TranscriptorError};

/// Media containers the transcription endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Mp3,
    Mp4,
    M4a,
    Wav,
    Webm,
    Ogg,
}

impl MediaFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" | "mpga" | "mpeg" => Some(MediaFormat::Mp3),
            "mp4" => Some(MediaFormat::Mp4),
            "m4a" => Some(MediaFormat::M4a),
            "wav" => Some(MediaFormat::Wav),
            "webm" => Some(MediaFormat::Webm),
            "ogg" | "oga" => Some(MediaFormat::Ogg),
            _ => None,
        }
    }

    /// Get MIME type for the format
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "audio/mpeg",
            MediaFormat::Mp4 => "video/mp4",
            MediaFormat::M4a => "audio/mp4",
            MediaFormat::Wav => "audio/wav",
            MediaFormat::Webm => "audio/webm",
            MediaFormat::Ogg => "audio/ogg",
        }
    }
}

/// Client for the OpenAI `audio/transcriptions` endpoint
pub struct WhisperClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WhisperClient {
    pub fn new(api_key: impl Into<String>, config: &OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Use a preconfigured HTTP client for the upload
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, media: &Path, model: &str) -> Result<Value> {
        let file_name = media
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();
        let mime = MediaFormat::from_path(media)
            .unwrap_or(MediaFormat::Mp3)
            .mime_type();

        let bytes = tokio::fs::read(media)
            .await
            .with_context(|| format!("Failed to read {}", media.display()))?;

        tracing::debug!("Uploading {} ({} bytes, {})", file_name, bytes.len(), mime);

        let part = Part::bytes(bytes).file_name(file_name).mime_str(mime)?;
        let form = Form::new().text("model", model.to_string()).part("file", part);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptorError::ExternalService {
                service: "OpenAI",
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(TranscriptorError::ExternalService {
                service: "OpenAI",
                message: format!("HTTP {}: {}", status, message),
            }
            .into());
        }

        let body = response
            .json::<Value>()
            .await
            .context("Failed to decode transcription response")?;

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve, StubResponse};

    #[test]
    fn test_media_format_from_path() {
        assert_eq!(MediaFormat::from_path(Path::new("0.mp3")), Some(MediaFormat::Mp3));
        assert_eq!(MediaFormat::from_path(Path::new("talk.MP4")), Some(MediaFormat::Mp4));
        assert_eq!(MediaFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(MediaFormat::from_path(Path::new("no_extension")), None);
        assert_eq!(MediaFormat::Mp4.mime_type(), "video/mp4");
    }

    #[test]
    fn test_endpoint_ignores_trailing_slash() {
        let config = OpenAiConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..OpenAiConfig::default()
        };
        let client = WhisperClient::new("sk-test", &config);
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/audio/transcriptions");
    }

    fn local_client(base_url: &str) -> WhisperClient {
        let config = OpenAiConfig {
            base_url: format!("{}/v1", base_url),
            ..OpenAiConfig::default()
        };
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        WhisperClient::new("sk-test-key", &config).with_client(client)
    }

    #[tokio::test]
    async fn test_transcribe_posts_multipart_form_with_bearer_auth() {
        let (base_url, server) =
            serve(vec![StubResponse::json(200, r#"{"text": "hello from the stub"}"#)]).await;
        let temp = tempfile::tempdir().unwrap();
        let media = temp.path().join("0.mp3");
        std::fs::write(&media, b"ID3 fake audio payload").unwrap();

        let body = local_client(&base_url)
            .transcribe(&media, "whisper-1")
            .await
            .unwrap();
        assert_eq!(body, serde_json::json!({"text": "hello from the stub"}));

        let requests = server.await.unwrap();
        let request = &requests[0];
        assert_eq!(request.request_line(), "POST /v1/audio/transcriptions HTTP/1.1");
        assert_eq!(request.header("authorization"), Some("Bearer sk-test-key"));
        assert!(request
            .header("content-type")
            .is_some_and(|v| v.starts_with("multipart/form-data; boundary=")));

        let form = request.body_text();
        assert!(form.contains(r#"name="model""#));
        assert!(form.contains("whisper-1"));
        assert!(form.contains(r#"name="file"; filename="0.mp3""#));
        assert!(form.to_lowercase().contains("content-type: audio/mpeg"));
        assert!(form.contains("ID3 fake audio payload"));
    }

    #[tokio::test]
    async fn test_error_status_is_external_service() {
        let (base_url, server) = serve(vec![
            StubResponse::json(500, r#"{"error": {"message": "upstream exploded"}}"#),
            StubResponse::json(200, r#"{"text": "second attempt"}"#),
        ])
        .await;
        let temp = tempfile::tempdir().unwrap();
        let media = temp.path().join("1.mp3");
        std::fs::write(&media, b"audio").unwrap();

        let client = local_client(&base_url);

        let err = client.transcribe(&media, "whisper-1").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TranscriptorError>(),
            Some(TranscriptorError::ExternalService { service: "OpenAI", .. })
        ));
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("upstream exploded"));

        let body = client.transcribe(&media, "whisper-1").await.unwrap();
        assert_eq!(body["text"], "second attempt");

        assert_eq!(server.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_external_service() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let temp = tempfile::tempdir().unwrap();
        let media = temp.path().join("0.mp3");
        std::fs::write(&media, b"audio").unwrap();

        let err = local_client(&base_url)
            .transcribe(&media, "whisper-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TranscriptorError>(),
            Some(TranscriptorError::ExternalService { service: "OpenAI", .. })
        ));
    }
}
