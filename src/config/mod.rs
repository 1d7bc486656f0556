use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::{Result, TranscriptorError};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// OpenAI transcription settings
    pub openai: OpenAiConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API root, without the trailing endpoint
    pub base_url: String,

    /// Transcription model identifier
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Where downloaded videos are written and read back from
    pub videos_dir: PathBuf,

    /// Where transcripts are written
    pub transcripts_dir: PathBuf,

    /// Extension given to downloaded files
    pub video_extension: String,

    /// File name used by the single video strategy
    pub default_video_name: String,

    /// What a failed transcription does to the rest of the batch
    pub failure_policy: FailurePolicy,

    /// Create missing output directories instead of failing
    pub create_output_dirs: bool,

    /// Debug log file, disabled when absent
    pub log_file: Option<PathBuf>,
}

/// Failure isolation for a transcription batch
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first file that fails
    #[default]
    Abort,
    /// Record the failure and keep going
    Continue,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "whisper-1".to_string(),
            api_key_env: "OPENAI_KEY".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            videos_dir: PathBuf::from("./outputs/videos/"),
            transcripts_dir: PathBuf::from("./outputs/transcripts/"),
            video_extension: "mp3".to_string(),
            default_video_name: "0".to_string(),
            failure_policy: FailurePolicy::Abort,
            create_output_dirs: false,
            log_file: Some(PathBuf::from("logs.log")),
        }
    }
}

impl Config {
    /// Load configuration from `path`, the working directory or the user config dir.
    /// A missing file is replaced by the defaults, which are written back to disk.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = Self::resolve_path(path)?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            Self::from_yaml(&content)
        } else {
            let config = Self::default();
            config.save(&config_path)?;
            Ok(config)
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// The file `load` reads: `path` when given, else the default location
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::config_path(),
        }
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("subtitles-creator").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        let base_url = Url::parse(&self.openai.base_url).map_err(|e| {
            TranscriptorError::Configuration(format!(
                "openai.base_url `{}` is not a valid URL: {}",
                self.openai.base_url, e
            ))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(TranscriptorError::Configuration(
                "openai.base_url must use HTTP or HTTPS".to_string(),
            )
            .into());
        }

        for (field, value) in [
            ("openai.model", &self.openai.model),
            ("openai.api_key_env", &self.openai.api_key_env),
            ("app.video_extension", &self.app.video_extension),
            ("app.default_video_name", &self.app.default_video_name),
        ] {
            if value.trim().is_empty() {
                return Err(TranscriptorError::Configuration(format!("{} must not be empty", field)).into());
            }
        }

        Ok(())
    }

    /// Read the API key from the environment, loading `.env` first
    pub fn api_key(&self) -> Result<String> {
        check_env_file(dotenvy::dotenv())?;

        match std::env::var(&self.openai.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(TranscriptorError::Configuration(format!(
                "{} environment variable is not set, check your .env file or your environment variables",
                self.openai.api_key_env
            ))
            .into()),
        }
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  API Base URL: {}", self.openai.base_url);
        println!("  Model: {}", self.openai.model);
        println!("  API Key Variable: {}", self.openai.api_key_env);
        println!("  Videos Directory: {}", self.app.videos_dir.display());
        println!("  Transcripts Directory: {}", self.app.transcripts_dir.display());
        println!("  Video Extension: {}", self.app.video_extension);
        println!("  Failure Policy: {:?}", self.app.failure_policy);
        if let Some(log_file) = &self.app.log_file {
            println!("  Log File: {}", log_file.display());
        }
    }
}

/// A missing `.env` is fine since the variable may come from the shell;
/// any other load failure is reported.
fn check_env_file<T>(loaded: std::result::Result<T, dotenvy::Error>) -> Result<()> {
    match loaded {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(TranscriptorError::Configuration(format!("Failed to load .env file: {}", e)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.openai.model, "whisper-1");
        assert_eq!(config.openai.api_key_env, "OPENAI_KEY");
        assert_eq!(config.app.videos_dir, PathBuf::from("./outputs/videos/"));
        assert_eq!(config.app.transcripts_dir, PathBuf::from("./outputs/transcripts/"));
        assert_eq!(config.app.video_extension, "mp3");
        assert_eq!(config.app.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let config = Config::from_yaml(
            "openai:\n  model: whisper-large\napp:\n  failure_policy: continue\n",
        )
        .unwrap();

        assert_eq!(config.openai.model, "whisper-large");
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.app.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.app.default_video_name, "0");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = Config::from_yaml("openai:\n  base_url: not a url\napp: {}\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TranscriptorError>(),
            Some(TranscriptorError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_extension_is_rejected() {
        let err = Config::from_yaml("openai: {}\napp:\n  video_extension: \"\"\n").unwrap_err();
        assert!(err.to_string().contains("app.video_extension"));
    }

    #[test]
    fn test_load_writes_defaults_when_missing() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("config.yaml");

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_missing_api_key_names_the_variable() {
        let mut config = Config::default();
        config.openai.api_key_env = "SUBTITLES_CREATOR_TEST_UNSET_KEY".to_string();

        let err = config.api_key().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TranscriptorError>(),
            Some(TranscriptorError::Configuration(_))
        ));
        assert!(err.to_string().contains("SUBTITLES_CREATOR_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let temp = tempfile::tempdir().unwrap();
        let loaded = dotenvy::from_path(temp.path().join(".env"));
        assert!(check_env_file(loaded).is_ok());
    }

    #[test]
    fn test_malformed_env_file_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let env_file = temp.path().join(".env");
        fs_err::write(&env_file, "SUBTITLES_CREATOR_TEST_BROKEN key without equals\n").unwrap();

        let err = check_env_file(dotenvy::from_path(&env_file)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TranscriptorError>(),
            Some(TranscriptorError::Configuration(_))
        ));
        assert!(err.to_string().contains(".env"));
    }
}
