use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::{Prompter, UrlSelection};
use crate::config::{Config, FailurePolicy};
use crate::download::{DownloadStrategyFactory, DownloadStrategyKind};
use crate::output;
use crate::transcribe::{Transcriber, TranscriptionPipeline, TranscriptionReport};
use crate::utils::prepare_output_dir;
use crate::video::{self, VideoHost};
use crate::Result;

/// One download-then-transcribe run over injected services
pub struct Session<T: Transcriber> {
    host: Arc<dyn VideoHost>,
    factory: DownloadStrategyFactory,
    pipeline: TranscriptionPipeline<T>,
    videos_dir: PathBuf,
    transcripts_dir: PathBuf,
    create_output_dirs: bool,
}

impl<T: Transcriber> Session<T> {
    pub fn new(config: &Config, host: Arc<dyn VideoHost>, transcriber: T) -> Self {
        let factory = DownloadStrategyFactory::new(host.clone())
            .with_extension(config.app.video_extension.clone())
            .with_default_name(config.app.default_video_name.clone());

        let pipeline = TranscriptionPipeline::new(transcriber)
            .with_model(config.openai.model.clone())
            .with_failure_policy(config.app.failure_policy);

        Self {
            host,
            factory,
            pipeline,
            videos_dir: config.app.videos_dir.clone(),
            transcripts_dir: config.app.transcripts_dir.clone(),
            create_output_dirs: config.app.create_output_dirs,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.pipeline = self.pipeline.with_progress(show_progress);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.pipeline = self.pipeline.with_failure_policy(policy);
        self
    }

    /// Fail before any network call when an output directory is unusable
    pub fn check_output_dirs(&self) -> Result<()> {
        prepare_output_dir(&self.videos_dir, self.create_output_dirs)?;
        prepare_output_dir(&self.transcripts_dir, self.create_output_dirs)?;
        Ok(())
    }

    /// Resolve the selected URLs and save them with the strategy for `kind`
    pub async fn download(&self, kind: DownloadStrategyKind, selection: UrlSelection) -> Result<Vec<PathBuf>> {
        let urls = selection.into_urls();
        tracing::info!("Resolving {} url(s) for the {} strategy", urls.len(), kind);

        let videos = video::resolve_all(self.host.as_ref(), &urls).await?;
        let strategy = self.factory.create(kind, Some(videos))?;

        strategy.download(&self.videos_dir).await
    }

    /// Transcribe everything currently in the videos directory
    pub async fn transcribe_all(&self) -> Result<TranscriptionReport> {
        self.pipeline
            .transcribe_directory(&self.videos_dir, &self.transcripts_dir)
            .await
    }

    /// The interactive flow: menu, URLs, download, transcription
    pub async fn run<R: BufRead, W: Write>(&self, prompter: &mut Prompter<R, W>) -> Result<TranscriptionReport> {
        self.check_output_dirs()?;

        prompter.display_welcome()?;
        let kind = prompter.choose_strategy()?;
        let selection = prompter.collect_urls(kind)?;

        let downloaded = self.download(kind, selection).await?;
        output::print_downloads(prompter.output(), &downloaded)?;

        let report = self.transcribe_all().await?;
        output::print_report(prompter.output(), &report)?;

        Ok(report)
    }
}
