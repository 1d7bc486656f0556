//! Interactive menu and URL collection.

use console::style;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::download::DownloadStrategyKind;
use crate::utils::is_valid_youtube_url;
use crate::{Result, TranscriptorError};

/// URLs gathered for a download strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSelection {
    Single(String),
    Multiple(Vec<String>),
}

impl UrlSelection {
    pub fn into_urls(self) -> Vec<String> {
        match self {
            UrlSelection::Single(url) => vec![url],
            UrlSelection::Multiple(urls) => urls,
        }
    }
}

/// Line-oriented prompts over any reader/writer pair
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Print `prompt` and read one line without its line ending; `None` at end of input
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_string()))
    }

    pub fn display_welcome(&mut self) -> Result<()> {
        writeln!(self.output, "{}\n", style("Welcome to the subtitles creator").bold())?;
        Ok(())
    }

    fn display_strategy_menu(&mut self) -> Result<()> {
        writeln!(self.output, "Choose a download strategy:")?;
        for kind in DownloadStrategyKind::ALL {
            writeln!(self.output, "{}. {}", kind.menu_choice(), kind.description())?;
        }
        Ok(())
    }

    /// Show the strategy menu until a listed option is entered
    pub fn choose_strategy(&mut self) -> Result<DownloadStrategyKind> {
        loop {
            self.display_strategy_menu()?;

            let choice = self
                .read_line("Enter the option: ")?
                .ok_or(TranscriptorError::InputClosed)?;

            match choice.parse::<DownloadStrategyKind>() {
                Ok(kind) => {
                    tracing::debug!("User chose the {} strategy", kind);
                    return Ok(kind);
                }
                Err(_) => writeln!(self.output, "{}\n", style("Invalid option").red())?,
            }
        }
    }

    /// Ask until a valid YouTube URL is entered
    pub fn collect_single_url(&mut self) -> Result<String> {
        loop {
            let url = self
                .read_line("Enter the url of the video: ")?
                .ok_or(TranscriptorError::InputClosed)?;

            if is_valid_youtube_url(&url) {
                tracing::info!("User entered url: {}", url);
                return Ok(url);
            }

            self.reject(&url)?;
        }
    }

    /// Ask for URLs until a blank line or end of input. The blank line is not part of the result.
    pub fn collect_multiple_urls(&mut self) -> Result<Vec<String>> {
        writeln!(self.output, "You can now enter all urls (leave blank to stop)")?;

        let mut urls = Vec::new();
        while let Some(url) = self.read_line("Enter the url of the video: ")? {
            if url.is_empty() {
                break;
            }

            if is_valid_youtube_url(&url) {
                tracing::info!("User entered url: {}", url);
                urls.push(url);
            } else {
                self.reject(&url)?;
            }
        }

        Ok(urls)
    }

    pub fn collect_urls(&mut self, kind: DownloadStrategyKind) -> Result<UrlSelection> {
        match kind {
            DownloadStrategyKind::SingleVideo => self.collect_single_url().map(UrlSelection::Single),
            DownloadStrategyKind::MultipleVideos => self.collect_multiple_urls().map(UrlSelection::Multiple),
        }
    }

    fn reject(&mut self, url: &str) -> Result<()> {
        tracing::debug!("Rejected url: {:?}", url);
        writeln!(
            self.output,
            "{}",
            style("This url is not a valid youtube video url, please try again").yellow()
        )?;
        Ok(())
    }
}
