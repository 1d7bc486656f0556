use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod prompt;

pub use prompt::{Prompter, UrlSelection};

#[derive(Parser, Debug)]
#[command(
    name = "subtitles-creator",
    about = "Subtitles Creator - Download YouTube videos and transcribe them with OpenAI Whisper",
    version,
    long_about = "An interactive CLI tool that downloads one or more YouTube videos and writes a text transcript for each of them using the OpenAI Whisper API. Run it without a command to start the menu."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file to use instead of the default location
    #[arg(short, long, global = true, value_name = "FILE", env = "SUBTITLES_CREATOR_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Choose a download strategy, enter URLs, then download and transcribe (default)
    Run,

    /// Show the configuration in use
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List accepted URL formats
    Platforms,
}
