use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use subtitles_creator::cli::{Cli, Commands, Prompter};
use subtitles_creator::config::Config;
use subtitles_creator::transcribe::WhisperClient;
use subtitles_creator::video::youtube::YtDlpHost;
use subtitles_creator::{utils, Session};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    init_tracing(cli.verbose, config.app.log_file.as_deref())?;

    match cli.command.as_ref().unwrap_or(&Commands::Run) {
        Commands::Run => run(&cli, config).await?,
        Commands::Config { show } => {
            if *show {
                config.display();
            } else {
                println!("Configuration file: {}", Config::resolve_path(cli.config.as_deref())?.display());
                println!("Edit it manually, or use --show to print the values in use.");
            }
        }
        Commands::Platforms => {
            println!("Accepted video URLs:");
            println!("  • https://www.youtube.com/watch?v=<id>");
            println!("  • https://youtu.be/<id>");
            println!("  • https://www.youtube.com/embed/<id>, /v/<id>, /live/<id>");
            println!("  • m.youtube.com and youtube-nocookie.com variants, with or without protocol");
        }
    }

    Ok(())
}

async fn run(cli: &Cli, config: Config) -> Result<()> {
    // Fail fast on a missing credential, before any prompt
    let api_key = config.api_key()?;

    // Check for required external dependencies (non-fatal)
    let missing_deps = utils::check_dependencies().await;
    if !missing_deps.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }

    let show_progress = !cli.quiet;
    let host = Arc::new(YtDlpHost::new().with_progress(show_progress));
    let transcriber = WhisperClient::new(api_key, &config.openai);
    let session = Session::new(&config, host, transcriber).with_progress(show_progress);

    let mut prompter = Prompter::stdio();
    let report = session.run(&mut prompter).await?;

    let failed = report.failure_count();
    if failed > 0 {
        anyhow::bail!("{} of {} transcription(s) failed", failed, report.outcomes.len());
    }

    Ok(())
}

fn init_tracing(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let console_filter = if verbose {
        EnvFilter::new("subtitles_creator=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "subtitles_creator=info".into())
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .with_filter(EnvFilter::new("subtitles_creator=debug")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .with(file_layer)
        .init();

    Ok(())
}
