use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ytmeta::batch::BATCH_COMPLETED;
use ytmeta::cli::{Cli, Commands, OutputFormat};
use ytmeta::{
    output, utils, BatchWorker, Config, ContentKind, FfmpegExtractor, PerplexityClient, Pipeline,
    WhisperCliTranscriber, YtmetaError,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "ytmeta=debug" } else { "ytmeta=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Process {
            files,
            output_dir,
            format,
            export,
        } => {
            let config = Config::load().await?;
            run_batch(config, files, output_dir, format, export, cli.quiet).await?;
        }
        Commands::Config { show, set_api_key } => {
            let mut config = Config::load().await?;
            if let Some(key) = set_api_key {
                config.set_api_key(&key).await?;
                println!("API key saved to: {}", Config::config_path()?.display());
            }
            if show || config.api_key().is_none() {
                config.display();
            }
        }
        Commands::Kinds => {
            println!("Generated content kinds:");
            for kind in ContentKind::ALL {
                println!("  • {}", kind);
            }
        }
    }

    Ok(())
}

async fn run_batch(
    config: Config,
    files: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    format: OutputFormat,
    export: bool,
    quiet: bool,
) -> Result<()> {
    let api_key = config
        .api_key()
        .ok_or(YtmetaError::MissingApiKey)
        .with_context(|| {
            format!(
                "Set {} or run `ytmeta config --set-api-key <KEY>` before processing",
                ytmeta::config::API_KEY_ENV
            )
        })?;

    // Check for required external dependencies (non-fatal)
    let missing_deps = utils::check_dependencies(&config.transcription.whisper_command).await;
    if !missing_deps.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }

    let pipeline = Pipeline::new(
        Arc::new(FfmpegExtractor::new(config.app.temp_dir.as_deref())?),
        Arc::new(WhisperCliTranscriber::new(&config.transcription)),
        Arc::new(PerplexityClient::new(&config.api, Some(api_key))?),
    );
    let worker = BatchWorker::new(pipeline);

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    worker.set_progress_listener(move |message| {
        let _ = tx.send(message.to_string());
    });

    for file in &files {
        if let Err(e) = utils::check_file_accessible(file) {
            tracing::warn!("{}", e);
        }
        worker.enqueue(file.to_string_lossy());
    }

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    progress.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    progress.enable_steady_tick(Duration::from_millis(120));
    progress.set_message(format!("Added {} file(s) to batch. Starting processing...", files.len()));

    let started = Instant::now();
    if !worker.start_draining() && !worker.is_draining() {
        anyhow::bail!("Batch worker could not be started");
    }

    while let Some(message) = rx.recv().await {
        if message.starts_with("Error processing file") {
            progress.println(format!("{} {}", style("✗").red(), message));
        }
        if message == BATCH_COMPLETED {
            progress.finish_with_message(message);
            break;
        }
        progress.set_message(message);
    }

    let results = worker.results();
    println!("{}", output::format_summary(&results, &format)?);

    if export || config.export.auto_export {
        let dir = match output_dir.or(config.export.output_dir) {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let exported = output::export_results(&results, &dir)?;
        println!("Exported {} file(s) to: {}", exported.len(), dir.display());
    }

    let elapsed = utils::format_duration(started.elapsed().as_secs_f64());
    let succeeded = results.succeeded();
    if succeeded == results.len() {
        eprintln!("{} Batch finished in {}", style("✓").green(), elapsed);
    } else {
        eprintln!(
            "{} Batch finished in {} with {} failure(s)",
            style("!").yellow(),
            elapsed,
            results.len() - succeeded
        );
    }

    Ok(())
}
