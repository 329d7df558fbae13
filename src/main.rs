use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_classifier::{
    config::{Config, MatchMode, UnmatchedPolicy},
    data_mapping::CategoryRegistry,
    errors::{AppResult, SourceError},
    proxy::PlaylistWriter,
    services::{GitPublisher, PlaylistProcessor, PlaylistPublisher, ProcessingReport, PublishOutcome},
    sources::{create_source, FilePlaylistSource, PlaylistSource},
};

#[derive(Parser)]
#[command(name = "m3u-classifier")]
#[command(version)]
#[command(about = "Sort IPTV playlist channels into categories and rewrite their group titles")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CONFIG_FILE", default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Log level
    #[arg(short = 'v', long, default_value = "info", global = true)]
    log_level: String,

    /// Write a JSON processing report to this path
    #[arg(long, value_name = "PATH", global = true)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the source playlist, classify it, save it and optionally publish it
    Run {
        /// Source playlist URL (overrides config file)
        #[arg(short, long, env = "M3U_URL")]
        url: Option<String>,

        /// Output file (overrides config file)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Skip the git publish step even when enabled in the config
        #[arg(long)]
        no_publish: bool,

        #[command(flatten)]
        matching: MatchingOverrides,
    },
    /// Classify a local playlist file
    Process {
        /// Playlist to read
        #[arg(short, long, value_name = "PATH")]
        input: PathBuf,

        /// Output file; stdout when omitted
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        #[command(flatten)]
        matching: MatchingOverrides,
    },
    /// Write a starter configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate the configuration and print the category table
    Check,
}

#[derive(Args)]
struct MatchingOverrides {
    /// Matching mode
    #[arg(short, long, value_enum)]
    mode: Option<MatchMode>,

    /// Approximate-mode similarity threshold (0.0-1.0)
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Unmatched entries: drop, passthrough or tag:<category>
    #[arg(long, value_name = "POLICY")]
    unmatched: Option<UnmatchedPolicy>,
}

impl MatchingOverrides {
    fn apply(self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.matching.mode = mode;
        }
        if let Some(threshold) = self.threshold {
            config.matching.similarity_threshold = threshold;
        }
        if let Some(unmatched) = self.unmatched {
            config.matching.unmatched = unmatched;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `process` can write the playlist to stdout
    let log_filter = format!("m3u_classifier={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Init { force } => {
            Config::write_template(&cli.config, force)?;
            println!("Wrote {}", cli.config.display());
        }
        Commands::Check => check(&cli.config)?,
        Commands::Process {
            input,
            output,
            matching,
        } => {
            let mut config = Config::load_from_file(&cli.config)?;
            matching.apply(&mut config);

            let content = FilePlaylistSource::new(&input).fetch().await?;
            let report = process(&config, &content)?;
            match output {
                Some(path) => PlaylistWriter::new().save(&path, &report.playlist).await?,
                None => print!("{}", report.playlist),
            }
            write_report(cli.report.as_deref(), &report).await?;
        }
        Commands::Run {
            url,
            output,
            no_publish,
            matching,
        } => {
            info!("Starting m3u-classifier v{}", env!("CARGO_PKG_VERSION"));
            let mut config = Config::load_from_file(&cli.config)?;
            matching.apply(&mut config);

            let url = url
                .or_else(|| config.source.url.clone())
                .ok_or(SourceError::MissingUrl)?;
            let source = create_source(&url, &config.source)?;
            let content = source.fetch().await?;

            let report = process(&config, &content)?;
            let output = output.unwrap_or_else(|| config.output.path.clone());
            PlaylistWriter::new().save(&output, &report.playlist).await?;
            write_report(cli.report.as_deref(), &report).await?;

            if config.publish.enabled && !no_publish {
                let publisher = GitPublisher::from_config(&config.publish);
                let message = GitPublisher::commit_message(&config.publish.commit_message, Utc::now());
                match publisher.publish(&output, &message).await? {
                    PublishOutcome::Published => info!("Published {}", output.display()),
                    PublishOutcome::NothingToCommit => info!("No playlist changes to publish"),
                }
            }
        }
    }

    Ok(())
}

fn process(config: &Config, content: &str) -> AppResult<ProcessingReport> {
    let registry = CategoryRegistry::build(&config.categories)?;
    if registry.is_empty() {
        warn!("No categories configured; every entry is unmatched");
    }
    let processor = PlaylistProcessor::new(&registry, &config.matching)?
        .with_header(config.output.header.clone());
    Ok(processor.process(content))
}

fn check(config_path: &Path) -> AppResult<()> {
    let config = Config::load_from_file(config_path)?;
    let registry = CategoryRegistry::build(&config.categories)?;
    let processor = PlaylistProcessor::new(&registry, &config.matching)?;

    println!("Configuration OK: {}", config_path.display());
    println!(
        "Mode: {} (threshold {}), unmatched: {}",
        processor.classifier().mode(),
        config.matching.similarity_threshold,
        config.matching.unmatched
    );
    for category in registry.categories() {
        let rules: Vec<String> = category.rules().iter().map(ToString::to_string).collect();
        println!("  {:<16} {}", category.name(), rules.join(", "));
    }
    Ok(())
}

async fn write_report(path: Option<&Path>, report: &ProcessingReport) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    info!("Wrote processing report to {}", path.display());
    Ok(())
}
