//! Main entry point for the Sublate CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sublate::cli::commands::{self, Commands};
use sublate::TranslatorConfig;

/// Sublate - translate text and documents through any registered provider
#[derive(Parser, Debug)]
#[command(name = "sublate", version, about, long_about = None)]
struct Args {
    /// Provider API key (optional, defaults to DEEPL_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Provider id (default: deepl)
    #[arg(long)]
    provider: Option<String>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Maximum concurrent requests in a batch
    #[arg(long)]
    max_concurrent: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn load_config(args: &Args) -> anyhow::Result<TranslatorConfig> {
    let mut config = match &args.config {
        Some(path) => TranslatorConfig::from_file(path)?,
        None if std::env::var("DEEPL_API_KEY").is_ok() => TranslatorConfig::from_env()?,
        None => TranslatorConfig::default(),
    };

    // Override config with CLI args if provided
    if let Some(api_key) = &args.api_key {
        config.api_key = api_key.clone();
    }
    if let Some(provider) = &args.provider {
        config.provider = provider.parse()?;
    }
    if let Some(max_concurrent) = args.max_concurrent {
        config.max_concurrent = max_concurrent;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={}", env!("CARGO_CRATE_NAME"), log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(&args)?;

    // Execute command
    match args.command {
        Some(Commands::Text {
            text,
            source_lang,
            target_lang,
        }) => {
            commands::handle_text(config, text, source_lang, target_lang).await?;
        }
        Some(Commands::File {
            file,
            output,
            source_lang,
            target_lang,
        }) => {
            commands::handle_file(config, file, output, source_lang, target_lang).await?;
        }
        Some(Commands::Batch {
            dir,
            output,
            source_lang,
            target_lang,
            recursive,
        }) => {
            commands::handle_batch(config, dir, output, source_lang, target_lang, recursive)
                .await?;
        }
        Some(Commands::Cost { text }) => {
            commands::handle_cost(config, text).await?;
        }
        Some(Commands::Providers) => {
            commands::handle_providers().await?;
        }
        Some(Commands::Server { host, port }) => {
            commands::handle_server(config, host, port).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
