//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::core::config::TranslatorConfig;
use crate::core::models::{Language, Request};
use crate::core::provider::Client;
use crate::core::translator::Translator;

/// Commands for Sublate
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate text segments
    Text {
        /// Segments to translate
        #[arg(required = true)]
        text: Vec<String>,

        /// Source language (auto-detect if not specified)
        #[arg(long)]
        source_lang: Option<String>,

        /// Target language
        #[arg(short, long, default_value = "DE")]
        target_lang: String,
    },

    /// Translate a document
    File {
        /// Input file (required)
        #[arg(short, long)]
        file: PathBuf,

        /// Output file (default: <name>_<lang>.<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source language (auto-detect if not specified)
        #[arg(long)]
        source_lang: Option<String>,

        /// Target language
        #[arg(short, long, default_value = "DE")]
        target_lang: String,
    },

    /// Translate every document in a directory
    Batch {
        /// Input directory (required)
        #[arg(short, long)]
        dir: PathBuf,

        /// Output directory (default: <dir>/translated)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source language (auto-detect if not specified)
        #[arg(long)]
        source_lang: Option<String>,

        /// Target language
        #[arg(short, long, default_value = "DE")]
        target_lang: String,

        /// Recursively include subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Estimate characters and cost without calling the provider
    Cost {
        /// Segments to estimate
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// List registered providers
    Providers,

    /// Start HTTP API server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

fn parse_lang(code: &str) -> anyhow::Result<Language> {
    code.parse::<Language>().map_err(|e| anyhow::anyhow!(e))
}

fn parse_source(code: Option<&str>) -> anyhow::Result<Option<Language>> {
    code.map(parse_lang).transpose()
}

/// Build the configured client from the built-in providers
fn build_client(config: &TranslatorConfig) -> anyhow::Result<Arc<dyn Client>> {
    config.validate()?;
    let registry = crate::providers::builtin_registry()?;
    Ok(registry.get_client(&config.provider, &config.credentials())?)
}

/// Token cancelled on Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n⏹  Cancelling...");
            child.cancel();
        }
    });
    token
}

/// `<dir>/<stem>_<lang>.<ext>`
pub fn default_output(input: &Path, to: Language) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    let name = match input.extension() {
        Some(ext) => format!("{}_{}.{}", stem, to.lower(), ext.to_string_lossy()),
        None => format!("{}_{}", stem, to.lower()),
    };

    input.with_file_name(name)
}

/// Files directly in `dir`, or in the whole tree when `recursive`
pub fn find_files(dir: &Path, recursive: bool) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();

    files.sort();
    Ok(files)
}

async fn read_file_request(path: &Path, from: Option<Language>, to: Language) -> anyhow::Result<Request> {
    let binary = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut request = Request::file(binary, file_name, to);
    request.from = from;
    Ok(request)
}

/// Handle text translation command
pub async fn handle_text(
    config: TranslatorConfig,
    text: Vec<String>,
    source_lang: Option<String>,
    target_lang: String,
) -> anyhow::Result<()> {
    use tracing::info;

    let client = build_client(&config)?;
    let mut request = Request::text(text, parse_lang(&target_lang)?);
    request.from = parse_source(source_lang.as_deref())?;

    info!("Translating {} segments to {}", request.text.len(), request.to);

    let response = Translator::from_config(&config)
        .translate(&cancel_on_ctrl_c(), &request, client.as_ref())
        .await?;

    for line in response.text {
        println!("{}", line);
    }

    Ok(())
}

/// Handle document translation command
pub async fn handle_file(
    config: TranslatorConfig,
    file: PathBuf,
    output: Option<PathBuf>,
    source_lang: Option<String>,
    target_lang: String,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;
    use tracing::info;

    let start_time = Instant::now();
    let client = build_client(&config)?;
    let to = parse_lang(&target_lang)?;
    let output = output.unwrap_or_else(|| default_output(&file, to));

    info!("Input: {}", file.display());
    info!("Output: {}", output.display());
    info!("Target language: {}", to);

    let request = read_file_request(&file, parse_source(source_lang.as_deref())?, to).await?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Translating {}", file.display()));

    let result = Translator::from_config(&config)
        .translate(&cancel_on_ctrl_c(), &request, client.as_ref())
        .await;
    pb.finish_and_clear();

    let response = result?;
    let bytes = response.binary.unwrap_or_default();
    tokio::fs::write(&output, &bytes).await?;

    println!("\n✅ Document translated!");
    println!("   Output: {}", output.display());
    println!("   Size: {} bytes", bytes.len());
    println!("   Time: {:?}", start_time.elapsed());

    Ok(())
}

/// Handle directory batch command
pub async fn handle_batch(
    config: TranslatorConfig,
    dir: PathBuf,
    output: Option<PathBuf>,
    source_lang: Option<String>,
    target_lang: String,
    recursive: bool,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;
    use tracing::info;

    let start_time = Instant::now();
    let client = build_client(&config)?;
    let to = parse_lang(&target_lang)?;
    let from = parse_source(source_lang.as_deref())?;
    let output = output.unwrap_or_else(|| dir.join("translated"));

    let files: Vec<PathBuf> = find_files(&dir, recursive)?
        .into_iter()
        .filter(|f| !f.starts_with(&output))
        .collect();
    if files.is_empty() {
        anyhow::bail!("No files found in {}", dir.display());
    }

    info!("Starting batch translation of {} files", files.len());
    info!("Output: {}", output.display());
    info!("Recursive: {}", recursive);

    let mut requests = Vec::with_capacity(files.len());
    for file in &files {
        requests.push(read_file_request(file, from, to).await?);
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Translating {} files", files.len()));

    let results = Translator::from_config(&config)
        .batch_translate(&cancel_on_ctrl_c(), &requests, client.as_ref())
        .await;
    pb.finish_and_clear();

    tokio::fs::create_dir_all(&output).await?;

    let mut processed = 0;
    let mut failed = 0;

    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(response) => {
                let relative = file.strip_prefix(&dir).unwrap_or(file);
                let target = default_output(&output.join(relative), to);
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&target, response.binary.unwrap_or_default()).await?;
                processed += 1;
            }
            Err(e) => {
                failed += 1;
                eprintln!("Error processing {}: {}", file.display(), e);
            }
        }
    }

    let duration = start_time.elapsed();
    info!(
        "Completed: {} processed, {} failed in {:?}",
        processed, failed, duration
    );

    println!("\n✅ Batch translation completed!");
    println!("   Processed: {}", processed);
    println!("   Failed: {}", failed);
    println!("   Time: {:?}", duration);

    Ok(())
}

/// Handle cost estimate command
pub async fn handle_cost(config: TranslatorConfig, text: Vec<String>) -> anyhow::Result<()> {
    let client = build_client(&config)?;
    let request = Request::text(text, Language::EnglishUs);

    println!("Provider: {} ({})", client.name(), client.version());
    println!("Characters: {}", client.get_char_count(&request));
    println!("Estimated cost: {:.6}", client.get_cost(&request));

    Ok(())
}

/// Handle providers command
pub async fn handle_providers() -> anyhow::Result<()> {
    let registry = crate::providers::builtin_registry()?;
    for id in registry.providers() {
        println!("{}", id);
    }
    Ok(())
}

/// Handle server command
pub async fn handle_server(config: TranslatorConfig, host: String, port: u16) -> anyhow::Result<()> {
    use crate::server::api::run_server;
    use tracing::info;

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}", host, port);

    run_server(config, host, port).await?;

    Ok(())
}
