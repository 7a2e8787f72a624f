use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli_output;
mod client;
mod comparison;
mod config;
mod error_classifier;
mod metrics;
mod models;
mod report;
mod semantic_classifier;
mod session;
mod token_classifier;

use cli_output::{OutputMode, OutputWriter};
use client::HttpAnalyzerClient;
use config::AnalyzerConfig;
use report::SessionReport;
use session::{RequestKind, SessionController};

#[derive(Parser)]
#[command(name = "parsescope")]
#[command(about = "Inspect analyzer results and compare optimized vs unoptimized runs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Analyzer base URL (overrides config file and PARSESCOPE_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Emit JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct SourceArgs {
    /// Read source code from a file (default: stdin)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Inline source code
    #[arg(short, long, conflicts_with = "file")]
    code: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Lexical, syntactic and semantic analysis
    Analyze {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Analysis through the unoptimized path, with performance metrics
    Unoptimized {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Run optimized and unoptimized analyses side by side
    Compare {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show the resolved analyzer configuration
    Config {
        /// Persist --url/--timeout to the config file
        #[arg(long)]
        save: bool,
    },
}

fn read_source(args: &SourceArgs) -> Result<String> {
    let code = if let Some(code) = &args.code {
        code.clone()
    } else if let Some(path) = &args.file {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
    } else {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read source from stdin")?;
        buffer
    };

    if code.trim().is_empty() {
        bail!("No source code provided. Use --code, --file or pipe it on stdin.");
    }
    Ok(code)
}

fn spinner(mode: OutputMode, kind: RequestKind) -> Option<ProgressBar> {
    if mode != OutputMode::Human {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .ok()?,
    );
    pb.set_message(match kind {
        RequestKind::Normal => "Analizando...",
        RequestKind::Unoptimized => "Analizando (no optimizado)...",
        RequestKind::Comparison => "Comparando rendimiento...",
    });
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

async fn run_analysis(
    config: &AnalyzerConfig,
    kind: RequestKind,
    source: &SourceArgs,
    writer: &OutputWriter,
) -> Result<()> {
    let code = read_source(source)?;
    let client = HttpAnalyzerClient::new(config)?;
    info!("Sending {} analysis to {}", kind.name(), client.base_url());

    let mut controller = SessionController::new(client);
    let progress = spinner(writer.mode(), kind);

    let state = match kind {
        RequestKind::Normal => controller.request_normal(&code).await,
        RequestKind::Unoptimized => controller.request_unoptimized(&code).await,
        RequestKind::Comparison => controller.request_comparison(&code).await,
    };

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    writer.render_session(&SessionReport::from_state(state))
}

fn show_config(config: &AnalyzerConfig, writer: &OutputWriter, save: bool) -> Result<()> {
    let path = AnalyzerConfig::config_file_path()?;
    if save {
        config.save_to(&path)?;
    }

    if writer.mode() == OutputMode::Json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    writer.section("Analyzer Configuration");
    writer.metric("URL", &config.base_url);
    writer.metric("Timeout", &format!("{}s", config.timeout_secs));
    writer.metric("Config file", &path.display().to_string());
    if save {
        writer.success("Configuration saved");
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::auto()
    };
    let writer = OutputWriter::new(mode);

    let config = AnalyzerConfig::resolve()?.with_overrides(cli.url, cli.timeout);

    match cli.command {
        Commands::Analyze { source } => {
            run_analysis(&config, RequestKind::Normal, &source, &writer).await
        }
        Commands::Unoptimized { source } => {
            run_analysis(&config, RequestKind::Unoptimized, &source, &writer).await
        }
        Commands::Compare { source } => {
            run_analysis(&config, RequestKind::Comparison, &source, &writer).await
        }
        Commands::Config { save } => show_config(&config, &writer, save),
    }
}
