//! Insight CLI - talk to the data insight service from a terminal
//!
//! Usage:
//!   insight status
//!   insight upload sales.csv costs.xlsx
//!   insight query "What are the key trends?" --analysis-type trend
//!   insight insights <FILE_ID>
//!
//! Query and insight results are printed as the same HTML fragments the
//! web console shows.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use insight::app::SAMPLE_QUERIES;
use insight::monitor::ServiceState;
use insight::pipeline::UploadEvent;
use insight::{AnalysisType, ClientConfig, InsightApp, UploadSource};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "insight", version, about = "Upload data, ask questions, get AI insights")]
struct Cli {
    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend API base URL (overrides the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check backend health and document count
    Status,
    /// Upload files one after another
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Ask a question about the uploaded data
    Query {
        text: String,
        /// general, statistical, trend, comparative
        #[arg(short = 't', long, default_value = "general")]
        analysis_type: String,
    },
    /// Generate insights for an uploaded file
    Insights { file_id: String },
    /// List the sample questions
    Samples,
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    Ok(config)
}

fn print_upload_event(event: &UploadEvent) {
    match event {
        UploadEvent::Started { total } => {
            eprintln!("{} {} file(s)", "Uploading".bold(), total);
        }
        UploadEvent::Uploaded { name, record } => {
            eprintln!(
                "  {} {} uploaded successfully {}",
                "✓".green(),
                name,
                format!("(id {})", record.id).dimmed()
            );
        }
        UploadEvent::Failed { name, message } => {
            eprintln!("  {} Failed to upload {}: {}", "✗".red(), name, message);
        }
        UploadEvent::Progress(progress) => {
            eprintln!(
                "  {}",
                format!("[{}/{}] {}%", progress.completed, progress.total, progress.percent()).dimmed()
            );
        }
        UploadEvent::Finished { succeeded, failed } => {
            let summary = format!("{} succeeded, {} failed", succeeded, failed);
            if *failed == 0 {
                eprintln!("{}", summary.green());
            } else {
                eprintln!("{}", summary.yellow());
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    if let Command::Samples = cli.command {
        for sample in SAMPLE_QUERIES {
            println!("{sample}");
        }
        return Ok(());
    }

    let app = InsightApp::from_config(&config).context("Failed to create backend client")?;

    match cli.command {
        Command::Status => {
            app.monitor().poll_once().await;
            let status = app.monitor().status().await;
            let connection = match status.connected {
                Some(true) => "Connected".green(),
                _ => "Disconnected".red(),
            };
            let service = match status.service {
                ServiceState::Online => "Online".green(),
                ServiceState::Offline => "Offline".red(),
                ServiceState::Unknown => "Unknown".dimmed(),
            };
            println!("{} {}", "Backend:".bold(), config.api_base_url);
            println!("{} {}", "Connection:".bold(), connection);
            println!("{} {}", "System:".bold(), service);
            println!("{} {}", "Documents processed:".bold(), status.documents_processed);
        }
        Command::Upload { files } => {
            let mut sources = Vec::with_capacity(files.len());
            for path in &files {
                let source = UploadSource::from_path(path)
                    .await
                    .with_context(|| format!("Failed to read file: {}", path.display()))?;
                sources.push(source);
            }
            app.upload_with(sources, print_upload_event).await;
        }
        Command::Query { text, analysis_type } => {
            app.set_analysis_type(AnalysisType::new(analysis_type)).await;
            match app.submit_query(&text).await {
                Some(panel) => println!("{panel}"),
                None => anyhow::bail!("Query text is empty"),
            }
        }
        Command::Insights { file_id } => match app.generate_insights(&file_id).await {
            Some(panel) => println!("{panel}"),
            None => anyhow::bail!("No file id given"),
        },
        Command::Samples => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
