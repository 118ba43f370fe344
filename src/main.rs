//! pdf-spread-mcp: MCP server for PDF spread rendering and WCAG contrast audits
//!
//! This tool renders PDF double-page spreads and audits text contrast for
//! AI assistants over the Model Context Protocol.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use pdf_spread_mcp::config;
use pdf_spread_mcp::mcp::server::McpServer;
use pdf_spread_mcp::pdf::PdfiumBackend;

/// MCP server for PDF spread rendering and WCAG contrast audits.
///
/// Renders two PDF pages as one side-by-side image and measures text contrast
/// against WCAG thresholds.
#[derive(Parser, Debug)]
#[command(name = "pdf-spread-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Picks the log level: `-q` wins, then `-v` counts, then the config file.
///
/// Unrecognised configured levels fall back to warn.
fn log_level(verbose: u8, quiet: bool, configured: &str) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => configured.parse().unwrap_or(Level::WARN),
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries protocol messages only.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the pdf-spread-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    init_tracing(log_level(args.verbose, args.quiet, &cfg.logging.level));

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting pdf-spread-mcp server"
    );

    let backend = match PdfiumBackend::bind(cfg.pdfium.library_path.as_deref()) {
        Ok(backend) => backend,
        Err(e) => {
            error!(error = %e, "Failed to load PDFium");
            eprintln!("Could not load the PDFium library: {e}");
            eprintln!("Install PDFium or set pdfium.library_path in the configuration file.");
            return ExitCode::FAILURE;
        }
    };

    info!(
        border_width = cfg.defaults.border_width,
        quality = cfg.defaults.quality,
        "Tool defaults configured"
    );

    let server = McpServer::new(Box::new(backend), cfg.defaults);

    info!("MCP server ready, waiting for client connection...");

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(server.run()) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
