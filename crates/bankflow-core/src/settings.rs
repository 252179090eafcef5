use std::path::PathBuf;

use clap::Parser;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Batch processing of financial-statement extracts
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bankflow",
    about = "Batch processing of financial-statement extracts",
    version
)]
pub struct Settings {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config/config.toml")]
    pub config: PathBuf,

    /// Override the configured input directory
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Override the configured worker-pool size
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging (overrides --log-level)
    #[arg(long)]
    pub debug: bool,
}

// ── Tests ──────────────────────────────────────────────────────────────────────
