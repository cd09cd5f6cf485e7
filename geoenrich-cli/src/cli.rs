use clap::Parser;
use std::path::PathBuf;

/// Fill State and LGA columns from latitude/longitude via reverse geocoding
#[derive(Parser, Debug)]
#[command(name = "geoenrich")]
#[command(author = "4n6h4x0r")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Adds State and LGA to a CSV or spreadsheet of latitude/longitude pairs",
    long_about = None
)]
pub struct Args {
    /// CSV, TSV or spreadsheet (xlsx/xls/ods) with latitude and longitude columns
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the updated CSV
    #[arg(short = 'o', long = "output", default_value = "updated_geolocation.csv")]
    pub output: PathBuf,

    /// Google Maps API key (prompted for when omitted and stdin is a terminal)
    #[arg(short = 'k', long = "api-key", env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Reverse-geocoding endpoint
    #[arg(long = "endpoint", default_value = geoenrich_core::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Minimum delay between requests, in milliseconds
    #[arg(long = "delay-ms", default_value_t = 100)]
    pub delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long = "timeout-secs", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Number of concurrent requests
    #[arg(short = 'j', long = "workers", default_value_t = 1)]
    pub workers: usize,

    /// Rows to print after enrichment (0 disables the preview)
    #[arg(long = "preview", default_value_t = 10)]
    pub preview: usize,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Parses command-line arguments
pub fn parse_args() -> Args {
    Args::parse()
}
