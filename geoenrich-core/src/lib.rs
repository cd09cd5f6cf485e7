use anyhow::Result;
use std::path::Path;
use std::time::Duration;

// Internal modules (private)
mod enrich;
mod error;
mod geocoding;
mod loader;
mod rate_limit;
mod table;

// Re-export public types
pub use enrich::{enrich, EnrichReport, ProgressCallback, RowIssue};
pub use error::{EnrichError, GeocodeError, Severity};
pub use geocoding::{
    parse_response, resolve, Coordinate, GeocodeResult, GoogleGeocoder, Notice, Resolution,
    ReverseGeocoder, DEFAULT_ENDPOINT,
};
pub use loader::{load_table, read_delimited, save_csv, write_csv, InputFormat};
pub use rate_limit::RateLimiter;
pub use table::{normalize_column_name, LocationTable, LATITUDE, LGA, LONGITUDE, STATE};

/// Configuration options for the enrichment engine
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Reverse-geocoding endpoint (Google Geocoding API JSON shape)
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Minimum spacing between the starts of consecutive requests
    pub delay: Duration,
    /// Number of concurrent requests (1 = strictly sequential)
    pub workers: usize,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(10),
            delay: Duration::from_millis(100),
            workers: 1,
        }
    }
}

/// Main engine: owns the configuration and the geocoder used for every row
pub struct EnrichEngine {
    config: EnrichConfig,
    geocoder: Box<dyn ReverseGeocoder>,
}

impl EnrichEngine {
    /// Create an engine that talks to `config.endpoint`
    pub fn new(config: EnrichConfig) -> Result<Self> {
        let geocoder = GoogleGeocoder::new(config.endpoint.clone(), config.timeout)?;
        Ok(Self::with_geocoder(config, Box::new(geocoder)))
    }

    /// Create an engine around any geocoder
    pub fn with_geocoder(config: EnrichConfig, geocoder: Box<dyn ReverseGeocoder>) -> Self {
        Self { config, geocoder }
    }

    /// Fill State and LGA in `table` in place
    pub fn enrich_table(
        &self,
        table: &mut LocationTable,
        api_key: &str,
        progress: Option<&ProgressCallback>,
    ) -> Result<EnrichReport, EnrichError> {
        enrich(table, self.geocoder.as_ref(), api_key, &self.config, progress)
    }

    /// Load `input`, enrich it, and write the result to `output` as CSV
    pub fn process_file(
        &self,
        input: &Path,
        output: &Path,
        api_key: &str,
        progress: Option<&ProgressCallback>,
    ) -> Result<(LocationTable, EnrichReport)> {
        // Check the credential before doing any I/O
        if api_key.trim().is_empty() {
            return Err(EnrichError::MissingCredential.into());
        }

        let mut table = load_table(input)?;
        let report = self.enrich_table(&mut table, api_key, progress)?;
        save_csv(&table, output)?;

        Ok((table, report))
    }
}
