use crate::error::{EnrichError, Severity};
use crate::geocoding::{self, Coordinate, Resolution, ReverseGeocoder};
use crate::rate_limit::RateLimiter;
use crate::table::{LocationTable, LATITUDE, LGA, LONGITUDE, STATE};
use crate::EnrichConfig;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Progress callback, called with (rows geocoded so far, rows to geocode)
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// A problem recorded against one row during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub severity: Severity,
    pub message: String,
}

/// Summary of an enrichment run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichReport {
    pub total_rows: usize,
    /// Rows that already had both State and LGA
    pub skipped: usize,
    /// Rows that got at least one of State/LGA
    pub resolved: usize,
    /// Rows that were attempted but got neither
    pub unresolved: usize,
    /// Per-row warnings and errors, in row order
    pub issues: Vec<RowIssue>,
}

impl EnrichReport {
    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Fill the `state` and `lga` columns of `table` in place.
///
/// Rows that already have both values are left alone and cost no request.
/// Every other row with a numeric coordinate gets exactly one request; both
/// returned values are written back, so a failed lookup leaves the row absent.
/// A row whose coordinate cells do not parse as numbers gets no request and
/// keeps whatever `state`/`lga` it already had. Requests start at least
/// `config.delay` apart. With `config.workers > 1` lookups run on a bounded
/// pool, but results are still written in row order.
///
/// Fails before touching the table if the key is blank or the coordinate
/// columns are missing.
pub fn enrich(
    table: &mut LocationTable,
    geocoder: &dyn ReverseGeocoder,
    api_key: &str,
    config: &EnrichConfig,
    progress: Option<&ProgressCallback>,
) -> Result<EnrichReport, EnrichError> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(EnrichError::MissingCredential);
    }

    let missing: Vec<&'static str> = [LATITUDE, LONGITUDE]
        .into_iter()
        .filter(|column| !table.has_column(column))
        .collect();
    if !missing.is_empty() {
        return Err(EnrichError::MissingColumns(missing));
    }

    let state_col = table.ensure_column(STATE);
    let lga_col = table.ensure_column(LGA);

    let mut report = EnrichReport {
        total_rows: table.row_count(),
        ..Default::default()
    };

    // Collect the rows that need a lookup
    let mut pending: Vec<(usize, Coordinate)> = Vec::new();
    for row in 0..table.row_count() {
        if table.is_resolved(row) {
            report.skipped += 1;
            continue;
        }

        match table.coordinate(row) {
            Ok(coordinate) => pending.push((row, coordinate)),
            Err(reason) => {
                log::error!("Row {}: invalid coordinate, {}", row + 1, reason);
                report.unresolved += 1;
                report.issues.push(RowIssue {
                    row: row + 1,
                    severity: Severity::Error,
                    message: format!("Invalid coordinate: {}", reason),
                });
            }
        }
    }

    log::info!(
        "{} of {} rows need geocoding ({} already have State and LGA)",
        pending.len(),
        report.total_rows,
        report.skipped
    );

    let resolutions = resolve_all(&pending, geocoder, api_key, config, progress)?;

    for (row, resolution) in resolutions {
        let Resolution { result, notice } = resolution;

        if result.is_empty() {
            report.unresolved += 1;
        } else {
            report.resolved += 1;
        }

        table.set(row, state_col, result.state);
        table.set(row, lga_col, result.lga);

        if let Some(notice) = notice {
            report.issues.push(RowIssue {
                row: row + 1,
                severity: notice.severity,
                message: notice.message,
            });
        }
    }

    report.issues.sort_by_key(|issue| issue.row);

    log::info!(
        "Geocoding complete: {} resolved, {} unresolved, {} skipped",
        report.resolved,
        report.unresolved,
        report.skipped
    );

    Ok(report)
}

/// Run one paced lookup per pending row, returning results in input order
fn resolve_all(
    pending: &[(usize, Coordinate)],
    geocoder: &dyn ReverseGeocoder,
    api_key: &str,
    config: &EnrichConfig,
    progress: Option<&ProgressCallback>,
) -> Result<Vec<(usize, Resolution)>, EnrichError> {
    let total = pending.len();
    let limiter = RateLimiter::new(config.delay);
    let done = AtomicUsize::new(0);
    log::debug!("Pacing requests {:?} apart", limiter.interval());

    let resolve_one = |&(row, coordinate): &(usize, Coordinate)| {
        limiter.acquire();
        let resolution = geocoding::resolve(geocoder, coordinate, api_key);

        let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(report_progress) = progress {
            report_progress(finished, total);
        }

        (row, resolution)
    };

    let workers = config.workers.clamp(1, total.max(1));
    if workers == 1 {
        return Ok(pending.iter().map(resolve_one).collect());
    }

    log::debug!("Geocoding with {} workers", workers);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("geoenrich-worker-{}", i))
        .build()?;

    // Indexed parallel collect keeps input order
    Ok(pool.install(|| pending.par_iter().map(resolve_one).collect()))
}
