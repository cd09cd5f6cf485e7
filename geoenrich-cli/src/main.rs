use anyhow::Result;
use geoenrich_core::{EnrichConfig, EnrichEngine, ProgressCallback, Severity};
use std::io::IsTerminal;
use std::time::Duration;

mod cli;

fn main() -> Result<()> {
    let args = cli::parse_args();

    // Initialize logger with appropriate level based on verbose flag
    if std::env::var("RUST_LOG").is_err() {
        if args.verbose {
            std::env::set_var("RUST_LOG", "debug");
        } else {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    // No key, no requests: stop before touching the input
    let api_key = read_api_key(args.api_key.as_deref())?;
    if api_key.trim().is_empty() {
        eprintln!("ERROR: API key for Google Maps is not set.");
        eprintln!("Pass --api-key, set GOOGLE_MAPS_API_KEY, or run interactively to be prompted.");
        std::process::exit(1);
    }

    // Create enrichment engine with configuration from CLI args
    let config = EnrichConfig {
        endpoint: args.endpoint.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
        delay: Duration::from_millis(args.delay_ms),
        workers: args.workers.max(1),
    };
    log::debug!(
        "Using {} with {} worker(s), {:?} between requests",
        config.endpoint,
        config.workers,
        config.delay
    );

    let engine = EnrichEngine::new(config)?;

    let progress: ProgressCallback = Box::new(|done, total| {
        if done == total || done % 25 == 0 {
            log::info!("Geocoded {}/{} rows", done, total);
        }
    });

    log::info!("Processing {}", args.input.display());
    let (table, report) =
        engine.process_file(&args.input, &args.output, &api_key, Some(&progress))?;

    if args.preview > 0 {
        println!("\nUpdated table:");
        println!("{}", table.preview(args.preview));
    }

    // Report results
    if !report.issues.is_empty() {
        eprintln!(
            "\n{} warning(s), {} error(s) while geocoding:",
            report.warnings(),
            report.errors()
        );
        for issue in &report.issues {
            let marker = match issue.severity {
                Severity::Warning => "⚠️ ",
                Severity::Error => "✗",
            };
            eprintln!("  {} row {}: {}", marker, issue.row, issue.message);
        }
    }

    println!(
        "✅ {} rows: {} resolved, {} unresolved, {} already filled. Saved to {}",
        report.total_rows,
        report.resolved,
        report.unresolved,
        report.skipped,
        args.output.display()
    );

    Ok(())
}

/// Take the key from the flag/env, or prompt for it (hidden) on a terminal.
/// The key is only held in memory.
fn read_api_key(provided: Option<&str>) -> Result<String> {
    if let Some(key) = provided {
        return Ok(key.to_string());
    }

    if !std::io::stdin().is_terminal() {
        return Ok(String::new());
    }

    let key = dialoguer::Password::new()
        .with_prompt("Enter your Google Maps API key")
        .allow_empty_password(true)
        .interact()?;

    Ok(key)
}
