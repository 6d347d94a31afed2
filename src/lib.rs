//! linkdupe - Replace duplicate files with hard links
//!
//! Collects candidate files, sorts them by size, compares equal-size files
//! block by block and replaces every duplicate with a hard link to the first
//! copy found. Files on different devices are never linked.

pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::dedup::{DedupConfig, DedupEngine, DedupReport, EntrySet};
use crate::error::ExitCode;
use crate::output::{JsonOutput, RunReport, TextOutput};
use crate::progress::{Progress, ProgressCallback, PHASE_COLLECT};
use crate::scanner::{Collector, CollectorConfig, Entry, ScanError};
use crate::signal::ShutdownHandler;

/// Run linkdupe with parsed arguments.
///
/// # Errors
///
/// Returns an error only for setup failures (bad configuration, signal
/// handler, writing the report). Per-file problems are recorded in the
/// report and reflected in the returned [`ExitCode`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(&cli)?;
    logging::init_logging(cli.verbose, config.quiet);
    log::debug!("Configuration: {:?}", config);

    let handler = signal::install_handler().context("cannot install Ctrl+C handler")?;

    let hide_progress = config.quiet
        || cli.no_progress
        || cli.output == OutputFormat::Json
        || !io::stderr().is_terminal();
    let progress = Arc::new(Progress::new(hide_progress));

    let collector_config = CollectorConfig::default()
        .with_min_size(config.min_size)
        .with_follow_symlinks(config.follow_symlinks)
        .with_skip_hidden(config.skip_hidden);
    let collector = Collector::new(cli.patterns.clone(), collector_config);
    let (entries, scan_errors) = collect_entries(&collector, progress.as_ref(), &handler);

    let dedup = if handler.is_shutdown_requested() {
        log::info!("Shutdown requested during collection");
        DedupReport {
            interrupted: true,
            dry_run: config.dry_run,
            ..DedupReport::default()
        }
    } else {
        if entries.is_empty() {
            log::warn!("no files");
        }
        let mut entries = EntrySet::from(entries);
        let dedup_config = DedupConfig::default()
            .with_block_size(config.block_size)
            .with_dry_run(config.dry_run)
            .with_shutdown_flag(handler.get_flag())
            .with_progress_callback(progress.clone());
        DedupEngine::new(dedup_config).run(&mut entries)
    };

    let report = RunReport::new(scan_errors, dedup);
    let stats = &report.dedup.stats;
    log::info!(
        "{} files, {} comparisons, {} identical, {} linked, {} cross-device, {} errors",
        stats.entries,
        stats.comparisons,
        stats.identical,
        stats.linked,
        stats.skipped_cross_device,
        report.error_count()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => {
            let color = !cli.no_color && stdout.is_terminal();
            TextOutput::new(&report)
                .with_pairs(config.report_pairs())
                .with_summary(!config.quiet && report.dedup.stats.entries > 0)
                .with_color(color)
                .write_to(&mut out)
                .context("cannot write report")?;
        }
        OutputFormat::Json => {
            JsonOutput::new(&report)
                .write_to(&mut out)
                .context("cannot write report")?;
        }
    }

    Ok(report.exit_code())
}

/// Drain the collector, splitting entries from errors.
///
/// Stops early if a shutdown is requested.
fn collect_entries(
    collector: &Collector,
    progress: &dyn ProgressCallback,
    handler: &ShutdownHandler,
) -> (Vec<Entry>, Vec<ScanError>) {
    let mut entries = Vec::new();
    let mut errors = Vec::new();

    progress.on_phase_start(PHASE_COLLECT, 0);
    for item in collector.collect() {
        if handler.is_shutdown_requested() {
            break;
        }
        match item {
            Ok(entry) => {
                entries.push(entry);
                if let Some(entry) = entries.last() {
                    progress.on_progress(entries.len(), &entry.path.to_string_lossy());
                }
            }
            Err(e) => errors.push(e),
        }
    }
    progress.on_phase_end(PHASE_COLLECT);

    log::debug!(
        "Collected {} files ({} collection errors)",
        entries.len(),
        errors.len()
    );
    (entries, errors)
}
