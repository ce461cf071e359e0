//! dupelint - duplicate file confirmation and disposal.
//!
//! Files are bucketed by size, confirmed as true duplicates via content
//! digests and partial fingerprints (optionally byte-by-byte), and each
//! confirmed duplicate is disposed of per the selected policy while an
//! audit log records every decision.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod report;
pub mod scanner;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use bytesize::ByteSize;
use rayon::prelude::*;

use crate::cli::Cli;
use crate::config::Settings;
use crate::duplicates::{Cancelled, Resolver};
use crate::error::ExitCode;
use crate::report::{AuditLog, ReportState, SharedReport};

/// Run the full scan-confirm-dispose pipeline.
///
/// # Errors
///
/// Returns an error for invalid configuration; everything past that point
/// degrades to warnings or is reflected in the exit code.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    if cli.no_color {
        yansi::disable();
    }

    let settings = Settings::from_cli(&cli)?;

    let files = scanner::walker::collect_files(&cli.paths);
    let buckets = duplicates::bucket_by_size(files);
    let mut groups = scanner::hasher::attach_signatures(buckets, settings.io_threads);

    if groups.is_empty() {
        log::info!(
            "[{}] No duplicate candidates found",
            ExitCode::NoDuplicates.code_prefix()
        );
        return Ok(ExitCode::NoDuplicates);
    }

    let shared: SharedReport = Mutex::new(ReportState::new(AuditLog::open(&settings)));
    let resolver = Resolver::new(&settings, &shared);
    let removed_total = AtomicUsize::new(0);

    // Groups are disjoint by construction, so they resolve in parallel;
    // the shared report lock inside resolve() keeps clusters contiguous.
    // try_for_each stops handing out groups once a resolver reports the
    // operator's quit.
    let outcome: Result<(), Cancelled> = groups.par_iter_mut().try_for_each(|group| {
        let removed = resolver.resolve(group)?;
        removed_total.fetch_add(removed, Ordering::Relaxed);
        Ok(())
    });

    let mut report = shared.lock().unwrap_or_else(PoisonError::into_inner);
    report.log.flush();
    let duplicates = report.duplicates;
    let wasted = report.wasted_bytes;
    drop(report);

    if outcome.is_err() {
        log::info!(
            "[{}] Run ended by operator",
            ExitCode::Interrupted.code_prefix()
        );
        return Ok(ExitCode::Interrupted);
    }

    log::info!(
        "Confirmed {} duplicate(s) wasting {}; {} candidate(s) were unique within their bucket",
        duplicates,
        ByteSize::b(wasted),
        removed_total.load(Ordering::Relaxed)
    );

    if duplicates == 0 {
        log::info!(
            "[{}] No duplicates confirmed",
            ExitCode::NoDuplicates.code_prefix()
        );
        Ok(ExitCode::NoDuplicates)
    } else {
        log::debug!("[{}] Done", ExitCode::Success.code_prefix());
        Ok(ExitCode::Success)
    }
}
