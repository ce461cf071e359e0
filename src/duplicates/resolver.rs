//! Per-group duplicate confirmation, reporting and disposal.
//!
//! # Overview
//!
//! [`Resolver::resolve`] consumes one [`CandidateGroup`]: it confirms
//! duplicate clusters with the oracle, reports and disposes of each cluster
//! inside a single critical section on the shared [`ReportState`] lock, and
//! finally removes the candidates that matched nothing.
//!
//! # Locking
//!
//! The lock is taken before a pending candidate's inner scan and held until
//! the whole cluster is confirmed, logged and disposed of — not per log
//! write. That keeps one cluster's original and duplicates contiguous in
//! the log and on the console even when many groups resolve in parallel,
//! and it keeps the wasted-byte accumulator race-free. It also means an
//! interactive prompt blocks every other worker's disposal for as long as
//! the operator thinks; that serialization is an accepted property of the
//! design, not an accident.

use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use yansi::Paint;

use crate::actions;
use crate::config::Settings;
use crate::duplicates::groups::CandidateGroup;
use crate::duplicates::{oracle, Role};
use crate::report::ReportState;

/// The operator ended the run from the interactive prompt.
///
/// Surfaced through the resolver's return value so the caller decides what
/// to do with the remaining groups, instead of the core exiting the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("run cancelled by operator")]
pub struct Cancelled;

/// Resolves groups against the run-wide shared report.
pub struct Resolver<'a> {
    settings: &'a Settings,
    shared: &'a Mutex<ReportState>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over the shared report state.
    #[must_use]
    pub fn new(settings: &'a Settings, shared: &'a Mutex<ReportState>) -> Self {
        Self { settings, shared }
    }

    /// Confirm, report and dispose of this group's duplicate clusters.
    ///
    /// Walks candidates in chain order. Each still-pending candidate `i`
    /// opens a cluster scan over the candidates after it; every pending `j`
    /// whose digest and fingerprints match (size re-checked defensively,
    /// bytes re-read when paranoid) is confirmed: both flags clear, the
    /// wasted-byte total grows by `j`'s size, the first match emits `i`'s
    /// original record and action, and every match emits `j`'s duplicate
    /// record and action. A candidate that matched nothing is removed from
    /// the group. The group is compacted before returning.
    ///
    /// Returns the number of removed (matched-nothing) candidates.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the operator quit from the interactive
    /// prompt; the group is left un-compacted and the caller should stop
    /// resolving further groups.
    pub fn resolve(&self, group: &mut CandidateGroup) -> Result<usize, Cancelled> {
        let slots = group.slots();
        let mut removed_count = 0;
        let console = self.settings.mode.reports_to_console();

        for i in 0..slots {
            if !group.is_live(i) || !group.candidate(i).pending {
                continue;
            }

            // One cluster's confirm+log+dispose must not interleave with
            // another group's, so the lock spans the whole inner scan.
            {
                let mut report = self
                    .shared
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                let mut printed_original = false;

                for j in (i + 1)..slots {
                    if !group.is_live(j) || !group.candidate(j).pending {
                        continue;
                    }

                    let matched = {
                        let a = group.candidate(i);
                        let b = group.candidate(j);
                        oracle::digest_equal(a, b)
                            && a.size == b.size
                            && (!self.settings.paranoid
                                || oracle::byte_exact_equal(&a.path, &b.path))
                    };
                    if !matched {
                        continue;
                    }

                    group.clear_pending(i);
                    group.clear_pending(j);

                    report.wasted_bytes += group.candidate(j).size;
                    report.duplicates += 1;
                    let ordinal = report.duplicates;

                    if !printed_original {
                        if console {
                            println!("{} {}", "#".green(), group.candidate(i).path.display());
                        }
                        report.log.log_pair(group.candidate(i), Role::Original);
                        let outcome = actions::dispose_original(
                            &self.settings.mode,
                            &group.candidate(i).path,
                        );
                        if outcome.is_cancel() {
                            return Err(Cancelled);
                        }
                        printed_original = true;
                    }

                    if console {
                        // Blue X for byte-verified matches, red star otherwise.
                        if self.settings.paranoid {
                            println!("{} {}", "X".blue(), group.candidate(j).path.display());
                        } else {
                            println!("{} {}", "*".red(), group.candidate(j).path.display());
                        }
                    }
                    report.log.log_pair(group.candidate(j), Role::Duplicate);
                    let outcome = actions::dispose_duplicate(
                        &self.settings.mode,
                        &group.candidate(j).path,
                        &group.candidate(i).path,
                        ordinal,
                    );
                    if outcome.is_cancel() {
                        return Err(Cancelled);
                    }
                }

                if printed_original && console {
                    println!();
                }
            }

            // Shared a size bucket but matched nothing: not a duplicate.
            if group.candidate(i).pending {
                group.mark_removed(i);
                removed_count += 1;
            }
        }

        group.compact();
        Ok(removed_count)
    }
}
