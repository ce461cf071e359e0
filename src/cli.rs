//! Command-line interface definitions for dupelint.
//!
//! This module defines all CLI arguments using the clap derive API. The CLI
//! follows standard conventions with global options (verbosity, color) and a
//! single scan-and-dispose operation.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates, write the audit log to dupes.log
//! dupelint ~/Downloads -o dupes.log
//!
//! # Ask before touching anything
//! dupelint ~/Downloads --mode interactive
//!
//! # Replace duplicates with hardlinks, verify byte-for-byte first
//! dupelint ~/Downloads --mode hardlink --paranoid
//!
//! # Generate an executable script instead of acting directly
//! dupelint ~/Downloads --mode command --cmd-dup 'rm -f "%s"' -o remove_dupes.sh
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Duplicate file confirmation and disposal.
///
/// dupelint buckets files by size, confirms true duplicates via content
/// digests (with optional byte-by-byte verification), and disposes of each
/// confirmed duplicate according to the selected mode, recording every
/// decision in an audit log.
#[derive(Debug, Parser)]
#[command(name = "dupelint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to scan for duplicates
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// What to do with confirmed duplicates
    #[arg(short, long, value_enum, default_value = "report")]
    pub mode: ModeArg,

    /// Template for the command run on each duplicate (command mode).
    ///
    /// The first `%s` is replaced with the duplicate's path.
    #[arg(long, value_name = "TEMPLATE")]
    pub cmd_dup: Option<String>,

    /// Template for the command run on each cluster's original (command mode).
    ///
    /// The first `%s` is replaced with the original's path.
    #[arg(long, value_name = "TEMPLATE")]
    pub cmd_orig: Option<String>,

    /// Terminator appended after each generated command line (command mode)
    #[arg(long, value_name = "SUFFIX", default_value = "\n")]
    pub line_suffix: String,

    /// Verify hash matches byte-by-byte before trusting them
    #[arg(short, long)]
    pub paranoid: bool,

    /// Write the audit log (or generated script) to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of I/O threads used for hashing
    #[arg(short = 'j', long, value_name = "N", default_value_t = 4)]
    pub threads: usize,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

/// Disposal mode selector, as seen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Print and log duplicates, touch nothing
    Report,
    /// Ask what to do for every duplicate
    Interactive,
    /// Delete every confirmed duplicate
    Delete,
    /// Replace every confirmed duplicate with a hardlink to its original
    Hardlink,
    /// Run a configured command on every confirmed duplicate
    Command,
}
