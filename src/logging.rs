//! Logging infrastructure for dupelint.
//!
//! This module provides structured logging using the `log` facade and `env_logger` backend.
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! # Build-specific Formatting
//!
//! - **Debug builds**: Include timestamp, level, and module path for detailed debugging
//! - **Release builds**: Compact format with level and message only for cleaner output

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// This function should be called once at the start of the application,
/// before any logging calls are made.
///
/// # Priority
///
/// 1. If `RUST_LOG` environment variable is set, it takes precedence
/// 2. If `quiet` is true: Error level only
/// 3. If `verbose >= 2`: Trace level
/// 4. If `verbose == 1`: Debug level
/// 5. Default: Info level
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
///
/// # Panics
///
/// This function will panic if called more than once, as `env_logger`
/// can only be initialized once per process.
pub fn init_logging(verbose: u8, quiet: bool) {
    // If RUST_LOG is set, use env_logger's default behavior
    let use_env = env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();

    if use_env {
        builder.parse_default_env();
    } else {
        let level = determine_level(verbose, quiet);
        builder.filter_level(level);
    }

    configure_format(&mut builder, verbose);
    builder.init();

    if !use_env {
        let level = determine_level(verbose, quiet);
        log::debug!("Logging initialized at level: {:?}", level);
    }
}

/// Determine the log level from CLI flags.
///
/// # Arguments
///
/// * `verbose` - Verbosity count (0=info, 1=debug, 2+=trace)
/// * `quiet` - If true, use error level
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Configure the log format based on build type and verbosity.
///
/// - Debug builds: timestamp, level, module path (for detailed debugging)
/// - Release builds: compact format (level + message only)
fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);

            if verbose >= 1 {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} [{}] {}",
                    timestamp,
                    level,
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} {}",
                    timestamp,
                    level,
                    record.args()
                )
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose; // Suppress unused variable warning in release
        builder.format(|buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        });
    }
}
