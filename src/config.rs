//! Run configuration assembled from the CLI.
//!
//! The [`Settings`] record is read-only input to the resolver, dispatcher and
//! logger. Each disposal policy is a variant of [`DisposalMode`] carrying only
//! the data it needs, so an invalid or half-configured mode is unrepresentable
//! past this point.

use std::path::PathBuf;

use thiserror::Error;

use crate::cli::{Cli, ModeArg};

/// Errors produced while validating the CLI into [`Settings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Command mode was selected without a duplicate-role template.
    #[error("command mode requires --cmd-dup")]
    MissingCommandTemplate,

    /// The I/O thread count must be at least 1.
    #[error("--threads must be at least 1")]
    ZeroThreads,
}

/// What to do with each confirmed duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisposalMode {
    /// Print and log only; no filesystem action.
    Report,
    /// Prompt the operator for every duplicate.
    Interactive,
    /// Remove each duplicate's file.
    Delete,
    /// Remove each duplicate's file and hardlink it back to its original.
    Hardlink,
    /// Run a command on each reported path, substituted into a template.
    Command {
        /// Template applied to each cluster's original, if configured.
        original: Option<String>,
        /// Template applied to each duplicate.
        duplicate: String,
    },
}

impl DisposalMode {
    /// Whether this mode emits script output instead of structured log lines.
    #[must_use]
    pub fn is_command(&self) -> bool {
        matches!(self, Self::Command { .. })
    }

    /// Whether this mode prints report lines to the console.
    #[must_use]
    pub fn reports_to_console(&self) -> bool {
        matches!(self, Self::Report | Self::Interactive)
    }
}

/// Read-only configuration for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Disposal policy for confirmed duplicates.
    pub mode: DisposalMode,
    /// Verify hash matches byte-by-byte before trusting them.
    pub paranoid: bool,
    /// Audit log / generated script destination, if any.
    pub output: Option<PathBuf>,
    /// Terminator written after each generated command line.
    pub line_suffix: String,
    /// Number of I/O threads used for hashing.
    pub io_threads: usize,
}

impl Settings {
    /// Validate CLI arguments into a settings record.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if command mode is missing its duplicate
    /// template or the thread count is zero.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        if cli.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }

        let mode = match cli.mode {
            ModeArg::Report => DisposalMode::Report,
            ModeArg::Interactive => DisposalMode::Interactive,
            ModeArg::Delete => DisposalMode::Delete,
            ModeArg::Hardlink => DisposalMode::Hardlink,
            ModeArg::Command => DisposalMode::Command {
                original: cli.cmd_orig.clone(),
                duplicate: cli
                    .cmd_dup
                    .clone()
                    .ok_or(ConfigError::MissingCommandTemplate)?,
            },
        };

        if !mode.is_command() && (cli.cmd_dup.is_some() || cli.cmd_orig.is_some()) {
            log::warn!("--cmd-dup/--cmd-orig are ignored outside command mode");
        }

        Ok(Self {
            mode,
            paranoid: cli.paranoid,
            output: cli.output.clone(),
            line_suffix: cli.line_suffix.clone(),
            io_threads: cli.threads,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_report_mode_default() {
        let settings = Settings::from_cli(&parse(&["dupelint", "/tmp"])).unwrap();
        assert_eq!(settings.mode, DisposalMode::Report);
        assert!(!settings.paranoid);
        assert!(settings.output.is_none());
    }

    #[test]
    fn test_command_mode_requires_template() {
        let err = Settings::from_cli(&parse(&["dupelint", "/tmp", "--mode", "command"]));
        assert!(matches!(err, Err(ConfigError::MissingCommandTemplate)));
    }

    #[test]
    fn test_command_mode_carries_templates() {
        let settings = Settings::from_cli(&parse(&[
            "dupelint",
            "/tmp",
            "--mode",
            "command",
            "--cmd-dup",
            "rm \"%s\"",
            "--cmd-orig",
            "echo keep \"%s\"",
        ]))
        .unwrap();
        match settings.mode {
            DisposalMode::Command {
                original,
                duplicate,
            } => {
                assert_eq!(original.as_deref(), Some("echo keep \"%s\""));
                assert_eq!(duplicate, "rm \"%s\"");
            }
            other => panic!("unexpected mode: {:?}", other),
        }
    }

    #[test]
    fn test_zero_threads_rejected() {
        let err = Settings::from_cli(&parse(&["dupelint", "/tmp", "-j", "0"]));
        assert!(matches!(err, Err(ConfigError::ZeroThreads)));
    }

    #[test]
    fn test_console_reporting_modes() {
        assert!(DisposalMode::Report.reports_to_console());
        assert!(DisposalMode::Interactive.reports_to_console());
        assert!(!DisposalMode::Delete.reports_to_console());
        assert!(!DisposalMode::Hardlink.reports_to_console());
    }
}
