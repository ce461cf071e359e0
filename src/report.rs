//! Audit logging and run-wide shared reporting state.
//!
//! Every confirmed original and duplicate produces one record on the shared
//! output stream. Two formats exist:
//!
//! - **Structured** (all modes except command): one line per candidate with
//!   a marker bit, the canonical path, size, device id, inode and digest.
//! - **Script** (command mode): the candidate's path substituted into the
//!   configured template plus a line suffix, yielding an executable script.
//!
//! [`ReportState`] is the single lock-owned object of the run: the stream
//! and the wasted-byte/duplicate accumulators live together behind one
//! `Mutex`, so acquiring it delimits the whole report-and-dispose critical
//! section for a cluster.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::config::{DisposalMode, Settings};
use crate::duplicates::Role;
use crate::scanner::Candidate;

/// The run-wide shared state: audit log plus accumulators, one mutex.
pub type SharedReport = Mutex<ReportState>;

/// Accumulators and the output stream, mutated only under the shared lock.
#[derive(Debug)]
pub struct ReportState {
    /// The audit log / generated script.
    pub log: AuditLog,
    /// Total bytes occupied by confirmed duplicates.
    pub wasted_bytes: u64,
    /// Number of confirmed duplicates (originals not counted).
    pub duplicates: u64,
}

impl ReportState {
    /// Wrap an audit log with zeroed accumulators.
    #[must_use]
    pub fn new(log: AuditLog) -> Self {
        Self {
            log,
            wasted_bytes: 0,
            duplicates: 0,
        }
    }
}

/// Which serialization the log stream uses.
#[derive(Debug, Clone)]
enum LogFormat {
    /// Marker bit, canonical path, size, device, inode, digest.
    Structured,
    /// Command templates substituted per reported path.
    Script {
        original: Option<String>,
        duplicate: String,
        suffix: String,
    },
}

/// Serializer for audit records on the shared output stream.
#[derive(Debug)]
pub struct AuditLog {
    stream: Option<BufWriter<File>>,
    /// An output path was configured, whether or not it could be opened.
    requested: bool,
    format: LogFormat,
}

impl AuditLog {
    /// Open the audit log described by the settings.
    ///
    /// A configured path that cannot be opened is reported and leaves the
    /// log disabled; nothing here is fatal. On success the file gets a
    /// shebang header, a banner naming the generator and working directory,
    /// owner rwx permissions, and (outside command mode) a column legend.
    #[must_use]
    pub fn open(settings: &Settings) -> Self {
        let format = match &settings.mode {
            DisposalMode::Command {
                original,
                duplicate,
            } => LogFormat::Script {
                original: original.clone(),
                duplicate: duplicate.clone(),
                suffix: settings.line_suffix.clone(),
            },
            _ => LogFormat::Structured,
        };

        let Some(path) = &settings.output else {
            return Self {
                stream: None,
                requested: false,
                format,
            };
        };

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                log::error!("Cannot open log {}: {}", path.display(), e);
                return Self {
                    stream: None,
                    requested: true,
                    format,
                };
            }
        };

        // The output doubles as a runnable script, so owner rwx.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = file.set_permissions(std::fs::Permissions::from_mode(0o700)) {
                log::warn!("Cannot make {} executable: {}", path.display(), e);
            }
        }

        let mut stream = BufWriter::new(file);
        if let Err(e) = write_header(&mut stream, &format) {
            log::warn!("Cannot write log header: {}", e);
        }

        Self {
            stream: Some(stream),
            requested: true,
            format,
        }
    }

    /// An always-disabled log, for runs without `--output`.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            stream: None,
            requested: false,
            format: LogFormat::Structured,
        }
    }

    /// Record one confirmed candidate.
    ///
    /// Writes nothing when no stream is configured; a requested-but-missing
    /// stream is reported and otherwise ignored.
    pub fn log_pair(&mut self, candidate: &Candidate, role: Role) {
        let Some(stream) = self.stream.as_mut() else {
            if self.requested {
                log::error!("Unable to write to log");
            }
            return;
        };

        let result = match &self.format {
            LogFormat::Structured => {
                let canonical = std::fs::canonicalize(&candidate.path).unwrap_or_else(|e| {
                    log::debug!("Cannot canonicalize {}: {}", candidate.path.display(), e);
                    candidate.path.clone()
                });
                writeln!(
                    stream,
                    "{}",
                    format_structured_line(candidate, role, &canonical)
                )
            }
            LogFormat::Script {
                original,
                duplicate,
                suffix,
            } => {
                let template = match role {
                    Role::Original => original.as_deref(),
                    Role::Duplicate => Some(duplicate.as_str()),
                };
                match template {
                    Some(t) => write!(
                        stream,
                        "{}{}",
                        substitute_template(t, &candidate.path),
                        suffix
                    ),
                    None => Ok(()),
                }
            }
        };

        if let Err(e) = result {
            log::warn!("Log write failed: {}", e);
        }
    }

    /// Flush buffered records to disk.
    pub fn flush(&mut self) {
        if let Some(stream) = self.stream.as_mut() {
            if let Err(e) = stream.flush() {
                log::warn!("Log flush failed: {}", e);
            }
        }
    }
}

/// One structured audit line, without the trailing newline.
///
/// `display_path` is the already-canonicalized (or fallen-back) path.
#[must_use]
pub fn format_structured_line(candidate: &Candidate, role: Role, display_path: &Path) -> String {
    format!(
        "{} \"{}\" {} 0x{:x} {} {}",
        role.marker(),
        display_path.display(),
        candidate.size,
        candidate.device_id,
        candidate.inode,
        candidate.digest_hex()
    )
}

/// Substitute the acted-upon path into a command template.
///
/// The first `%s` is replaced; a template without `%s` comes back unchanged.
#[must_use]
pub fn substitute_template(template: &str, path: &Path) -> String {
    template.replacen("%s", &path.display().to_string(), 1)
}

fn write_header(stream: &mut BufWriter<File>, format: &LogFormat) -> std::io::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_default();
    writeln!(stream, "#!/bin/sh")?;
    writeln!(stream, "# This file was autowritten by 'dupelint'")?;
    writeln!(stream, "# dupelint was executed from: {}", cwd.display())?;

    if matches!(format, LogFormat::Structured) {
        writeln!(stream, "#")?;
        writeln!(stream, "# Entries are listed like this:")?;
        writeln!(stream, "# dupf | path | size | devID | inode | digest")?;
        writeln!(stream, "# ---------------------------------------------")?;
        writeln!(
            stream,
            "# dupf  : '0' marks the cluster's original, '1' a duplicate"
        )?;
        writeln!(stream, "# path  : The full path to the found file")?;
        writeln!(stream, "# size  : Total size in byte as a decimal integer")?;
        writeln!(
            stream,
            "# devID : The ID of the device the file is stored on, in hex"
        )?;
        writeln!(stream, "# inode : The inode of the file (see man 2 stat)")?;
        writeln!(stream, "# digest: The full content digest of the file")?;
        writeln!(stream, "#")?;
    }
    Ok(())
}
