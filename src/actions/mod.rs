//! Disposal dispatcher: act on one confirmed candidate.
//!
//! Invoked once per confirmed candidate with its role. The five policies:
//!
//! | Mode        | Duplicate action                              | Original action |
//! |-------------|-----------------------------------------------|-----------------|
//! | report      | none                                          | none            |
//! | interactive | prompt: keep / delete / link / quit / help    | none            |
//! | delete      | remove the file                               | none            |
//! | hardlink    | remove, then hardlink the original over it    | none            |
//! | command     | run the duplicate-role template               | run the original-role template |
//!
//! Every filesystem or subprocess failure is reported as a warning and the
//! run continues; the one exception is the interactive `quit` answer, which
//! is surfaced as [`DisposalOutcome::Cancel`] so the caller can end the
//! whole run. A command-mode subprocess killed by SIGINT/SIGQUIT stops only
//! that item, not the run — that asymmetry with interactive quit is part of
//! the contract.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::{Command, ExitStatus};

use yansi::Paint;

use crate::config::DisposalMode;
use crate::report::substitute_template;

/// What the caller should do after one disposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposalOutcome {
    /// Keep resolving.
    Continue,
    /// The operator quit; end the run.
    Cancel,
}

impl DisposalOutcome {
    /// Whether this outcome ends the run.
    #[must_use]
    pub fn is_cancel(self) -> bool {
        self == Self::Cancel
    }
}

/// One interactive prompt answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Leave the duplicate alone.
    Keep,
    /// Remove the duplicate's file.
    Delete,
    /// Remove the duplicate and hardlink the original in its place.
    Link,
    /// End the entire run.
    Quit,
    /// Reprint the help text.
    Help,
}

/// Parse one prompt answer. `None` means invalid input.
#[must_use]
pub fn parse_choice(input: &str) -> Option<Choice> {
    match input.trim().chars().next()? {
        'k' => Some(Choice::Keep),
        'd' => Some(Choice::Delete),
        'l' => Some(Choice::Link),
        'q' => Some(Choice::Quit),
        'h' => Some(Choice::Help),
        _ => None,
    }
}

/// Dispatch the disposal action for a cluster's original.
///
/// Only command mode acts on originals; every other policy leaves the
/// original untouched by definition.
pub fn dispose_original(mode: &DisposalMode, original: &Path) -> DisposalOutcome {
    if let DisposalMode::Command {
        original: Some(template),
        ..
    } = mode
    {
        run_command(template, original);
    }
    DisposalOutcome::Continue
}

/// Dispatch the disposal action for one confirmed duplicate.
///
/// `ordinal` is the run-wide duplicate number shown in the interactive
/// prompt.
pub fn dispose_duplicate(
    mode: &DisposalMode,
    duplicate: &Path,
    original: &Path,
    ordinal: u64,
) -> DisposalOutcome {
    match mode {
        DisposalMode::Report => DisposalOutcome::Continue,
        DisposalMode::Interactive => prompt_for(duplicate, original, ordinal),
        DisposalMode::Delete => {
            eprintln!("{} \"{}\"", "rm".red(), duplicate.display());
            remove_file(duplicate);
            DisposalOutcome::Continue
        }
        DisposalMode::Hardlink => {
            eprintln!(
                "{} \"{}\" \"{}\"",
                "ln".green(),
                original.display(),
                duplicate.display()
            );
            replace_with_link(duplicate, original);
            DisposalOutcome::Continue
        }
        DisposalMode::Command {
            duplicate: template,
            ..
        } => {
            run_command(template, duplicate);
            DisposalOutcome::Continue
        }
    }
}

/// Remove a file; failure is a warning, never fatal.
///
/// Accounting for the duplicate has already happened when this runs. A
/// failed removal leaves the file on disk while the log and the wasted-byte
/// total keep counting it as handled; that asymmetry is deliberate.
fn remove_file(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        log::warn!("remove failed with {}: {}", path.display(), e);
    }
}

/// Remove the duplicate, then hardlink the original to its former path.
///
/// Both steps fail independently; neither rolls back or aborts the run.
fn replace_with_link(duplicate: &Path, original: &Path) {
    if let Err(e) = fs::remove_file(duplicate) {
        log::error!("remove failed with {}: {}", duplicate.display(), e);
    }
    if let Err(e) = fs::hard_link(original, duplicate) {
        log::error!("hardlink failed with {}: {}", duplicate.display(), e);
    }
}

/// Substitute the path into the template and run it through `sh -c`.
fn run_command(template: &str, path: &Path) {
    let cmd = substitute_template(template, path);
    match Command::new("sh").arg("-c").arg(&cmd).status() {
        Err(e) => log::warn!("Cannot spawn '{}': {}", cmd, e),
        Ok(status) => {
            if terminated_by_interrupt(&status) {
                // Stops disposal of this one item; the run itself continues.
                log::info!("'{}' ended by interrupt, skipping this item", cmd);
            }
        }
    }
}

#[cfg(unix)]
fn terminated_by_interrupt(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    const SIGINT: i32 = 2;
    const SIGQUIT: i32 = 3;
    matches!(status.signal(), Some(SIGINT | SIGQUIT))
}

#[cfg(not(unix))]
fn terminated_by_interrupt(_status: &ExitStatus) -> bool {
    false
}

fn print_prompt_help() {
    eprintln!(
        "\n{} - keep file\n{} - delete file\n{} - replace with link\n{} - quit\n{} - help",
        "k".red(),
        "d".red(),
        "l".red(),
        "q".red(),
        "h".red()
    );
}

/// Ask the operator what to do with one duplicate. Blocks on stdin.
fn prompt_for(duplicate: &Path, original: &Path, ordinal: u64) -> DisposalOutcome {
    let stdin = io::stdin();
    prompt_loop(&mut stdin.lock(), duplicate, original, ordinal)
}

/// The prompt loop, reading answers from `input`.
///
/// Invalid input reprints the question; `h` reprints the help; `q` cancels
/// the entire run. End of input counts as keep, so a closed pipe cannot
/// spin forever.
fn prompt_loop(
    input: &mut impl BufRead,
    duplicate: &Path,
    original: &Path,
    ordinal: u64,
) -> DisposalOutcome {
    print_prompt_help();

    loop {
        eprintln!(
            "#[{}] \"{}\" {} \"{}\"",
            ordinal,
            original.display().yellow(),
            "==".green(),
            duplicate.display().yellow()
        );
        eprint!("{} {}?\n=> ", "Remove".blue(), duplicate.display());
        let _ = io::stderr().flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => {
                log::warn!("End of input on stdin, keeping {}", duplicate.display());
                return DisposalOutcome::Continue;
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Cannot read answer: {}", e);
                return DisposalOutcome::Continue;
            }
        }

        match parse_choice(&line) {
            Some(Choice::Keep) => return DisposalOutcome::Continue,
            Some(Choice::Delete) => {
                remove_file(duplicate);
                return DisposalOutcome::Continue;
            }
            Some(Choice::Link) => {
                replace_with_link(duplicate, original);
                return DisposalOutcome::Continue;
            }
            Some(Choice::Quit) => return DisposalOutcome::Cancel,
            Some(Choice::Help) => print_prompt_help(),
            None => log::warn!("Invalid input."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("k\n"), Some(Choice::Keep));
        assert_eq!(parse_choice("  d "), Some(Choice::Delete));
        assert_eq!(parse_choice("l"), Some(Choice::Link));
        assert_eq!(parse_choice("q"), Some(Choice::Quit));
        assert_eq!(parse_choice("h"), Some(Choice::Help));
        assert_eq!(parse_choice("x"), None);
        assert_eq!(parse_choice(""), None);
        assert_eq!(parse_choice("   \n"), None);
    }

    #[test]
    fn test_delete_mode_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let orig = dir.path().join("orig");
        let dup = dir.path().join("dup");
        std::fs::write(&orig, b"data").unwrap();
        std::fs::write(&dup, b"data").unwrap();

        let outcome = dispose_duplicate(&DisposalMode::Delete, &dup, &orig, 1);
        assert_eq!(outcome, DisposalOutcome::Continue);
        assert!(!dup.exists());
        assert!(orig.exists());
    }

    #[test]
    fn test_delete_mode_missing_file_still_continues() {
        let outcome = dispose_duplicate(
            &DisposalMode::Delete,
            &PathBuf::from("/no/such/duplicate"),
            &PathBuf::from("/no/such/original"),
            1,
        );
        assert_eq!(outcome, DisposalOutcome::Continue);
    }

    #[cfg(unix)]
    #[test]
    fn test_hardlink_mode_links_duplicate_to_original() {
        use std::os::unix::fs::MetadataExt;

        let dir = tempfile::tempdir().unwrap();
        let orig = dir.path().join("orig");
        let dup = dir.path().join("dup");
        std::fs::write(&orig, b"data").unwrap();
        std::fs::write(&dup, b"data").unwrap();

        let outcome = dispose_duplicate(&DisposalMode::Hardlink, &dup, &orig, 1);
        assert_eq!(outcome, DisposalOutcome::Continue);
        assert!(dup.exists());

        let m1 = std::fs::metadata(&orig).unwrap();
        let m2 = std::fs::metadata(&dup).unwrap();
        assert_eq!(m1.ino(), m2.ino());
    }

    #[test]
    fn test_command_mode_runs_template() {
        let dir = tempfile::tempdir().unwrap();
        let dup = dir.path().join("dup");
        std::fs::write(&dup, b"data").unwrap();

        let mode = DisposalMode::Command {
            original: None,
            duplicate: "rm -f \"%s\"".to_string(),
        };
        let outcome = dispose_duplicate(&mode, &dup, &dup, 1);
        assert_eq!(outcome, DisposalOutcome::Continue);
        assert!(!dup.exists());
    }

    #[test]
    fn test_original_untouched_outside_command_mode() {
        let dir = tempfile::tempdir().unwrap();
        let orig = dir.path().join("orig");
        std::fs::write(&orig, b"data").unwrap();

        for mode in [DisposalMode::Report, DisposalMode::Delete, DisposalMode::Hardlink] {
            let outcome = dispose_original(&mode, &orig);
            assert_eq!(outcome, DisposalOutcome::Continue);
            assert!(orig.exists());
        }
    }

    #[test]
    fn test_prompt_quit_cancels_run() {
        let dir = tempfile::tempdir().unwrap();
        let dup = dir.path().join("dup");
        std::fs::write(&dup, b"data").unwrap();

        let mut input = std::io::Cursor::new("q\n");
        let outcome = prompt_loop(&mut input, &dup, &dup, 1);
        assert_eq!(outcome, DisposalOutcome::Cancel);
        assert!(dup.exists());
    }

    #[test]
    fn test_prompt_eof_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let dup = dir.path().join("dup");
        std::fs::write(&dup, b"data").unwrap();

        let mut input = std::io::Cursor::new("");
        let outcome = prompt_loop(&mut input, &dup, &dup, 1);
        assert_eq!(outcome, DisposalOutcome::Continue);
        assert!(dup.exists());
    }

    #[test]
    fn test_prompt_invalid_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let orig = dir.path().join("orig");
        let dup = dir.path().join("dup");
        std::fs::write(&orig, b"data").unwrap();
        std::fs::write(&dup, b"data").unwrap();

        let mut input = std::io::Cursor::new("zzz\nd\n");
        let outcome = prompt_loop(&mut input, &dup, &orig, 1);
        assert_eq!(outcome, DisposalOutcome::Continue);
        assert!(!dup.exists());
        assert!(orig.exists());
    }

    #[test]
    fn test_prompt_help_then_keep() {
        let dir = tempfile::tempdir().unwrap();
        let dup = dir.path().join("dup");
        std::fs::write(&dup, b"data").unwrap();

        let mut input = std::io::Cursor::new("h\nk\n");
        let outcome = prompt_loop(&mut input, &dup, &dup, 1);
        assert_eq!(outcome, DisposalOutcome::Continue);
        assert!(dup.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_prompt_link_replaces_duplicate() {
        use std::os::unix::fs::MetadataExt;

        let dir = tempfile::tempdir().unwrap();
        let orig = dir.path().join("orig");
        let dup = dir.path().join("dup");
        std::fs::write(&orig, b"data").unwrap();
        std::fs::write(&dup, b"data").unwrap();

        let mut input = std::io::Cursor::new("l\n");
        let outcome = prompt_loop(&mut input, &dup, &orig, 1);
        assert_eq!(outcome, DisposalOutcome::Continue);

        let m1 = std::fs::metadata(&orig).unwrap();
        let m2 = std::fs::metadata(&dup).unwrap();
        assert_eq!(m1.ino(), m2.ino());
    }

    #[test]
    fn test_prompt_read_error_keeps_file() {
        struct Failing;
        impl std::io::Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "tty gone"))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let dup = dir.path().join("dup");
        std::fs::write(&dup, b"data").unwrap();

        let mut input = std::io::BufReader::new(Failing);
        let outcome = prompt_loop(&mut input, &dup, &dup, 1);
        assert_eq!(outcome, DisposalOutcome::Continue);
        assert!(dup.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_terminated_by_interrupt() {
        use std::os::unix::process::ExitStatusExt;

        assert!(terminated_by_interrupt(&ExitStatus::from_raw(2)));
        assert!(terminated_by_interrupt(&ExitStatus::from_raw(3)));
        // Normal exit 0 and SIGKILL are not interrupts.
        assert!(!terminated_by_interrupt(&ExitStatus::from_raw(0)));
        assert!(!terminated_by_interrupt(&ExitStatus::from_raw(9)));
    }
}
