//! Exit codes for the dupelint binary.

/// Exit codes reported by dupelint.
///
/// - 0: Success (completed normally, duplicates found)
/// - 1: General error (unexpected failure)
/// - 2: No duplicates found (completed normally, nothing to report)
/// - 130: Run ended by the operator (interactive quit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success: duplicates were found and handled.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: the run completed but confirmed nothing.
    NoDuplicates = 2,
    /// Interrupted: the operator quit from the interactive prompt.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DL000",
            Self::GeneralError => "DL001",
            Self::NoDuplicates => "DL002",
            Self::Interrupted => "DL130",
        }
    }
}
