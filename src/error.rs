//! Structured error handling and exit codes.

use serde::Serialize;

use crate::dedup::DedupError;
use crate::scanner::ScanError;

/// Exit codes for the linkdupe application.
///
/// - 0: Success (ran to completion, zero or more files linked)
/// - 1: General error (unrecoverable setup failure)
/// - 3: Partial success (ran to completion with recoverable errors)
/// - 10: No files (no candidate files were supplied)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: The run completed without errors.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Partial success: The run completed but recorded some errors.
    PartialSuccess = 3,
    /// No files: Nothing to deduplicate.
    NoFiles = 10,
    /// Interrupted: The run was interrupted by user (Ctrl+C).
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
            Self::Success => "LD000",
            Self::GeneralError => "LD001",
            Self::PartialSuccess => "LD003",
            Self::NoFiles => "LD010",
            Self::Interrupted => "LD130",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "LD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            // Include the context chain; config errors are useless without it
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

/// Machine-readable failure kind of a recoverable error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Path could not be inspected
    StatFailed,
    /// File could not be opened for reading
    OpenFailed,
    /// File could not be read to the end
    ReadFailed,
    /// Duplicate could not be removed
    RemoveFailed,
    /// Duplicate was removed but could not be relinked
    LinkFailed,
    /// Pattern could not be parsed
    InvalidPattern,
    /// Pattern matched nothing
    NoMatch,
}

impl ErrorKind {
    /// Get the snake_case name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StatFailed => "stat_failed",
            Self::OpenFailed => "open_failed",
            Self::ReadFailed => "read_failed",
            Self::RemoveFailed => "remove_failed",
            Self::LinkFailed => "link_failed",
            Self::InvalidPattern => "invalid_pattern",
            Self::NoMatch => "no_match",
        }
    }
}

/// One reported error: the offending path and what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    /// Offending path (or pattern)
    pub path: String,
    /// Failure kind
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
}

impl From<&DedupError> for ErrorRecord {
    fn from(err: &DedupError) -> Self {
        Self {
            path: err.path().display().to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<&ScanError> for ErrorRecord {
    fn from(err: &ScanError) -> Self {
        Self {
            path: err.subject(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
