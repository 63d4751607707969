//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the entrycache binary.
///
/// - 0: Changes detected (a rebuild is needed)
/// - 1: General error (unexpected failure)
/// - 2: No changes detected (completed normally, rebuild not required)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// The diff found changes in at least one category.
    ChangesDetected = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// The diff found no changes.
    NoChanges = 2,
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
            Self::ChangesDetected => "EC000",
            Self::GeneralError => "EC001",
            Self::NoChanges => "EC002",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "EC001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
