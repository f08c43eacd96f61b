// Dweve HCSV - Hierarchical flat-file assembly
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Structured error types for the HCSV CLI.
//!
//! All commands return `Result<(), CliError>`; `main` prints the error and
//! exits with a failure status.

use hcsv_core::RegistrationError;
use hcsv_csv::ReadError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for HCSV CLI operations.
///
/// # Examples
///
/// ```rust,no_run
/// use hcsv_cli::error::CliError;
///
/// fn read(path: &str) -> Result<String, CliError> {
///     std::fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))
/// }
/// ```
#[derive(Error, Debug)]
pub enum CliError {
    /// I/O operation failed (file open, read or write).
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The file path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// The schema file is not a valid list of type declarations.
    #[error("Invalid schema file '{path}': {message}")]
    Schema {
        /// The schema file path
        path: PathBuf,
        /// The decoding error message
        message: String,
    },

    /// The declarations did not form a valid registry.
    #[error("Invalid schema: {0}")]
    Registration(#[from] RegistrationError),

    /// Reading the data file failed.
    #[error("{0}")]
    Read(#[from] ReadError),

    /// JSON serialization error.
    #[error("JSON format error: {message}")]
    JsonFormat {
        /// The error message
        message: String,
    },

    /// Some lines could not be attached.
    ///
    /// The output was still written; this only sets the exit status.
    #[error("{failed} line(s) failed")]
    LineFailures {
        /// Number of failed lines
        failed: u64,
    },

    /// Invalid input provided by the user.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Create an I/O error with file path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create a schema decoding error.
    pub fn schema(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonFormat {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcsv_core::{ParseOutput, PassStats};

    #[test]
    fn test_io_error_display() {
        let err = CliError::io_error(
            "data.csv",
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.to_string(), "I/O error for 'data.csv': not found");
    }

    #[test]
    fn test_registration_error_conversion() {
        let err = CliError::from(RegistrationError::NoTypesDeclared);
        assert!(matches!(err, CliError::Registration(_)));
        assert!(err.to_string().starts_with("Invalid schema: "));
    }

    #[test]
    fn test_line_failures_display() {
        let err = CliError::LineFailures { failed: 3 };
        assert_eq!(err.to_string(), "3 line(s) failed");
    }

    #[test]
    fn test_read_error_is_transparent() {
        let err = CliError::from(ReadError::SecurityLimit {
            limit: 1,
            actual: 2,
            partial: Box::new(ParseOutput {
                records: vec![],
                errors: vec![],
                stats: PassStats::default(),
            }),
        });
        assert_eq!(
            err.to_string(),
            "Security limit exceeded: line count 2 exceeds maximum 1"
        );
    }
}
