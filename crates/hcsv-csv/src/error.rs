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

//! Error types for reading hierarchical flat files.

use hcsv_core::{LineError, ParseOutput};
use thiserror::Error;

/// Reader error types.
///
/// Per-line failures (unknown codes, missing parents, binding errors) are
/// not read errors: they are reported in [`ParseOutput::errors`]. A read
/// error ends the read. Errors raised after reading started carry the
/// output assembled up to that point, see [`ReadError::partial`].
///
/// # Examples
///
/// ```
/// use hcsv_core::{ParseOutput, PassStats};
/// use hcsv_csv::ReadError;
///
/// let err = ReadError::SecurityLimit {
///     limit: 1_000_000,
///     actual: 1_000_001,
///     partial: Box::new(ParseOutput {
///         records: vec![],
///         errors: vec![],
///         stats: PassStats::default(),
///     }),
/// };
/// assert!(err.to_string().contains("Security limit"));
/// assert!(err.partial().is_some());
/// ```
#[derive(Debug, Error)]
pub enum ReadError {
    /// The tokenizer rejected the input.
    #[error("CSV parse error at line {line}: {source}")]
    Csv {
        /// Line number where the error occurred (1-based, 0 if unknown).
        line: u64,
        /// Underlying tokenizer error.
        source: csv::Error,
        /// Everything assembled and reported before the failing line.
        partial: Box<ParseOutput>,
    },

    /// I/O error while opening the source or skipping its leading lines.
    ///
    /// Failures of the underlying reader after that surface as
    /// [`ReadError::Csv`].
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Line count exceeded the configured maximum.
    #[error("Security limit exceeded: line count {actual} exceeds maximum {limit}")]
    SecurityLimit {
        /// Maximum allowed lines.
        limit: usize,
        /// Line count encountered.
        actual: usize,
        /// Everything assembled and reported within the limit.
        partial: Box<ParseOutput>,
    },

    /// An error handler stopped the pass.
    #[error("Read aborted at line {}: {}", .error.line_number, .error.message)]
    Aborted {
        /// The failure that triggered the abort.
        error: LineError,
        /// Everything assembled and reported up to the abort.
        partial: Box<ParseOutput>,
    },
}

/// Result type for read operations.
pub type Result<T> = std::result::Result<T, ReadError>;

impl ReadError {
    pub(crate) fn csv(source: csv::Error, line_offset: u64, partial: ParseOutput) -> Self {
        let line = source
            .position()
            .map(|p| p.line() + line_offset)
            .unwrap_or(0);
        ReadError::Csv {
            line,
            source,
            partial: Box::new(partial),
        }
    }

    /// Line number the error refers to, if any.
    pub fn line(&self) -> Option<u64> {
        match self {
            ReadError::Csv { line, .. } if *line > 0 => Some(*line),
            ReadError::Aborted { error, .. } => Some(error.line_number),
            _ => None,
        }
    }

    /// Output assembled before the error, if reading had started.
    pub fn partial(&self) -> Option<&ParseOutput> {
        match self {
            ReadError::Csv { partial, .. }
            | ReadError::SecurityLimit { partial, .. }
            | ReadError::Aborted { partial, .. } => Some(partial),
            ReadError::Io(_) => None,
        }
    }

    /// Take the output assembled before the error, if reading had started.
    pub fn into_partial(self) -> Option<ParseOutput> {
        match self {
            ReadError::Csv { partial, .. }
            | ReadError::SecurityLimit { partial, .. }
            | ReadError::Aborted { partial, .. } => Some(*partial),
            ReadError::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcsv_core::{LineErrorKind, PassStats};

    fn empty_output() -> Box<ParseOutput> {
        Box::new(ParseOutput {
            records: vec![],
            errors: vec![],
            stats: PassStats::default(),
        })
    }

    #[test]
    fn test_security_limit_display() {
        let err = ReadError::SecurityLimit {
            limit: 10,
            actual: 11,
            partial: empty_output(),
        };
        assert_eq!(
            err.to_string(),
            "Security limit exceeded: line count 11 exceeds maximum 10"
        );
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_aborted_display() {
        let error = LineError::new(
            LineErrorKind::Unclassified,
            7,
            &["X".to_string()],
            "no record type matches line 7",
        );
        let err = ReadError::Aborted {
            error,
            partial: empty_output(),
        };
        assert_eq!(
            err.to_string(),
            "Read aborted at line 7: no record type matches line 7"
        );
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn test_partial_output_accessors() {
        let mut partial = empty_output();
        partial.stats.lines = 4;
        let err = ReadError::SecurityLimit {
            limit: 4,
            actual: 5,
            partial,
        };
        assert_eq!(err.partial().map(|p| p.stats.lines), Some(4));
        assert_eq!(err.into_partial().map(|p| p.stats.lines), Some(4));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ReadError::from(io_err);
        assert_eq!(err.to_string(), "I/O error: missing");
        assert!(err.partial().is_none());
    }
}
