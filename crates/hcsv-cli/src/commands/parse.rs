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

//! Parse command - assemble a data file into a JSON forest

use super::json::output_to_json;
use super::{load_registry, write_output};
use crate::error::CliError;
use colored::Colorize;
use hcsv_core::ParseOutput;
use hcsv_csv::{HcsvReader, ReadError, ReaderConfig};
use std::fs::File;
use tracing::info;

/// Arguments of [`parse`].
#[derive(Debug, Clone)]
pub struct ParseArgs {
    /// JSON schema file
    pub schema: String,
    /// Delimited data file
    pub data: String,
    /// Field delimiter (single ASCII character)
    pub delimiter: char,
    /// Leading lines to skip
    pub skip_lines: usize,
    /// Skip lines with unknown codes instead of reporting them
    pub ignore_unknown: bool,
    /// Stop at the first failed line
    pub strict: bool,
    /// Pretty-print the JSON output
    pub pretty: bool,
    /// Output file (defaults to stdout)
    pub output: Option<String>,
}

impl Default for ParseArgs {
    fn default() -> Self {
        Self {
            schema: String::new(),
            data: String::new(),
            delimiter: ',',
            skip_lines: 0,
            ignore_unknown: false,
            strict: false,
            pretty: false,
            output: None,
        }
    }
}

/// Parse a data file against a schema and write the forest as JSON.
///
/// The output is `{ "records": [...], "errors": [...], "stats": {...} }`.
/// In strict mode the read stops at the first failed line and the partial
/// result is written.
///
/// # Errors
///
/// Returns `Err` if the schema or data cannot be read, the schema is invalid,
/// or any line failed. Line failures are returned after the output has been
/// written.
///
/// # Examples
///
/// ```no_run
/// use hcsv_cli::commands::{parse, ParseArgs};
///
/// # fn main() -> Result<(), hcsv_cli::error::CliError> {
/// parse(&ParseArgs {
///     schema: "schema.json".to_string(),
///     data: "users.csv".to_string(),
///     delimiter: ';',
///     pretty: true,
///     ..Default::default()
/// })?;
/// # Ok(())
/// # }
/// ```
pub fn parse(args: &ParseArgs) -> Result<(), CliError> {
    let delimiter = delimiter_byte(args.delimiter)?;
    let registry = load_registry(&args.schema)?;
    let file = File::open(&args.data).map_err(|e| CliError::io_error(&args.data, e))?;

    let config = ReaderConfig {
        delimiter,
        skip_lines: args.skip_lines,
        ignore_unknown_types: args.ignore_unknown,
        stop_on_first_error: args.strict,
        ..Default::default()
    };

    let (output, aborted) = match HcsvReader::from_reader(file, &registry, config).read_all() {
        Ok(output) => (output, None),
        Err(ReadError::Aborted { error, partial }) => (*partial, Some(error)),
        Err(e) => {
            if let Some(partial) = e.partial() {
                write_json(partial, args)?;
            }
            return Err(e.into());
        }
    };

    write_json(&output, args)?;
    info!(
        lines = output.stats.lines,
        attached = output.stats.attached,
        failed = output.stats.failed,
        "parse complete"
    );

    if let Some(error) = aborted {
        eprintln!("{} {}", "✗".red().bold(), error);
        return Err(CliError::LineFailures {
            failed: output.stats.failed,
        });
    }
    if output.stats.failed > 0 {
        eprintln!(
            "{} {} of {} lines failed",
            "✗".red().bold(),
            output.stats.failed,
            output.stats.lines
        );
        return Err(CliError::LineFailures {
            failed: output.stats.failed,
        });
    }
    Ok(())
}

fn write_json(output: &ParseOutput, args: &ParseArgs) -> Result<(), CliError> {
    let value = output_to_json(output);
    let mut text = if args.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    text.push('\n');
    write_output(&text, args.output.as_deref())
}

fn delimiter_byte(delimiter: char) -> Result<u8, CliError> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(CliError::invalid_input(format!(
            "delimiter must be a single ASCII character, got '{}'",
            delimiter
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_byte() {
        assert_eq!(delimiter_byte(';').unwrap(), b';');
        assert_eq!(delimiter_byte('\t').unwrap(), b'\t');
        assert!(matches!(
            delimiter_byte('§'),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_default_args() {
        let args = ParseArgs::default();
        assert_eq!(args.delimiter, ',');
        assert!(!args.strict);
        assert!(args.output.is_none());
    }
}
