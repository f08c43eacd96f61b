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

//! Streaming reader: tokenize, then feed each line to a [`Pass`].

use crate::error::{ReadError, Result};
use hcsv_core::{
    FailFast, LineOutcome, ParseOutput, Pass, PassOptions, PositionalBinder, RecordBinder,
    Registry,
};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

/// Default maximum number of lines to read.
///
/// Every attached record is kept until the pass ends, so an unbounded input
/// means unbounded memory. The limit can be raised through
/// [`ReaderConfig::max_lines`].
///
/// # Examples
///
/// ```
/// # use hcsv_csv::ReaderConfig;
/// let config = ReaderConfig::default();
/// assert_eq!(config.max_lines, 1_000_000);
///
/// let config = ReaderConfig {
///     max_lines: 10_000_000,
///     ..Default::default()
/// };
/// ```
pub const DEFAULT_MAX_LINES: usize = 1_000_000;

/// Configuration for reading a hierarchical flat file.
///
/// # Examples
///
/// ```
/// # use hcsv_csv::ReaderConfig;
/// let config = ReaderConfig::default();
/// assert_eq!(config.delimiter, b',');
/// assert_eq!(config.quote, b'"');
/// assert!(!config.trim);
/// assert_eq!(config.skip_lines, 0);
/// assert!(!config.ignore_unknown_types);
/// assert!(!config.stop_on_first_error);
///
/// let semicolons = ReaderConfig {
///     delimiter: b';',
///     skip_lines: 2,
///     ignore_unknown_types: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Field delimiter (default: `,`).
    pub delimiter: u8,

    /// Quote character (default: `"`).
    pub quote: u8,

    /// Trim leading and trailing whitespace of every field (default: `false`).
    ///
    /// Discriminators are compared exactly, so a padded code only matches
    /// with trimming on.
    pub trim: bool,

    /// Physical lines to drop before tokenizing (default: 0).
    pub skip_lines: usize,

    /// Skip lines no type matches instead of reporting them (default: `false`).
    pub ignore_unknown_types: bool,

    /// Abort the read at the first line failure (default: `false`).
    ///
    /// Per-type error handlers installed on the pass still take precedence.
    pub stop_on_first_error: bool,

    /// Maximum number of lines to read after skipping (default: 1,000,000).
    pub max_lines: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: false,
            skip_lines: 0,
            ignore_unknown_types: false,
            stop_on_first_error: false,
            max_lines: DEFAULT_MAX_LINES,
        }
    }
}

/// Reads delimited text line by line into a [`Pass`].
///
/// Lines may have any number of fields. Line numbers are the 1-based
/// physical line numbers of the source, skipped lines included.
///
/// # Examples
///
/// ```
/// use hcsv_core::{FieldDecl, RecordDecl, Registry, ScalarType};
/// use hcsv_csv::{HcsvReader, ReaderConfig};
///
/// let registry = Registry::build(vec![
///     RecordDecl::new("User", "U")
///         .field(FieldDecl::scalar("id", ScalarType::String).column(1).key())
///         .field(FieldDecl::child_list("orders", "Order")),
///     RecordDecl::new("Order", "O")
///         .field(FieldDecl::scalar("user", ScalarType::String).column(1).parent_key("User", 0))
///         .field(FieldDecl::scalar("item", ScalarType::String).column(2)),
/// ])
/// .unwrap();
///
/// let data = "U,1\nO,1,apple\nO,1,\"pear, green\"\n";
/// let output = HcsvReader::from_reader(data.as_bytes(), &registry, ReaderConfig::default())
///     .read_all()
///     .unwrap();
///
/// let orders = output.records[0].children("orders");
/// assert_eq!(orders[1].get("item").and_then(|v| v.as_str()), Some("pear, green"));
/// ```
pub struct HcsvReader<'a, R, B = PositionalBinder> {
    csv: csv::Reader<BufReader<R>>,
    pass: Pass<'a, B>,
    config: ReaderConfig,
    record: csv::StringRecord,
    started: bool,
    skipped: u64,
    lines: usize,
}

impl<'a, R: Read> HcsvReader<'a, R> {
    /// Create a reader binding lines with [`PositionalBinder`].
    pub fn from_reader(reader: R, registry: &'a Registry, config: ReaderConfig) -> Self {
        Self::with_binder(reader, registry, PositionalBinder, config)
    }
}

impl<'a, R: Read, B: RecordBinder> HcsvReader<'a, R, B> {
    /// Create a reader with a custom binder.
    pub fn with_binder(reader: R, registry: &'a Registry, binder: B, config: ReaderConfig) -> Self {
        let csv = csv::ReaderBuilder::new()
            .delimiter(config.delimiter)
            .quote(config.quote)
            .has_headers(false)
            .flexible(true)
            .trim(if config.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .from_reader(BufReader::new(reader));

        let options = PassOptions {
            ignore_unknown_types: config.ignore_unknown_types,
        };
        let mut pass = Pass::new(registry, binder, options);
        if config.stop_on_first_error {
            pass = pass.with_error_handler(FailFast);
        }

        Self {
            csv,
            pass,
            config,
            record: csv::StringRecord::new(),
            started: false,
            skipped: 0,
            lines: 0,
        }
    }

    /// Adjust the pass before reading: listeners, filters, verifiers, handlers.
    ///
    /// ```
    /// # use hcsv_core::{RecordDecl, Registry};
    /// # use hcsv_csv::{HcsvReader, ReaderConfig};
    /// # let registry = Registry::build(vec![RecordDecl::new("Header", "H")]).unwrap();
    /// let reader = HcsvReader::from_reader("H\nH\n".as_bytes(), &registry, ReaderConfig::default())
    ///     .configure(|pass| pass.with_filter("Header", |_fields: &[String]| false));
    /// assert_eq!(reader.read_all().unwrap().stats.filtered, 2);
    /// ```
    pub fn configure(mut self, f: impl FnOnce(Pass<'a, B>) -> Pass<'a, B>) -> Self {
        self.pass = f(self.pass);
        self
    }

    /// Read and process the next line.
    ///
    /// Returns `Ok(None)` at the end of input.
    pub fn read_line(&mut self) -> Result<Option<LineOutcome>> {
        if !self.started {
            self.started = true;
            self.skipped = skip_physical_lines(self.csv.get_mut(), self.config.skip_lines)?;
            if self.skipped > 0 {
                debug!(skipped = self.skipped, "skipped leading lines");
            }
        }

        let more = match self.csv.read_record(&mut self.record) {
            Ok(more) => more,
            Err(e) => {
                let err = ReadError::csv(e, self.skipped, self.snapshot());
                warn!(line = ?err.line(), "tokenizer failed");
                return Err(err);
            }
        };
        if !more {
            return Ok(None);
        }

        if self.lines >= self.config.max_lines {
            warn!(limit = self.config.max_lines, "line limit reached");
            return Err(ReadError::SecurityLimit {
                limit: self.config.max_lines,
                actual: self.lines + 1,
                partial: Box::new(self.snapshot()),
            });
        }
        self.lines += 1;

        let line_number = self
            .record
            .position()
            .map(|p| p.line())
            .unwrap_or(self.lines as u64)
            + self.skipped;
        let fields = self.record.iter().map(String::from).collect();

        match self.pass.process_line(line_number, fields) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(aborted) => Err(ReadError::Aborted {
                error: aborted.error,
                partial: Box::new(self.snapshot()),
            }),
        }
    }

    /// Read to the end of input and finish the pass.
    pub fn read_all(mut self) -> Result<ParseOutput> {
        while self.read_line()?.is_some() {}
        debug!(lines = self.lines, "end of input");
        Ok(self.finish())
    }

    /// The pass being fed.
    pub fn pass(&self) -> &Pass<'a, B> {
        &self.pass
    }

    /// Lines read so far, skipped lines excluded.
    pub fn lines_read(&self) -> usize {
        self.lines
    }

    /// Finish the pass without reading further.
    pub fn finish(self) -> ParseOutput {
        self.pass.finish()
    }

    fn snapshot(&self) -> ParseOutput {
        ParseOutput {
            records: self.pass.forest(),
            errors: self.pass.errors().to_vec(),
            stats: self.pass.stats(),
        }
    }
}

fn skip_physical_lines<R: BufRead>(reader: &mut R, count: usize) -> Result<u64> {
    let mut buf = Vec::new();
    let mut skipped = 0;
    while skipped < count {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        skipped += 1;
    }
    Ok(skipped as u64)
}

/// Read a complete text with the positional binder.
///
/// # Examples
///
/// ```
/// use hcsv_core::{RecordDecl, Registry};
/// use hcsv_csv::{read_str, ReaderConfig};
///
/// let registry = Registry::build(vec![RecordDecl::new("Header", "H")]).unwrap();
/// let output = read_str("H\nX\n", &registry, ReaderConfig::default()).unwrap();
/// assert_eq!(output.records.len(), 1);
/// assert_eq!(output.errors.len(), 1);
/// ```
pub fn read_str(text: &str, registry: &Registry, config: ReaderConfig) -> Result<ParseOutput> {
    HcsvReader::from_reader(text.as_bytes(), registry, config).read_all()
}

/// Read a file with the positional binder.
pub fn read_path(
    path: impl AsRef<Path>,
    registry: &Registry,
    config: ReaderConfig,
) -> Result<ParseOutput> {
    let file = File::open(path.as_ref())?;
    HcsvReader::from_reader(file, registry, config).read_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcsv_core::{FieldDecl, LineErrorKind, RecordDecl, ScalarType, Value};

    fn registry() -> Registry {
        Registry::build(vec![
            RecordDecl::new("User", "U")
                .field(FieldDecl::scalar("id", ScalarType::String).column(1).key())
                .field(FieldDecl::child_list("orders", "Order")),
            RecordDecl::new("Order", "O")
                .field(
                    FieldDecl::scalar("user", ScalarType::String)
                        .column(1)
                        .parent_key("User", 0),
                )
                .field(FieldDecl::scalar("item", ScalarType::String).column(2).key()),
        ])
        .unwrap()
    }

    // ==================== Config ====================

    #[test]
    fn test_config_default() {
        let config = ReaderConfig::default();
        assert_eq!(config.delimiter, b',');
        assert_eq!(config.max_lines, DEFAULT_MAX_LINES);
    }

    // ==================== Reading ====================

    #[test]
    fn test_read_line_by_line() {
        let registry = registry();
        let mut reader =
            HcsvReader::from_reader("U,1\nO,1,a\n".as_bytes(), &registry, ReaderConfig::default());

        assert!(matches!(
            reader.read_line().unwrap(),
            Some(LineOutcome::Attached { .. })
        ));
        assert!(matches!(
            reader.read_line().unwrap(),
            Some(LineOutcome::Attached { ref key, .. }) if key == "User(1).Order(a)"
        ));
        assert_eq!(reader.read_line().unwrap(), None);
        assert_eq!(reader.lines_read(), 2);
        assert_eq!(reader.finish().records.len(), 1);
    }

    #[test]
    fn test_line_numbers_count_skipped_lines() {
        let registry = registry();
        let config = ReaderConfig {
            skip_lines: 2,
            ..Default::default()
        };
        let output = read_str("title\nlegend\nU,1\nO,2,a\n", &registry, config).unwrap();
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].line_number, 4);
        assert_eq!(output.errors[0].kind, LineErrorKind::ParentBeanNotFound);
    }

    #[test]
    fn test_skip_past_end_of_input() {
        let registry = registry();
        let config = ReaderConfig {
            skip_lines: 10,
            ..Default::default()
        };
        let output = read_str("U,1\n", &registry, config).unwrap();
        assert!(output.records.is_empty());
        assert_eq!(output.stats.lines, 0);
    }

    #[test]
    fn test_trim_makes_padded_codes_match() {
        let registry = registry();
        let text = " U , 1 \n";
        let untrimmed = read_str(text, &registry, ReaderConfig::default()).unwrap();
        assert_eq!(untrimmed.errors[0].kind, LineErrorKind::Unclassified);

        let config = ReaderConfig {
            trim: true,
            ..Default::default()
        };
        let trimmed = read_str(text, &registry, config).unwrap();
        assert_eq!(trimmed.records[0].get("id"), Some(&Value::from("1")));
    }

    #[test]
    fn test_quoted_fields() {
        let registry = registry();
        let config = ReaderConfig {
            delimiter: b';',
            quote: b'\'',
            ..Default::default()
        };
        let output = read_str("U;1\nO;1;'a;b'\n", &registry, config).unwrap();
        let orders = output.records[0].children("orders");
        assert_eq!(orders[0].get("item"), Some(&Value::from("a;b")));
    }

    // ==================== Limits and errors ====================

    #[test]
    fn test_max_lines_limit_enforcement() {
        let registry = registry();
        let config = ReaderConfig {
            max_lines: 2,
            ..Default::default()
        };
        let err = read_str("U,1\nU,2\nU,3\n", &registry, config).unwrap_err();
        match err {
            ReadError::SecurityLimit {
                limit,
                actual,
                partial,
            } => {
                assert_eq!((limit, actual), (2, 3));
                assert_eq!(partial.records.len(), 2);
                assert_eq!(partial.stats.lines, 2);
            }
            other => panic!("expected security limit, got {:?}", other),
        }
    }

    #[test]
    fn test_max_lines_exact_is_accepted() {
        let registry = registry();
        let config = ReaderConfig {
            max_lines: 2,
            ..Default::default()
        };
        assert!(read_str("U,1\nU,2\n", &registry, config).is_ok());
    }

    #[test]
    fn test_stop_on_first_error() {
        let registry = registry();
        let config = ReaderConfig {
            stop_on_first_error: true,
            ..Default::default()
        };
        let err = read_str("U,1\nO,1,a\nX\nU,2\n", &registry, config).unwrap_err();
        match err {
            ReadError::Aborted { error, partial } => {
                assert_eq!(error.line_number, 3);
                assert_eq!(partial.records.len(), 1);
                assert_eq!(partial.records[0].children("orders").len(), 1);
                assert_eq!(partial.errors.len(), 1);
            }
            other => panic!("expected abort, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_is_a_csv_error() {
        let registry = registry();
        let data: &[u8] = b"U,1\nU,\xff\n";
        let err = HcsvReader::from_reader(data, &registry, ReaderConfig::default())
            .read_all()
            .unwrap_err();
        assert!(matches!(err, ReadError::Csv { line: 2, .. }));
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_tokenizer_error_keeps_records_read_so_far() {
        let registry = registry();
        let data: &[u8] = b"U,1\nO,1,apple\nU,2\nU,\xff\nU,4\n";
        let err = HcsvReader::from_reader(data, &registry, ReaderConfig::default())
            .read_all()
            .unwrap_err();

        assert_eq!(err.line(), Some(4));
        match err {
            ReadError::Csv { line, partial, .. } => {
                assert_eq!(line, 4);
                let ids: Vec<_> = partial.records.iter().map(|r| r.get("id")).collect();
                assert_eq!(ids, vec![Some(&Value::from("1")), Some(&Value::from("2"))]);
                assert_eq!(partial.records[0].children("orders").len(), 1);
                assert_eq!(partial.stats.lines, 3);
                assert!(partial.errors.is_empty());
            }
            other => panic!("expected tokenizer error, got {:?}", other),
        }
    }

    #[test]
    fn test_skip_physical_lines() {
        let mut input = "a\nb\nc".as_bytes();
        assert_eq!(skip_physical_lines(&mut input, 2).unwrap(), 2);
        assert_eq!(input, b"c");
        assert_eq!(skip_physical_lines(&mut input, 5).unwrap(), 1);
    }
}
