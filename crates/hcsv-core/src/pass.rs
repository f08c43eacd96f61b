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

//! One parse pass: classify, bind, filter, verify and attach, line by line.
//!
//! A [`Pass`] borrows a built [`Registry`] and owns the [`TreeAssembler`]
//! for the duration of the pass. `process_line` handles one line completely
//! before returning, so a line's attach step has been applied before the
//! next line is classified.
//!
//! # Examples
//!
//! ```
//! use hcsv_core::{FieldDecl, Pass, PassOptions, PositionalBinder, RecordDecl, Registry, ScalarType};
//!
//! let registry = Registry::build(vec![
//!     RecordDecl::new("User", "U")
//!         .field(FieldDecl::scalar("id", ScalarType::String).column(1).key())
//!         .field(FieldDecl::child_list("orders", "Order")),
//!     RecordDecl::new("Order", "O")
//!         .field(FieldDecl::scalar("user", ScalarType::String).column(1).parent_key("User", 0))
//!         .field(FieldDecl::scalar("item", ScalarType::String).column(2)),
//! ])?;
//!
//! let mut pass = Pass::new(&registry, PositionalBinder, PassOptions::default());
//! for (n, line) in [vec!["U", "1"], vec!["O", "1", "apple"]].into_iter().enumerate() {
//!     let fields = line.into_iter().map(String::from).collect();
//!     pass.process_line(n as u64 + 1, fields).unwrap();
//! }
//!
//! let output = pass.finish();
//! assert_eq!(output.records.len(), 1);
//! assert_eq!(output.records[0].children("orders").len(), 1);
//! # Ok::<(), hcsv_core::RegistrationError>(())
//! ```

use crate::assemble::TreeAssembler;
use crate::bind::RecordBinder;
use crate::error::LineError;
use crate::registry::{Classification, Registry};
use crate::value::Record;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Pass-wide options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassOptions {
    /// Skip lines no type matches instead of reporting them (default: false).
    pub ignore_unknown_types: bool,
}

/// What happened to one line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// The record was bound and attached under `key`.
    Attached { type_name: String, key: String },
    /// A filter or verifier rejected the line.
    Filtered { type_name: String },
    /// The line had no content.
    Empty,
    /// No type matched and unknown types are ignored.
    Ignored,
    /// The line failed; the error is also in the pass report.
    Failed(LineError),
}

impl LineOutcome {
    pub fn is_filtered(&self) -> bool {
        matches!(self, Self::Filtered { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The line's error, if it failed.
    pub fn error(&self) -> Option<&LineError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Hooks around every processed line.
pub trait LineListener {
    /// Called before classification; may rewrite the raw fields.
    fn before_line(&mut self, _line_number: u64, _fields: &mut Vec<String>) {}

    /// Called once the line is fully processed.
    fn after_line(&mut self, _line_number: u64, _outcome: &LineOutcome) {}
}

impl<L: LineListener + ?Sized> LineListener for &mut L {
    fn before_line(&mut self, line_number: u64, fields: &mut Vec<String>) {
        (**self).before_line(line_number, fields)
    }

    fn after_line(&mut self, line_number: u64, outcome: &LineOutcome) {
        (**self).after_line(line_number, outcome)
    }
}

/// Decision of an [`ErrorHandler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorAction {
    /// Record the error and go on with the next line.
    #[default]
    Continue,
    /// Stop the pass.
    Abort,
}

/// Receives every line failure.
pub trait ErrorHandler {
    fn handle(&mut self, error: &LineError) -> ErrorAction;
}

impl<F> ErrorHandler for F
where
    F: FnMut(&LineError) -> ErrorAction,
{
    fn handle(&mut self, error: &LineError) -> ErrorAction {
        self(error)
    }
}

/// Keep going after every failure. Used when no handler is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinueOnError;

impl ErrorHandler for ContinueOnError {
    fn handle(&mut self, _error: &LineError) -> ErrorAction {
        ErrorAction::Continue
    }
}

/// Stop at the first failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFast;

impl ErrorHandler for FailFast {
    fn handle(&mut self, _error: &LineError) -> ErrorAction {
        ErrorAction::Abort
    }
}

/// An error handler stopped the pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pass aborted: {error}")]
pub struct PassAborted {
    /// The failure that triggered the abort.
    pub error: LineError,
}

/// Line counters of a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PassStats {
    /// Lines handed to the pass.
    pub lines: u64,
    pub attached: u64,
    pub filtered: u64,
    pub empty: u64,
    /// Lines no type matched, reported or ignored.
    pub unclassified: u64,
    pub failed: u64,
}

/// Result of a completed pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    /// Top-level records in input order.
    pub records: Vec<Record>,
    /// Every line failure, in input order.
    pub errors: Vec<LineError>,
    pub stats: PassStats,
}

impl ParseOutput {
    /// Returns true if no line failed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

type LineFilter<'a> = Box<dyn Fn(&[String]) -> bool + 'a>;
type Verifier<'a> = Box<dyn Fn(&Record) -> Result<bool, String> + 'a>;

#[derive(Default)]
struct TypeHooks<'a> {
    filter: Option<LineFilter<'a>>,
    verifiers: Vec<Verifier<'a>>,
    handler: Option<Box<dyn ErrorHandler + 'a>>,
}

/// A single parse pass over tokenized lines.
pub struct Pass<'a, B> {
    registry: &'a Registry,
    binder: B,
    options: PassOptions,
    assembler: TreeAssembler<'a>,
    hooks: HashMap<String, TypeHooks<'a>>,
    listener: Option<Box<dyn LineListener + 'a>>,
    handler: Box<dyn ErrorHandler + 'a>,
    errors: Vec<LineError>,
    stats: PassStats,
}

impl<'a, B: RecordBinder> Pass<'a, B> {
    /// Start a pass with the default error handler ([`ContinueOnError`]).
    pub fn new(registry: &'a Registry, binder: B, options: PassOptions) -> Self {
        Self {
            registry,
            binder,
            options,
            assembler: TreeAssembler::new(registry),
            hooks: HashMap::new(),
            listener: None,
            handler: Box::new(ContinueOnError),
            errors: Vec::new(),
            stats: PassStats::default(),
        }
    }

    /// Set the line listener.
    pub fn with_listener(mut self, listener: impl LineListener + 'a) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Set the pass-wide error handler.
    pub fn with_error_handler(mut self, handler: impl ErrorHandler + 'a) -> Self {
        self.handler = Box::new(handler);
        self
    }

    /// Set the error handler for failures of lines of `type_name`.
    ///
    /// It takes precedence over the pass-wide handler.
    pub fn with_type_error_handler(
        mut self,
        type_name: impl Into<String>,
        handler: impl ErrorHandler + 'a,
    ) -> Self {
        self.hooks.entry(type_name.into()).or_default().handler = Some(Box::new(handler));
        self
    }

    /// Set the line filter of `type_name`.
    ///
    /// The filter sees the raw fields before binding; `false` filters the line.
    pub fn with_filter(
        mut self,
        type_name: impl Into<String>,
        filter: impl Fn(&[String]) -> bool + 'a,
    ) -> Self {
        self.hooks.entry(type_name.into()).or_default().filter = Some(Box::new(filter));
        self
    }

    /// Add a verifier for bound records of `type_name`.
    ///
    /// `Ok(false)` filters the record, `Err(reason)` fails the line.
    pub fn with_verifier(
        mut self,
        type_name: impl Into<String>,
        verifier: impl Fn(&Record) -> Result<bool, String> + 'a,
    ) -> Self {
        self.hooks
            .entry(type_name.into())
            .or_default()
            .verifiers
            .push(Box::new(verifier));
        self
    }

    /// Process one line.
    ///
    /// Failures are recorded in the report and offered to the error handler;
    /// `Err` is returned only when the handler aborts. The pass remains
    /// usable and inspectable either way.
    pub fn process_line(
        &mut self,
        line_number: u64,
        mut fields: Vec<String>,
    ) -> Result<LineOutcome, PassAborted> {
        self.stats.lines += 1;
        if let Some(listener) = self.listener.as_mut() {
            listener.before_line(line_number, &mut fields);
        }

        let outcome = self.run(line_number, &fields);
        let action = match &outcome {
            LineOutcome::Attached { .. } => {
                self.stats.attached += 1;
                ErrorAction::Continue
            }
            LineOutcome::Filtered { .. } => {
                self.stats.filtered += 1;
                ErrorAction::Continue
            }
            LineOutcome::Empty => {
                self.stats.empty += 1;
                ErrorAction::Continue
            }
            LineOutcome::Ignored => ErrorAction::Continue,
            LineOutcome::Failed(err) => {
                self.stats.failed += 1;
                warn!(line = line_number, kind = %err.kind, "{}", err.message);
                self.errors.push(err.clone());
                self.dispatch(err)
            }
        };

        if let Some(listener) = self.listener.as_mut() {
            listener.after_line(line_number, &outcome);
        }

        match (action, outcome) {
            (ErrorAction::Abort, LineOutcome::Failed(error)) => {
                debug!(line = line_number, "pass aborted by error handler");
                Err(PassAborted { error })
            }
            (_, outcome) => Ok(outcome),
        }
    }

    fn run(&mut self, line_number: u64, fields: &[String]) -> LineOutcome {
        if is_empty_line(fields) {
            return LineOutcome::Empty;
        }

        let registry = self.registry;
        let schema = match registry.classify(fields) {
            Classification::Matched(schema) => schema,
            Classification::Unclassified => {
                self.stats.unclassified += 1;
                if self.options.ignore_unknown_types {
                    return LineOutcome::Ignored;
                }
                return LineOutcome::Failed(LineError::unclassified(line_number, fields));
            }
        };
        let type_name = schema.type_name();
        let hooks = self.hooks.get(type_name);

        if let Some(filter) = hooks.and_then(|h| h.filter.as_ref()) {
            if !filter(fields) {
                return LineOutcome::Filtered {
                    type_name: type_name.to_string(),
                };
            }
        }

        let record = match self.binder.bind(schema, fields) {
            Ok(record) => record,
            Err(errors) => {
                return LineOutcome::Failed(LineError::binding_failed(
                    line_number,
                    fields,
                    type_name,
                    errors,
                ))
            }
        };

        for verifier in hooks.map(|h| h.verifiers.as_slice()).unwrap_or_default() {
            match verifier(&record) {
                Ok(true) => {}
                Ok(false) => {
                    return LineOutcome::Filtered {
                        type_name: type_name.to_string(),
                    }
                }
                Err(reason) => {
                    return LineOutcome::Failed(LineError::verification_failed(
                        line_number,
                        fields,
                        type_name,
                        &reason,
                    ))
                }
            }
        }

        match self.assembler.attach(schema, line_number, fields, record) {
            Ok(attached) => LineOutcome::Attached {
                type_name: type_name.to_string(),
                key: attached.key,
            },
            Err(err) => LineOutcome::Failed(err),
        }
    }

    fn dispatch(&mut self, error: &LineError) -> ErrorAction {
        let type_handler = error
            .type_name
            .as_ref()
            .and_then(|t| self.hooks.get_mut(t))
            .and_then(|h| h.handler.as_mut());
        match type_handler {
            Some(handler) => handler.handle(error),
            None => self.handler.handle(error),
        }
    }

    /// Snapshot of the forest built so far.
    pub fn forest(&self) -> Vec<Record> {
        self.assembler.forest()
    }

    /// The assembler of this pass.
    pub fn assembler(&self) -> &TreeAssembler<'a> {
        &self.assembler
    }

    /// Failures recorded so far.
    pub fn errors(&self) -> &[LineError] {
        &self.errors
    }

    pub fn stats(&self) -> PassStats {
        self.stats
    }

    /// End the pass.
    pub fn finish(self) -> ParseOutput {
        debug!(
            lines = self.stats.lines,
            attached = self.stats.attached,
            failed = self.stats.failed,
            "pass finished"
        );
        ParseOutput {
            records: self.assembler.finish(),
            errors: self.errors,
            stats: self.stats,
        }
    }
}

/// A line with no fields, or a single empty field.
fn is_empty_line(fields: &[String]) -> bool {
    match fields {
        [] => true,
        [only] => only.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::PositionalBinder;
    use crate::decl::{FieldDecl, RecordDecl, ScalarType};
    use crate::error::LineErrorKind;
    use crate::value::Value;

    fn s(name: &str) -> FieldDecl {
        FieldDecl::scalar(name, ScalarType::String)
    }

    fn line(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn registry() -> Registry {
        Registry::build(vec![
            RecordDecl::new("User", "U")
                .field(s("id").column(1).key())
                .field(FieldDecl::scalar("age", ScalarType::Int).column(2))
                .field(FieldDecl::child_list("orders", "Order")),
            RecordDecl::new("Order", "O")
                .field(s("user").column(1).parent_key("User", 0))
                .field(s("item").column(2).key()),
        ])
        .unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        after: Vec<(u64, bool, bool)>,
    }

    impl LineListener for Recorder {
        fn before_line(&mut self, _line_number: u64, fields: &mut Vec<String>) {
            if let Some(code) = fields.first_mut() {
                *code = code.to_uppercase();
            }
        }

        fn after_line(&mut self, line_number: u64, outcome: &LineOutcome) {
            self.after
                .push((line_number, outcome.is_filtered(), outcome.is_failed()));
        }
    }

    // ==================== Outcomes ====================

    #[test]
    fn test_attach_and_finish() {
        let registry = registry();
        let mut pass = Pass::new(&registry, PositionalBinder, PassOptions::default());
        let outcome = pass.process_line(1, line(&["U", "1", "30"])).unwrap();
        assert_eq!(
            outcome,
            LineOutcome::Attached {
                type_name: "User".to_string(),
                key: "User(1)".to_string()
            }
        );
        pass.process_line(2, line(&["O", "1", "apple"])).unwrap();

        let output = pass.finish();
        assert!(output.is_clean());
        assert_eq!(output.stats.attached, 2);
        assert_eq!(output.records[0].get("age"), Some(&Value::Int(30)));
        assert_eq!(output.records[0].children("orders").len(), 1);
    }

    #[test]
    fn test_empty_lines() {
        let registry = registry();
        let mut pass = Pass::new(&registry, PositionalBinder, PassOptions::default());
        assert_eq!(pass.process_line(1, vec![]).unwrap(), LineOutcome::Empty);
        assert_eq!(pass.process_line(2, line(&[""])).unwrap(), LineOutcome::Empty);
        assert_eq!(pass.stats().empty, 2);
        assert!(pass.errors().is_empty());
    }

    #[test]
    fn test_unclassified_reported() {
        let registry = registry();
        let mut pass = Pass::new(&registry, PositionalBinder, PassOptions::default());
        let outcome = pass.process_line(1, line(&["X", "1"])).unwrap();
        assert_eq!(
            outcome.error().map(|e| &e.kind),
            Some(&LineErrorKind::Unclassified)
        );
        assert_eq!(pass.errors().len(), 1);
        assert_eq!(pass.stats().unclassified, 1);
        assert_eq!(pass.stats().failed, 1);
    }

    #[test]
    fn test_unclassified_ignored() {
        let registry = registry();
        let options = PassOptions {
            ignore_unknown_types: true,
        };
        let mut pass = Pass::new(&registry, PositionalBinder, options);
        assert_eq!(
            pass.process_line(1, line(&["X", "1"])).unwrap(),
            LineOutcome::Ignored
        );
        assert!(pass.errors().is_empty());
        assert_eq!(pass.stats().unclassified, 1);
        assert_eq!(pass.stats().failed, 0);
    }

    #[test]
    fn test_binding_failure_reported() {
        let registry = registry();
        let mut pass = Pass::new(&registry, PositionalBinder, PassOptions::default());
        let outcome = pass.process_line(1, line(&["U", "1", "old"])).unwrap();
        let err = outcome.error().unwrap();
        assert!(matches!(err.kind, LineErrorKind::BindingFailed(ref e) if e[0].field == "age"));
        assert_eq!(err.type_name.as_deref(), Some("User"));
        assert!(pass.finish().records.is_empty());
    }

    #[test]
    fn test_missing_parent_does_not_stop_pass() {
        let registry = registry();
        let mut pass = Pass::new(&registry, PositionalBinder, PassOptions::default());
        pass.process_line(1, line(&["U", "1"])).unwrap();
        pass.process_line(2, line(&["O", "9", "apple"])).unwrap();
        pass.process_line(3, line(&["O", "1", "pear"])).unwrap();

        let output = pass.finish();
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].kind, LineErrorKind::ParentBeanNotFound);
        assert_eq!(output.errors[0].line_number, 2);
        assert_eq!(output.records[0].children("orders").len(), 1);
    }

    // ==================== Filters and verifiers ====================

    #[test]
    fn test_filter_sees_raw_fields() {
        let registry = registry();
        let mut pass = Pass::new(&registry, PositionalBinder, PassOptions::default())
            .with_filter("Order", |fields: &[String]| {
                fields.get(2).is_some_and(|item| item.starts_with('a'))
            });
        pass.process_line(1, line(&["U", "1"])).unwrap();
        pass.process_line(2, line(&["O", "1", "apple"])).unwrap();
        let outcome = pass.process_line(3, line(&["O", "1", "pear"])).unwrap();
        assert!(outcome.is_filtered());

        let output = pass.finish();
        assert_eq!(output.stats.filtered, 1);
        assert_eq!(output.records[0].children("orders").len(), 1);
    }

    #[test]
    fn test_verifier_filters_and_fails() {
        let registry = registry();
        let mut pass = Pass::new(&registry, PositionalBinder, PassOptions::default())
            .with_verifier("User", |record: &Record| {
                match record.get("age").and_then(Value::as_int) {
                    Some(age) if age < 0 => Err(format!("negative age {}", age)),
                    Some(age) => Ok(age >= 18),
                    None => Ok(true),
                }
            });

        assert!(pass.process_line(1, line(&["U", "1", "10"])).unwrap().is_filtered());
        let failed = pass.process_line(2, line(&["U", "2", "-1"])).unwrap();
        assert_eq!(
            failed.error().map(|e| &e.kind),
            Some(&LineErrorKind::VerificationFailed)
        );
        assert!(matches!(
            pass.process_line(3, line(&["U", "3", "40"])).unwrap(),
            LineOutcome::Attached { .. }
        ));
        assert_eq!(pass.forest().len(), 1);
    }

    // ==================== Listener ====================

    #[test]
    fn test_listener_rewrites_and_observes() {
        let registry = registry();
        let mut recorder = Recorder::default();
        {
            let mut pass = Pass::new(&registry, PositionalBinder, PassOptions::default())
                .with_listener(&mut recorder);
            pass.process_line(1, line(&["u", "1"])).unwrap();
            pass.process_line(2, line(&["x"])).unwrap();
            assert_eq!(pass.forest().len(), 1);
        }
        assert_eq!(recorder.after, vec![(1, false, false), (2, false, true)]);
    }

    // ==================== Error handlers ====================

    #[test]
    fn test_fail_fast_aborts() {
        let registry = registry();
        let mut pass = Pass::new(&registry, PositionalBinder, PassOptions::default())
            .with_error_handler(FailFast);
        pass.process_line(1, line(&["U", "1"])).unwrap();
        let aborted = pass.process_line(2, line(&["O", "9", "x"])).unwrap_err();
        assert_eq!(aborted.error.kind, LineErrorKind::ParentBeanNotFound);

        // Still inspectable after the abort.
        assert_eq!(pass.errors().len(), 1);
        assert_eq!(pass.forest().len(), 1);
    }

    #[test]
    fn test_type_handler_takes_precedence() {
        let registry = registry();
        let mut seen = Vec::new();
        {
            let mut pass = Pass::new(&registry, PositionalBinder, PassOptions::default())
                .with_error_handler(FailFast)
                .with_type_error_handler("Order", |err: &LineError| {
                    seen.push(err.line_number);
                    ErrorAction::Continue
                });
            pass.process_line(1, line(&["O", "9", "x"])).unwrap();
            assert!(pass.process_line(2, line(&["X"])).is_err());
        }
        assert_eq!(seen, vec![1]);
    }

    #[test]
    fn test_is_empty_line() {
        assert!(is_empty_line(&[]));
        assert!(is_empty_line(&line(&[""])));
        assert!(!is_empty_line(&line(&["", ""])));
        assert!(!is_empty_line(&line(&["U"])));
    }
}
