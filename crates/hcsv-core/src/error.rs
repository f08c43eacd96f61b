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

//! Error types for registry construction and line processing.

use std::fmt;
use thiserror::Error;

/// A misconfiguration detected while building the [`Registry`](crate::Registry).
///
/// Registration errors are fatal: the build fails as a whole and no
/// registry is returned.
///
/// # Examples
///
/// ```
/// use hcsv_core::RegistrationError;
///
/// let err = RegistrationError::DuplicateDiscriminatorCode {
///     code: "U".to_string(),
///     existing: "User".to_string(),
///     duplicate: "Unit".to_string(),
/// };
/// assert_eq!(
///     err.to_string(),
///     "Types 'Unit' and 'User' share the discriminator code 'U'"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The declaration set is empty.
    #[error("No record types declared")]
    NoTypesDeclared,

    /// Two types share a discriminator code.
    #[error("Types '{duplicate}' and '{existing}' share the discriminator code '{code}'")]
    DuplicateDiscriminatorCode {
        /// The shared code.
        code: String,
        /// Type registered first.
        existing: String,
        /// Type rejected.
        duplicate: String,
    },

    /// Two declarations use the same type name.
    #[error("Type '{type_name}' is declared more than once")]
    DuplicateTypeName {
        /// The repeated type name.
        type_name: String,
    },

    /// Two fields of one type share a name.
    #[error("Field '{field}' is declared more than once in type '{type_name}'")]
    DuplicateFieldName {
        /// Owning type.
        type_name: String,
        /// The repeated field name.
        field: String,
    },

    /// More than one field of a type is marked as key.
    #[error("Type '{type_name}' declares more than one key field ('{first}', '{second}')")]
    MultipleKeyFields {
        /// Owning type.
        type_name: String,
        /// First key field.
        first: String,
        /// Second key field.
        second: String,
    },

    /// A type hosts children (or is referenced as a parent) but has no key.
    #[error("Type '{type_name}' is a parent type but declares no key field")]
    ParentHasNoKey {
        /// The keyless parent type.
        type_name: String,
    },

    /// A child slot's (element) type is not a record type.
    #[error("Child field '{field}' of type '{type_name}' is declared as '{declared}', which is not a record type")]
    ChildTypeNotARecord {
        /// Parent type.
        type_name: String,
        /// Child slot field.
        field: String,
        /// Declared field type.
        declared: String,
    },

    /// A child slot names a record type that is not registered.
    #[error("Child field '{field}' of type '{type_name}' refers to unregistered type '{child}'")]
    ChildCodeNotRegistered {
        /// Parent type.
        type_name: String,
        /// Child slot field.
        field: String,
        /// The unknown child type.
        child: String,
    },

    /// A list child slot is not declared as a container.
    #[error("Child list field '{field}' of type '{type_name}' must be a list, found '{declared}'")]
    ChildWrapperNotCollection {
        /// Parent type.
        type_name: String,
        /// Child slot field.
        field: String,
        /// Declared field type.
        declared: String,
    },

    /// The child type has no key part field for this parent.
    #[error("Type '{child}' is declared as a child of '{parent}' but has no parent key field for it")]
    ParentNotReferencedInChild {
        /// Parent type.
        parent: String,
        /// Child type.
        child: String,
    },

    /// The child type has several key part fields for this parent.
    #[error("Type '{child}' declares {count} parent key fields for '{parent}', expected exactly one")]
    ParentReferencedMultipleTimesInChild {
        /// Parent type.
        parent: String,
        /// Child type.
        child: String,
        /// Number of key part fields found.
        count: usize,
    },

    /// Two parents of one child use the same order.
    #[error("Parents '{parent}' and '{existing}' of type '{child}' share the key order {order}")]
    DuplicateParentOrder {
        /// Child type.
        child: String,
        /// Parent being added.
        parent: String,
        /// Parent already holding the order.
        existing: String,
        /// The colliding order.
        order: i32,
    },

    /// A parent key part names a type that is not registered.
    #[error("Field '{field}' of type '{child}' refers to unregistered parent type '{parent}'")]
    ParentCodeNotRegistered {
        /// Child type.
        child: String,
        /// Key part field.
        field: String,
        /// The unknown parent type.
        parent: String,
    },
}

/// Result type for registry construction.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Failure to bind one field of a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field '{}'{}: {}", .field, column_note(.column), .message)]
pub struct FieldError {
    /// Field being bound.
    pub field: String,
    /// Source column, if the field is column-bound.
    pub column: Option<usize>,
    /// What went wrong.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: impl Into<String>, column: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            column,
            message: message.into(),
        }
    }
}

fn column_note(column: &Option<usize>) -> String {
    column.map(|c| format!(" (column {})", c)).unwrap_or_default()
}

/// The kind of a per-line failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineErrorKind {
    /// No registered discriminator matched the line.
    Unclassified,
    /// The binder rejected the line.
    BindingFailed(Vec<FieldError>),
    /// A verifier rejected the bound record.
    VerificationFailed,
    /// No record is indexed under the computed parent key.
    ParentBeanNotFound,
    /// The parent's list slot for this child is unset.
    ChildWrapperNotInitialized,
    /// The resolved parent does not host children of this type.
    NoChildSlot,
}

impl fmt::Display for LineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unclassified => write!(f, "UnclassifiedLine"),
            Self::BindingFailed(_) => write!(f, "BindingFailed"),
            Self::VerificationFailed => write!(f, "VerificationFailed"),
            Self::ParentBeanNotFound => write!(f, "ParentBeanNotFound"),
            Self::ChildWrapperNotInitialized => write!(f, "ChildWrapperNotInitialized"),
            Self::NoChildSlot => write!(f, "NoChildSlot"),
        }
    }
}

/// A failure attached to one input line.
///
/// Line errors are reported through the pass report and the error handler;
/// they do not stop the pass unless the handler asks for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line_number}: {message}")]
pub struct LineError {
    /// The kind of error.
    pub kind: LineErrorKind,
    /// Line number reported by the tokenizer.
    pub line_number: u64,
    /// Raw fields of the line.
    pub raw_line: Vec<String>,
    /// Human-readable error message.
    pub message: String,
    /// Record type of the line, when classification succeeded.
    pub type_name: Option<String>,
}

impl LineError {
    /// Create a new error.
    pub fn new(
        kind: LineErrorKind,
        line_number: u64,
        raw_line: &[String],
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            line_number,
            raw_line: raw_line.to_vec(),
            message: message.into(),
            type_name: None,
        }
    }

    /// Add the record type of the line.
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn unclassified(line_number: u64, raw_line: &[String]) -> Self {
        Self::new(
            LineErrorKind::Unclassified,
            line_number,
            raw_line,
            format!("no record type matches line {}", line_number),
        )
    }

    pub fn binding_failed(
        line_number: u64,
        raw_line: &[String],
        type_name: &str,
        errors: Vec<FieldError>,
    ) -> Self {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self::new(
            LineErrorKind::BindingFailed(errors),
            line_number,
            raw_line,
            format!("cannot bind '{}': {}", type_name, message),
        )
        .with_type(type_name)
    }

    pub fn verification_failed(
        line_number: u64,
        raw_line: &[String],
        type_name: &str,
        reason: &str,
    ) -> Self {
        Self::new(
            LineErrorKind::VerificationFailed,
            line_number,
            raw_line,
            format!("record '{}' rejected: {}", type_name, reason),
        )
        .with_type(type_name)
    }

    pub fn parent_not_found(
        line_number: u64,
        raw_line: &[String],
        type_name: &str,
        local_key: &str,
    ) -> Self {
        Self::new(
            LineErrorKind::ParentBeanNotFound,
            line_number,
            raw_line,
            format!("parent of '{}' with key {} not found", type_name, local_key),
        )
        .with_type(type_name)
    }

    pub fn child_wrapper_not_initialized(
        line_number: u64,
        raw_line: &[String],
        type_name: &str,
        parent_type: &str,
        field: &str,
    ) -> Self {
        Self::new(
            LineErrorKind::ChildWrapperNotInitialized,
            line_number,
            raw_line,
            format!(
                "list field '{}' of parent '{}' is not initialized",
                field, parent_type
            ),
        )
        .with_type(type_name)
    }

    pub fn no_child_slot(
        line_number: u64,
        raw_line: &[String],
        type_name: &str,
        parent_type: &str,
    ) -> Self {
        Self::new(
            LineErrorKind::NoChildSlot,
            line_number,
            raw_line,
            format!(
                "resolved parent '{}' has no child field for '{}'",
                parent_type, type_name
            ),
        )
        .with_type(type_name)
    }

    /// The raw line joined with commas, for diagnostics.
    pub fn raw_text(&self) -> String {
        self.raw_line.join(",")
    }
}
