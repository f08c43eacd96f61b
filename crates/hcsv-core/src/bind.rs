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

//! Turning classified lines into records.

use crate::decl::{ChildKind, FieldDecl, FieldType, ScalarType};
use crate::error::FieldError;
use crate::schema::Schema;
use crate::value::{Record, Value};

/// Builds a [`Record`] from the raw fields of a classified line.
///
/// Implementations may do arbitrary work per line; the pass only consumes
/// the finished result. Closures with the matching signature implement
/// this trait.
pub trait RecordBinder {
    /// Bind `fields` as an instance of `schema`.
    fn bind(&self, schema: &Schema, fields: &[String]) -> Result<Record, Vec<FieldError>>;
}

impl<F> RecordBinder for F
where
    F: Fn(&Schema, &[String]) -> Result<Record, Vec<FieldError>>,
{
    fn bind(&self, schema: &Schema, fields: &[String]) -> Result<Record, Vec<FieldError>> {
        self(schema, fields)
    }
}

/// Binder reading scalar fields from their declared columns.
///
/// - Empty text binds as [`Value::Null`].
/// - `required` fields must be present and non-empty.
/// - List child slots start as an empty list unless declared uninitialized;
///   single child slots start as `Null`.
/// - Fields without a column and without a child role are left out.
///
/// All field failures of a line are collected before returning.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalBinder;

impl PositionalBinder {
    pub fn new() -> Self {
        Self
    }
}

impl RecordBinder for PositionalBinder {
    fn bind(&self, schema: &Schema, fields: &[String]) -> Result<Record, Vec<FieldError>> {
        let mut record = Record::new(schema.type_name());
        let mut errors = Vec::new();

        for decl in schema.fields() {
            if let Some(kind) = decl.child {
                record.set(decl.name.clone(), empty_slot(decl, kind));
                continue;
            }
            let Some(column) = decl.column else {
                continue;
            };

            match bind_column(decl, column, fields.get(column).map(String::as_str)) {
                Ok(value) => {
                    record.set(decl.name.clone(), value);
                }
                Err(err) => errors.push(err),
            }
        }

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }
}

fn empty_slot(decl: &FieldDecl, kind: ChildKind) -> Value {
    match kind {
        ChildKind::List if decl.initialized => Value::List(Vec::new()),
        _ => Value::Null,
    }
}

fn bind_column(decl: &FieldDecl, column: usize, text: Option<&str>) -> Result<Value, FieldError> {
    let text = match text {
        Some(t) if !t.is_empty() => t,
        _ if decl.required => {
            return Err(FieldError::new(
                &decl.name,
                Some(column),
                "required value missing",
            ))
        }
        _ => return Ok(Value::Null),
    };

    let scalar = match &decl.field_type {
        FieldType::Scalar(scalar) => *scalar,
        other => {
            return Err(FieldError::new(
                &decl.name,
                Some(column),
                format!("cannot bind column text to '{}'", other),
            ))
        }
    };

    coerce(text, scalar).ok_or_else(|| {
        FieldError::new(
            &decl.name,
            Some(column),
            format!("expected {}, got '{}'", scalar, text),
        )
    })
}

/// Convert column text to a scalar value.
pub fn coerce(text: &str, scalar: ScalarType) -> Option<Value> {
    match scalar {
        ScalarType::String => Some(Value::String(text.to_string())),
        ScalarType::Int => text.trim().parse::<i64>().ok().map(Value::Int),
        ScalarType::Float => text.trim().parse::<f64>().ok().map(Value::Float),
        ScalarType::Bool => match text.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::RecordDecl;
    use crate::registry::Registry;

    fn line(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn registry() -> Registry {
        Registry::build(vec![
            RecordDecl::new("User", "U")
                .field(FieldDecl::scalar("id", ScalarType::String).column(1).key().required())
                .field(FieldDecl::scalar("age", ScalarType::Int).column(2))
                .field(FieldDecl::scalar("score", ScalarType::Float).column(3))
                .field(FieldDecl::scalar("active", ScalarType::Bool).column(4))
                .field(FieldDecl::child_list("orders", "Order"))
                .field(FieldDecl::child_list("notes", "Note").uninitialized())
                .field(FieldDecl::child("profile", "Profile")),
            RecordDecl::new("Order", "O")
                .field(FieldDecl::scalar("user", ScalarType::String).column(1).parent_key("User", 0)),
            RecordDecl::new("Note", "N")
                .field(FieldDecl::scalar("user", ScalarType::String).column(1).parent_key("User", 0)),
            RecordDecl::new("Profile", "P")
                .field(FieldDecl::scalar("user", ScalarType::String).column(1).parent_key("User", 0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_bind_scalars() {
        let registry = registry();
        let user = registry.by_type("User").unwrap();
        let record = PositionalBinder
            .bind(user, &line(&["U", "1", "30", "2.5", "true"]))
            .unwrap();

        assert_eq!(record.type_name, "User");
        assert_eq!(record.get("id"), Some(&Value::from("1")));
        assert_eq!(record.get("age"), Some(&Value::Int(30)));
        assert_eq!(record.get("score"), Some(&Value::Float(2.5)));
        assert_eq!(record.get("active"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_child_slots_start_empty() {
        let registry = registry();
        let user = registry.by_type("User").unwrap();
        let record = PositionalBinder.bind(user, &line(&["U", "1"])).unwrap();

        assert_eq!(record.get("orders"), Some(&Value::List(vec![])));
        assert_eq!(record.get("notes"), Some(&Value::Null));
        assert_eq!(record.get("profile"), Some(&Value::Null));
    }

    #[test]
    fn test_missing_and_empty_columns_are_null() {
        let registry = registry();
        let user = registry.by_type("User").unwrap();
        let record = PositionalBinder.bind(user, &line(&["U", "1", ""])).unwrap();
        assert_eq!(record.get("age"), Some(&Value::Null));
        assert_eq!(record.get("active"), Some(&Value::Null));
    }

    #[test]
    fn test_errors_are_collected() {
        let registry = registry();
        let user = registry.by_type("User").unwrap();
        let errors = PositionalBinder
            .bind(user, &line(&["U", "", "old", "1.0", "yes"]))
            .unwrap_err();

        let names: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(names, vec!["id", "age", "active"]);
        assert_eq!(errors[1].column, Some(2));
        assert_eq!(errors[1].message, "expected int, got 'old'");
    }

    #[test]
    fn test_closure_binder() {
        let registry = registry();
        let user = registry.by_type("User").unwrap();
        let binder = |schema: &Schema, fields: &[String]| -> Result<Record, Vec<FieldError>> {
            Ok(Record::new(schema.type_name()).with("raw", fields.join("|")))
        };
        let record = binder.bind(user, &line(&["U", "7"])).unwrap();
        assert_eq!(record.get("raw"), Some(&Value::from("U|7")));
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce(" 42 ", ScalarType::Int), Some(Value::Int(42)));
        assert_eq!(coerce("x", ScalarType::Int), None);
        assert_eq!(coerce("1e3", ScalarType::Float), Some(Value::Float(1000.0)));
        assert_eq!(coerce("false", ScalarType::Bool), Some(Value::Bool(false)));
        assert_eq!(coerce(" a ", ScalarType::String), Some(Value::from(" a ")));
    }
}
