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

//! Declarative record type descriptions.
//!
//! A [`RecordDecl`] is the input of [`Registry::build`](crate::Registry::build):
//! it names a record type, the discriminator that selects it, and the fields
//! the type carries. Field roles (key, child slot, parent key part) are plain
//! data on [`FieldDecl`], so declarations can be written by hand, generated,
//! or deserialized (feature `serde`).
//!
//! # Examples
//!
//! ```
//! use hcsv_core::{FieldDecl, RecordDecl, ScalarType};
//!
//! let user = RecordDecl::new("User", "U")
//!     .field(FieldDecl::scalar("code", ScalarType::String).column(0))
//!     .field(FieldDecl::scalar("id", ScalarType::String).column(1).key())
//!     .field(FieldDecl::child_list("orders", "Order"));
//!
//! let order = RecordDecl::new("Order", "O")
//!     .field(FieldDecl::scalar("user", ScalarType::String).column(1).parent_key("User", 0))
//!     .field(FieldDecl::scalar("item", ScalarType::String).column(2));
//!
//! assert_eq!(user.code_position, 0);
//! assert_eq!(order.fields.len(), 2);
//! ```

/// Scalar column types understood by the positional binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScalarType {
    /// Raw text.
    String,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// `true` / `false`.
    Bool,
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Bool => write!(f, "bool"),
        }
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FieldType {
    /// A scalar column value.
    Scalar(ScalarType),
    /// A nested value of the named type.
    Record(String),
    /// An ordered container of the element type.
    List(Box<FieldType>),
}

impl FieldType {
    /// Container of records of the named type.
    pub fn list_of(type_name: impl Into<String>) -> Self {
        Self::List(Box::new(Self::Record(type_name.into())))
    }

    /// Returns true for container types.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{}", s),
            Self::Record(name) => write!(f, "{}", name),
            Self::List(inner) => write!(f, "list<{}>", inner),
        }
    }
}

/// How a parent hosts children of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ChildKind {
    /// One nested record; a later sibling replaces an earlier one.
    Single,
    /// An ordered collection of records.
    List,
}

/// Marks a field as holding the key of one of the record's parents.
///
/// Parent key parts of one type are concatenated in ascending `order` to
/// build the key under which the direct parent was indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParentKeyPart {
    /// Type name of the parent.
    pub parent: String,
    /// Position of this part in the composite parent key.
    #[cfg_attr(feature = "serde", serde(default))]
    pub order: i32,
}

/// One field of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDecl {
    /// Field name, unique within the type.
    pub name: String,
    /// Declared field type.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub field_type: FieldType,
    /// Column the binder reads this field from.
    #[cfg_attr(feature = "serde", serde(default))]
    pub column: Option<usize>,
    /// The binder rejects lines where this column is missing or empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub required: bool,
    /// This field names the instance among its siblings.
    #[cfg_attr(feature = "serde", serde(default))]
    pub key: bool,
    /// This field holds the key of a parent record.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent_key: Option<ParentKeyPart>,
    /// This field is a child slot.
    #[cfg_attr(feature = "serde", serde(default))]
    pub child: Option<ChildKind>,
    /// Whether a list child slot starts out as an empty list.
    #[cfg_attr(feature = "serde", serde(default = "default_initialized"))]
    pub initialized: bool,
}

#[cfg(feature = "serde")]
fn default_initialized() -> bool {
    true
}

impl FieldDecl {
    /// Create a field with no role.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            column: None,
            required: false,
            key: false,
            parent_key: None,
            child: None,
            initialized: true,
        }
    }

    /// Create a scalar field.
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldType::Scalar(scalar))
    }

    /// Create a single child slot holding a record of `child_type`.
    pub fn child(name: impl Into<String>, child_type: impl Into<String>) -> Self {
        Self::new(name, FieldType::Record(child_type.into())).as_child(ChildKind::Single)
    }

    /// Create a list child slot holding records of `child_type`.
    pub fn child_list(name: impl Into<String>, child_type: impl Into<String>) -> Self {
        Self::new(name, FieldType::list_of(child_type)).as_child(ChildKind::List)
    }

    /// Bind this field to a column.
    pub fn column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Require a non-empty column value.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark this field as the type's key.
    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    /// Mark this field as the key part for `parent` at position `order`.
    pub fn parent_key(mut self, parent: impl Into<String>, order: i32) -> Self {
        self.parent_key = Some(ParentKeyPart {
            parent: parent.into(),
            order,
        });
        self
    }

    /// Give this field a child slot role regardless of its declared type.
    pub fn as_child(mut self, kind: ChildKind) -> Self {
        self.child = Some(kind);
        self
    }

    /// Leave a list child slot unset (`Null`) after binding.
    pub fn uninitialized(mut self) -> Self {
        self.initialized = false;
        self
    }
}

/// Default discriminator column.
pub const DEFAULT_CODE_POSITION: usize = 0;

/// Declaration of one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordDecl {
    /// Type name, used in composite keys and diagnostics.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub type_name: String,
    /// Discriminator value selecting this type.
    pub code: String,
    /// Column holding the discriminator.
    #[cfg_attr(feature = "serde", serde(default))]
    pub code_position: usize,
    /// Fields in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fields: Vec<FieldDecl>,
}

impl RecordDecl {
    /// Create a declaration with the discriminator in the first column.
    pub fn new(type_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            code: code.into(),
            code_position: DEFAULT_CODE_POSITION,
            fields: Vec::new(),
        }
    }

    /// Move the discriminator to another column.
    pub fn at_position(mut self, position: usize) -> Self {
        self.code_position = position;
        self
    }

    /// Append a field.
    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_list_constructor_sets_container_type() {
        let field = FieldDecl::child_list("orders", "Order");
        assert_eq!(field.child, Some(ChildKind::List));
        assert_eq!(field.field_type, FieldType::list_of("Order"));
        assert!(field.initialized);
    }

    #[test]
    fn test_child_constructor_sets_record_type() {
        let field = FieldDecl::child("region", "Region");
        assert_eq!(field.child, Some(ChildKind::Single));
        assert_eq!(field.field_type, FieldType::Record("Region".to_string()));
    }

    #[test]
    fn test_scalar_builder_roles() {
        let field = FieldDecl::scalar("user", ScalarType::String)
            .column(1)
            .required()
            .parent_key("User", 2);
        assert_eq!(field.column, Some(1));
        assert!(field.required);
        assert!(!field.key);
        assert_eq!(
            field.parent_key,
            Some(ParentKeyPart {
                parent: "User".to_string(),
                order: 2
            })
        );
    }

    #[test]
    fn test_record_decl_defaults() {
        let decl = RecordDecl::new("Header", "H");
        assert_eq!(decl.code_position, DEFAULT_CODE_POSITION);
        assert!(decl.fields.is_empty());
        assert_eq!(decl.at_position(3).code_position, 3);
    }

    #[test]
    fn test_get_field() {
        let decl = RecordDecl::new("User", "U")
            .field(FieldDecl::scalar("id", ScalarType::Int).key());
        assert!(decl.get_field("id").is_some_and(|f| f.key));
        assert!(decl.get_field("missing").is_none());
    }

    #[test]
    fn test_field_type_display() {
        assert_eq!(FieldType::Scalar(ScalarType::Int).to_string(), "int");
        assert_eq!(FieldType::list_of("Order").to_string(), "list<Order>");
    }
}
