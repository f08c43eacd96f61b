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

//! Resolved record schemas.

use crate::decl::{ChildKind, FieldDecl, FieldType};
use crate::value::{Record, Value};
use std::collections::{BTreeMap, HashMap};

/// Index of a schema inside its [`Registry`](crate::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    /// Position of the schema in registration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Accessor for one named field of a record, resolved at registry build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    name: String,
    field_type: FieldType,
}

impl FieldRef {
    pub(crate) fn new(decl: &FieldDecl) -> Self {
        Self {
            name: decl.name.clone(),
            field_type: decl.field_type.clone(),
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared field type.
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Read the field from a record.
    pub fn read<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        record.get(&self.name)
    }

    /// Read the field mutably.
    pub fn read_mut<'a>(&self, record: &'a mut Record) -> Option<&'a mut Value> {
        record.get_mut(&self.name)
    }

    /// Overwrite the field.
    pub fn write(&self, record: &mut Record, value: Value) {
        record.set(self.name.clone(), value);
    }

    /// Text form of the field value as used in composite keys.
    ///
    /// A missing field renders as `null`, like an explicit [`Value::Null`].
    pub fn key_text(&self, record: &Record) -> String {
        self.read(record)
            .map(ToString::to_string)
            .unwrap_or_else(|| Value::Null.to_string())
    }
}

/// A child slot a parent type offers to one child type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRelation {
    /// Schema of the hosted child type.
    pub child: SchemaId,
    /// Slot field on the parent.
    pub field: FieldRef,
    /// Single record or list.
    pub slot: ChildKind,
}

/// Everything the classifier, binder and assembler need about one type.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) id: SchemaId,
    pub(crate) type_name: String,
    pub(crate) code: String,
    pub(crate) code_position: usize,
    pub(crate) key_field: Option<FieldRef>,
    pub(crate) fields: Vec<FieldDecl>,
    pub(crate) potential_children: HashMap<String, ChildRelation>,
    pub(crate) ordered_parents: BTreeMap<i32, SchemaId>,
    pub(crate) parent_key_fields: HashMap<String, FieldRef>,
}

impl Schema {
    pub(crate) fn new(id: SchemaId, decl: &crate::decl::RecordDecl) -> Self {
        Self {
            id,
            type_name: decl.type_name.clone(),
            code: decl.code.clone(),
            code_position: decl.code_position,
            key_field: None,
            fields: decl.fields.clone(),
            potential_children: HashMap::new(),
            ordered_parents: BTreeMap::new(),
            parent_key_fields: HashMap::new(),
        }
    }

    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Discriminator value.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Column holding the discriminator.
    pub fn code_position(&self) -> usize {
        self.code_position
    }

    pub fn key_field(&self) -> Option<&FieldRef> {
        self.key_field.as_ref()
    }

    /// Field declarations in declaration order.
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    /// Child slot for the child type with discriminator `code`.
    pub fn child_relation(&self, code: &str) -> Option<&ChildRelation> {
        self.potential_children.get(code)
    }

    /// All child slots, keyed by child discriminator.
    pub fn potential_children(&self) -> &HashMap<String, ChildRelation> {
        &self.potential_children
    }

    /// Parents in ascending key order.
    pub fn ordered_parents(&self) -> impl Iterator<Item = (i32, SchemaId)> + '_ {
        self.ordered_parents.iter().map(|(order, id)| (*order, *id))
    }

    /// Returns true if the type declares at least one parent.
    pub fn has_parents(&self) -> bool {
        !self.ordered_parents.is_empty()
    }

    /// Field on this type holding the key of the parent with discriminator `parent_code`.
    pub fn parent_key_field(&self, parent_code: &str) -> Option<&FieldRef> {
        self.parent_key_fields.get(parent_code)
    }

    /// Key segment `Type(value)` for a record of this type.
    ///
    /// Returns `None` when the type has no key field.
    pub fn key_segment(&self, record: &Record) -> Option<String> {
        self.key_field
            .as_ref()
            .map(|key| segment(&self.type_name, &key.key_text(record)))
    }
}

/// Format one composite key segment.
pub(crate) fn segment(type_name: &str, value: &str) -> String {
    format!("{}({})", type_name, value)
}
