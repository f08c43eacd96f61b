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

//! Schema registry and line classification.
//!
//! The registry is built once from a set of [`RecordDecl`]s and is
//! immutable afterwards. Building runs four stages in order:
//!
//! 1. collect the types and index them by code, type name and code position,
//! 2. resolve key fields,
//! 3. resolve child relations declared by parent types, linking both sides,
//! 4. resolve parent key parts whose parent type never declared the child.
//!
//! Any failure aborts the build; no partially built registry is returned.

use crate::decl::{ChildKind, FieldDecl, FieldType, RecordDecl};
use crate::error::{RegistrationError, RegistrationResult};
use crate::schema::{ChildRelation, FieldRef, Schema, SchemaId};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Result of classifying one line.
#[derive(Debug, Clone, Copy)]
pub enum Classification<'r> {
    /// The line belongs to this schema.
    Matched(&'r Schema),
    /// No discriminator matched.
    Unclassified,
}

impl<'r> Classification<'r> {
    /// The matched schema, if any.
    pub fn schema(self) -> Option<&'r Schema> {
        match self {
            Self::Matched(schema) => Some(schema),
            Self::Unclassified => None,
        }
    }
}

/// Validated, indexed set of record schemas.
///
/// # Examples
///
/// ```
/// use hcsv_core::{FieldDecl, RecordDecl, Registry, ScalarType};
///
/// let registry = Registry::build(vec![
///     RecordDecl::new("Header", "H"),
///     RecordDecl::new("User", "U")
///         .field(FieldDecl::scalar("id", ScalarType::String).column(1).key()),
/// ])?;
///
/// let line = vec!["U".to_string(), "1".to_string()];
/// let schema = registry.classify(&line).schema().unwrap();
/// assert_eq!(schema.type_name(), "User");
/// # Ok::<(), hcsv_core::RegistrationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Registry {
    schemas: Vec<Schema>,
    by_code: HashMap<String, SchemaId>,
    by_type: HashMap<String, SchemaId>,
    by_position: BTreeMap<usize, Vec<SchemaId>>,
}

impl Registry {
    /// Build and validate a registry.
    pub fn build<I>(decls: I) -> RegistrationResult<Self>
    where
        I: IntoIterator<Item = RecordDecl>,
    {
        let decls: Vec<RecordDecl> = decls.into_iter().collect();
        let mut registry = Self::collect(&decls)?;
        registry.resolve_keys()?;
        registry.resolve_children()?;
        registry.resolve_indirect_parents()?;

        debug!(
            types = registry.schemas.len(),
            positions = registry.by_position.len(),
            "schema registry built"
        );
        Ok(registry)
    }

    // ==================== Stage 1: collect ====================

    fn collect(decls: &[RecordDecl]) -> RegistrationResult<Self> {
        if decls.is_empty() {
            return Err(RegistrationError::NoTypesDeclared);
        }

        let mut registry = Self {
            schemas: Vec::with_capacity(decls.len()),
            by_code: HashMap::new(),
            by_type: HashMap::new(),
            by_position: BTreeMap::new(),
        };

        for decl in decls {
            if registry.by_type.contains_key(&decl.type_name) {
                return Err(RegistrationError::DuplicateTypeName {
                    type_name: decl.type_name.clone(),
                });
            }
            if let Some(existing) = registry.by_code.get(&decl.code) {
                return Err(RegistrationError::DuplicateDiscriminatorCode {
                    code: decl.code.clone(),
                    existing: registry.schemas[existing.0].type_name.clone(),
                    duplicate: decl.type_name.clone(),
                });
            }
            check_field_names(decl)?;

            let id = SchemaId(registry.schemas.len());
            registry.schemas.push(Schema::new(id, decl));
            registry.by_code.insert(decl.code.clone(), id);
            registry.by_type.insert(decl.type_name.clone(), id);
            registry
                .by_position
                .entry(decl.code_position)
                .or_default()
                .push(id);
        }

        Ok(registry)
    }

    // ==================== Stage 2: key fields ====================

    fn resolve_keys(&mut self) -> RegistrationResult<()> {
        for schema in &mut self.schemas {
            let mut keys = schema.fields.iter().filter(|f| f.key);
            let first = keys.next();
            if let (Some(first), Some(second)) = (first, keys.next()) {
                return Err(RegistrationError::MultipleKeyFields {
                    type_name: schema.type_name.clone(),
                    first: first.name.clone(),
                    second: second.name.clone(),
                });
            }
            schema.key_field = first.map(FieldRef::new);
        }
        Ok(())
    }

    // ==================== Stage 3: child relations ====================

    fn resolve_children(&mut self) -> RegistrationResult<()> {
        for parent_index in 0..self.schemas.len() {
            let slots: Vec<(FieldDecl, ChildKind)> = self.schemas[parent_index]
                .fields
                .iter()
                .filter_map(|f| f.child.map(|kind| (f.clone(), kind)))
                .collect();

            for (field, kind) in slots {
                let parent_id = SchemaId(parent_index);
                let child_id = self.child_type_of(parent_id, &field, kind)?;
                self.link(parent_id, child_id, &field, kind)?;
            }
        }
        Ok(())
    }

    /// Validate a child slot and resolve the hosted type.
    fn child_type_of(
        &self,
        parent: SchemaId,
        field: &FieldDecl,
        kind: ChildKind,
    ) -> RegistrationResult<SchemaId> {
        let parent = &self.schemas[parent.0];
        if parent.key_field.is_none() {
            return Err(RegistrationError::ParentHasNoKey {
                type_name: parent.type_name.clone(),
            });
        }

        let not_a_record = || RegistrationError::ChildTypeNotARecord {
            type_name: parent.type_name.clone(),
            field: field.name.clone(),
            declared: field.field_type.to_string(),
        };

        let child_type = match (kind, &field.field_type) {
            (ChildKind::Single, FieldType::Record(name)) => name,
            (ChildKind::Single, _) => return Err(not_a_record()),
            (ChildKind::List, FieldType::List(inner)) => match inner.as_ref() {
                FieldType::Record(name) => name,
                _ => return Err(not_a_record()),
            },
            (ChildKind::List, other) => {
                return Err(RegistrationError::ChildWrapperNotCollection {
                    type_name: parent.type_name.clone(),
                    field: field.name.clone(),
                    declared: other.to_string(),
                })
            }
        };

        self.by_type
            .get(child_type)
            .copied()
            .ok_or_else(|| RegistrationError::ChildCodeNotRegistered {
                type_name: parent.type_name.clone(),
                field: field.name.clone(),
                child: child_type.clone(),
            })
    }

    /// Record the relation on both the parent and the child.
    fn link(
        &mut self,
        parent_id: SchemaId,
        child_id: SchemaId,
        field: &FieldDecl,
        kind: ChildKind,
    ) -> RegistrationResult<()> {
        let parent_type = self.schemas[parent_id.0].type_name.clone();
        let parent_code = self.schemas[parent_id.0].code.clone();
        let child = &self.schemas[child_id.0];

        let parts: Vec<&FieldDecl> = child
            .fields
            .iter()
            .filter(|f| {
                f.parent_key
                    .as_ref()
                    .is_some_and(|part| part.parent == parent_type)
            })
            .collect();

        let part = match parts.as_slice() {
            [] => {
                return Err(RegistrationError::ParentNotReferencedInChild {
                    parent: parent_type,
                    child: child.type_name.clone(),
                })
            }
            [single] => *single,
            _ => {
                return Err(RegistrationError::ParentReferencedMultipleTimesInChild {
                    parent: parent_type,
                    child: child.type_name.clone(),
                    count: parts.len(),
                })
            }
        };
        let order = part.parent_key.as_ref().map(|p| p.order).unwrap_or_default();
        let part_ref = FieldRef::new(part);

        if let Some(existing) = child.ordered_parents.get(&order) {
            return Err(RegistrationError::DuplicateParentOrder {
                child: child.type_name.clone(),
                parent: parent_type,
                existing: self.schemas[existing.0].type_name.clone(),
                order,
            });
        }
        let child_code = child.code.clone();

        let child = &mut self.schemas[child_id.0];
        child.ordered_parents.insert(order, parent_id);
        child.parent_key_fields.insert(parent_code, part_ref);

        self.schemas[parent_id.0].potential_children.insert(
            child_code,
            ChildRelation {
                child: child_id,
                field: FieldRef::new(field),
                slot: kind,
            },
        );
        Ok(())
    }

    // ==================== Stage 4: indirect parents ====================

    fn resolve_indirect_parents(&mut self) -> RegistrationResult<()> {
        for child_index in 0..self.schemas.len() {
            let parts: Vec<FieldDecl> = self.schemas[child_index]
                .fields
                .iter()
                .filter(|f| f.parent_key.is_some())
                .cloned()
                .collect();

            for part in parts {
                let Some(key_part) = part.parent_key.as_ref() else {
                    continue;
                };
                let child = &self.schemas[child_index];
                let parent_id = self.by_type.get(&key_part.parent).copied().ok_or_else(|| {
                    RegistrationError::ParentCodeNotRegistered {
                        child: child.type_name.clone(),
                        field: part.name.clone(),
                        parent: key_part.parent.clone(),
                    }
                })?;
                let parent = &self.schemas[parent_id.0];

                match child.parent_key_fields.get(&parent.code) {
                    // Linked in stage 3 through this very field.
                    Some(linked) if linked.name() == part.name => continue,
                    Some(_) => {
                        let count = child
                            .fields
                            .iter()
                            .filter(|f| {
                                f.parent_key
                                    .as_ref()
                                    .is_some_and(|p| p.parent == parent.type_name)
                            })
                            .count();
                        return Err(RegistrationError::ParentReferencedMultipleTimesInChild {
                            parent: parent.type_name.clone(),
                            child: child.type_name.clone(),
                            count,
                        });
                    }
                    None => {}
                }

                if parent.key_field.is_none() {
                    return Err(RegistrationError::ParentHasNoKey {
                        type_name: parent.type_name.clone(),
                    });
                }
                if let Some(existing) = child.ordered_parents.get(&key_part.order) {
                    return Err(RegistrationError::DuplicateParentOrder {
                        child: child.type_name.clone(),
                        parent: parent.type_name.clone(),
                        existing: self.schemas[existing.0].type_name.clone(),
                        order: key_part.order,
                    });
                }

                debug!(
                    child = %child.type_name,
                    parent = %parent.type_name,
                    order = key_part.order,
                    "linked indirect parent"
                );
                let parent_code = parent.code.clone();
                let child = &mut self.schemas[child_index];
                child.ordered_parents.insert(key_part.order, parent_id);
                child.parent_key_fields.insert(parent_code, FieldRef::new(&part));
            }
        }
        Ok(())
    }

    // ==================== Queries ====================

    /// Classify a tokenized line.
    ///
    /// Positions are walked in ascending order and the walk stops at the
    /// first position past the end of the line. Within a position the
    /// first schema (in registration order) whose code equals the column
    /// wins.
    pub fn classify(&self, line: &[String]) -> Classification<'_> {
        for (&position, candidates) in &self.by_position {
            let Some(column) = line.get(position) else {
                break;
            };
            if let Some(id) = candidates
                .iter()
                .find(|id| self.schemas[id.0].code == *column)
            {
                return Classification::Matched(&self.schemas[id.0]);
            }
        }
        Classification::Unclassified
    }

    /// Schema by discriminator code.
    pub fn by_code(&self, code: &str) -> Option<&Schema> {
        self.by_code.get(code).map(|id| &self.schemas[id.0])
    }

    /// Schema by type name.
    pub fn by_type(&self, type_name: &str) -> Option<&Schema> {
        self.by_type.get(type_name).map(|id| &self.schemas[id.0])
    }

    /// Schema by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` comes from another registry with more schemas.
    pub fn schema(&self, id: SchemaId) -> &Schema {
        &self.schemas[id.0]
    }

    /// All schemas in registration order.
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.iter()
    }

    /// Code position to candidate schemas, in ascending position order.
    pub fn classification_table(&self) -> impl Iterator<Item = (usize, Vec<&Schema>)> {
        self.by_position.iter().map(|(position, ids)| {
            (
                *position,
                ids.iter().map(|id| &self.schemas[id.0]).collect(),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn check_field_names(decl: &RecordDecl) -> RegistrationResult<()> {
    let mut seen = std::collections::HashSet::new();
    for field in &decl.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(RegistrationError::DuplicateFieldName {
                type_name: decl.type_name.clone(),
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}
