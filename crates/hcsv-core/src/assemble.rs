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

//! Streaming tree assembly.
//!
//! The [`TreeAssembler`] owns every attached record in an arena. Child
//! placement is kept as links between arena slots, and the runtime key
//! index maps composite keys to arena slots without owning anything.
//! Records are materialized into nested [`Value::Record`] / [`Value::List`]
//! values only when the forest is requested.
//!
//! Composite keys join `Type(value)` segments with `.`: a record without
//! parents is stored under `Type(key)`, a record with parents under
//! `Parent0(v0).Parent1(v1).Type(key)`, with one segment per declared
//! parent in ascending order.

use crate::decl::ChildKind;
use crate::error::LineError;
use crate::registry::Registry;
use crate::schema::{segment, Schema, SchemaId};
use crate::value::{Record, Value};
use std::collections::{BTreeMap, HashMap};

/// Handle of a record attached to a [`TreeAssembler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Where an attached record ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Appended to the forest.
    Root,
    /// Appended to a list slot of `parent`.
    Appended {
        parent: NodeId,
    },
    /// Stored in a single slot of `parent`, replacing `previous` if set.
    Replaced {
        parent: NodeId,
        previous: Option<NodeId>,
    },
}

/// Result of a successful attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachOutcome {
    /// Handle of the attached record.
    pub node: NodeId,
    /// Composite key the record is indexed under.
    pub key: String,
    pub placement: Placement,
}

#[derive(Debug, Clone)]
enum Links {
    Single(NodeId),
    List(Vec<NodeId>),
}

#[derive(Debug, Clone)]
struct Entry {
    schema: SchemaId,
    record: Record,
    /// Child links by slot field name.
    links: BTreeMap<String, Links>,
}

/// Per-pass forest builder.
///
/// Lines must be attached in input order: a child is found through the key
/// its parent was indexed under, so the parent has to be attached first.
#[derive(Debug, Clone)]
pub struct TreeAssembler<'r> {
    registry: &'r Registry,
    arena: Vec<Entry>,
    key_index: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
}

impl<'r> TreeAssembler<'r> {
    /// Create an empty assembler for one pass.
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            arena: Vec::new(),
            key_index: HashMap::new(),
            roots: Vec::new(),
        }
    }

    /// Attach a bound record of type `schema`.
    ///
    /// On failure the record is dropped and the assembler is unchanged.
    pub fn attach(
        &mut self,
        schema: &Schema,
        line_number: u64,
        raw_line: &[String],
        record: Record,
    ) -> Result<AttachOutcome, LineError> {
        let local_key = schema
            .key_segment(&record)
            .unwrap_or_else(|| segment(schema.type_name(), &uuid::Uuid::new_v4().to_string()));

        if !schema.has_parents() {
            let node = self.push(schema.id(), record);
            self.roots.push(node);
            return Ok(self.index(local_key, node, Placement::Root));
        }

        let parent_key = self.parent_key(schema, &record);
        let Some(&parent) = self.key_index.get(&parent_key) else {
            return Err(LineError::parent_not_found(
                line_number,
                raw_line,
                schema.type_name(),
                &local_key,
            ));
        };

        let registry = self.registry;
        let parent_schema = registry.schema(self.arena[parent.0].schema);
        let Some(relation) = parent_schema.child_relation(schema.code()) else {
            return Err(LineError::no_child_slot(
                line_number,
                raw_line,
                schema.type_name(),
                parent_schema.type_name(),
            ));
        };
        let slot = relation.field.name().to_string();

        let (node, placement) = match relation.slot {
            ChildKind::List => {
                let initialized = matches!(
                    relation.field.read(&self.arena[parent.0].record),
                    Some(Value::List(_))
                );
                if !initialized {
                    return Err(LineError::child_wrapper_not_initialized(
                        line_number,
                        raw_line,
                        schema.type_name(),
                        parent_schema.type_name(),
                        &slot,
                    ));
                }
                let node = self.push(schema.id(), record);
                if let Links::List(children) = self.arena[parent.0]
                    .links
                    .entry(slot)
                    .or_insert_with(|| Links::List(Vec::new()))
                {
                    children.push(node);
                }
                (node, Placement::Appended { parent })
            }
            ChildKind::Single => {
                let node = self.push(schema.id(), record);
                let previous = match self.arena[parent.0].links.insert(slot, Links::Single(node)) {
                    Some(Links::Single(previous)) => Some(previous),
                    _ => None,
                };
                (node, Placement::Replaced { parent, previous })
            }
        };

        Ok(self.index(format!("{}.{}", parent_key, local_key), node, placement))
    }

    fn parent_key(&self, schema: &Schema, record: &Record) -> String {
        schema
            .ordered_parents()
            .map(|(_, id)| {
                let parent = self.registry.schema(id);
                let value = schema
                    .parent_key_field(parent.code())
                    .map(|field| field.key_text(record))
                    .unwrap_or_else(|| Value::Null.to_string());
                segment(parent.type_name(), &value)
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    fn push(&mut self, schema: SchemaId, record: Record) -> NodeId {
        let node = NodeId(self.arena.len());
        self.arena.push(Entry {
            schema,
            record,
            links: BTreeMap::new(),
        });
        node
    }

    fn index(&mut self, key: String, node: NodeId, placement: Placement) -> AttachOutcome {
        self.key_index.insert(key.clone(), node);
        AttachOutcome {
            node,
            key,
            placement,
        }
    }

    /// Returns true until the first record is attached.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of attached records, including ones orphaned by a single-slot overwrite.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Number of top-level records.
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Look up an attached record by composite key, without its children.
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.key_index.get(key).map(|node| &self.arena[node.0].record)
    }

    /// Returns true if a record is indexed under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.key_index.contains_key(key)
    }

    /// Iterate over all composite keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.key_index.keys().map(String::as_str)
    }

    /// Snapshot of the forest built so far.
    pub fn forest(&self) -> Vec<Record> {
        self.roots.iter().map(|&root| self.snapshot(root)).collect()
    }

    /// End the pass and return the forest.
    pub fn finish(mut self) -> Vec<Record> {
        let roots = std::mem::take(&mut self.roots);
        roots.into_iter().map(|root| self.take(root)).collect()
    }

    fn snapshot(&self, node: NodeId) -> Record {
        let entry = &self.arena[node.0];
        let mut record = entry.record.clone();
        for (slot, links) in &entry.links {
            match links {
                Links::Single(child) => {
                    record.set(slot.clone(), Value::from(self.snapshot(*child)));
                }
                Links::List(children) => {
                    if let Some(Value::List(items)) = record.get_mut(slot) {
                        items.extend(children.iter().map(|&child| self.snapshot(child)));
                    }
                }
            }
        }
        record
    }

    fn take(&mut self, node: NodeId) -> Record {
        let links = std::mem::take(&mut self.arena[node.0].links);
        let mut record = std::mem::take(&mut self.arena[node.0].record);
        for (slot, links) in links {
            match links {
                Links::Single(child) => {
                    let child = self.take(child);
                    record.set(slot, Value::from(child));
                }
                Links::List(children) => {
                    let children: Vec<Record> =
                        children.into_iter().map(|child| self.take(child)).collect();
                    if let Some(Value::List(items)) = record.get_mut(&slot) {
                        items.extend(children);
                    }
                }
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{FieldDecl, RecordDecl, ScalarType};
    use crate::error::LineErrorKind;

    fn s(name: &str) -> FieldDecl {
        FieldDecl::scalar(name, ScalarType::String)
    }

    fn registry() -> Registry {
        Registry::build(vec![
            RecordDecl::new("Header", "H").field(s("date")),
            RecordDecl::new("User", "U")
                .field(s("id").key())
                .field(FieldDecl::child_list("orders", "Order"))
                .field(FieldDecl::child("profile", "Profile")),
            RecordDecl::new("Order", "O")
                .field(s("user").parent_key("User", 0))
                .field(s("item").key()),
            RecordDecl::new("Profile", "P")
                .field(s("user").parent_key("User", 0))
                .field(s("nick").key()),
        ])
        .unwrap()
    }

    fn user(id: &str) -> Record {
        Record::new("User")
            .with("id", id)
            .with("orders", Value::List(vec![]))
            .with("profile", Value::Null)
    }

    fn order(user: &str, item: &str) -> Record {
        Record::new("Order").with("user", user).with("item", item)
    }

    fn attach(
        asm: &mut TreeAssembler<'_>,
        registry: &Registry,
        line: u64,
        record: Record,
    ) -> Result<AttachOutcome, LineError> {
        let schema = registry.by_type(&record.type_name).unwrap();
        asm.attach(schema, line, &[], record)
    }

    #[test]
    fn test_roots_keep_input_order() {
        let registry = registry();
        let mut asm = TreeAssembler::new(&registry);
        assert!(asm.is_empty());

        attach(&mut asm, &registry, 1, Record::new("Header").with("date", "d")).unwrap();
        attach(&mut asm, &registry, 2, user("1")).unwrap();
        attach(&mut asm, &registry, 3, user("2")).unwrap();

        let forest = asm.forest();
        let types: Vec<&str> = forest.iter().map(|r| r.type_name.as_str()).collect();
        assert_eq!(types, vec!["Header", "User", "User"]);
        assert_eq!(forest[2].get("id"), Some(&Value::from("2")));
    }

    #[test]
    fn test_keys_are_composite() {
        let registry = registry();
        let mut asm = TreeAssembler::new(&registry);
        let outcome = attach(&mut asm, &registry, 1, user("1")).unwrap();
        assert_eq!(outcome.key, "User(1)");
        assert_eq!(outcome.placement, Placement::Root);

        let outcome = attach(&mut asm, &registry, 2, order("1", "apple")).unwrap();
        assert_eq!(outcome.key, "User(1).Order(apple)");
        assert!(matches!(outcome.placement, Placement::Appended { .. }));
        assert!(asm.contains_key("User(1).Order(apple)"));
    }

    #[test]
    fn test_keyless_root_gets_unique_key() {
        let registry = registry();
        let mut asm = TreeAssembler::new(&registry);
        let a = attach(&mut asm, &registry, 1, Record::new("Header")).unwrap();
        let b = attach(&mut asm, &registry, 2, Record::new("Header")).unwrap();
        assert!(a.key.starts_with("Header("));
        assert_ne!(a.key, b.key);
        assert_eq!(asm.root_count(), 2);
    }

    #[test]
    fn test_children_appended_in_order() {
        let registry = registry();
        let mut asm = TreeAssembler::new(&registry);
        attach(&mut asm, &registry, 1, user("1")).unwrap();
        attach(&mut asm, &registry, 2, order("1", "apple")).unwrap();
        attach(&mut asm, &registry, 3, order("1", "pear")).unwrap();

        let forest = asm.finish();
        assert_eq!(forest.len(), 1);
        let items: Vec<&Value> = forest[0]
            .children("orders")
            .iter()
            .filter_map(|o| o.get("item"))
            .collect();
        assert_eq!(items, vec![&Value::from("apple"), &Value::from("pear")]);
    }

    #[test]
    fn test_parent_not_found_leaves_state_unchanged() {
        let registry = registry();
        let mut asm = TreeAssembler::new(&registry);
        attach(&mut asm, &registry, 1, user("1")).unwrap();

        let raw = vec!["O".to_string(), "9".to_string(), "apple".to_string()];
        let schema = registry.by_type("Order").unwrap();
        let err = asm.attach(schema, 2, &raw, order("9", "apple")).unwrap_err();
        assert_eq!(err.kind, LineErrorKind::ParentBeanNotFound);
        assert_eq!(err.line_number, 2);
        assert_eq!(err.raw_line, raw);
        assert!(err.message.contains("Order(apple)"));
        assert_eq!(asm.len(), 1);
        assert!(asm.forest()[0].children("orders").is_empty());
    }

    #[test]
    fn test_uninitialized_list_is_an_error() {
        let registry = registry();
        let mut asm = TreeAssembler::new(&registry);
        attach(&mut asm, &registry, 1, user("1").with("orders", Value::Null)).unwrap();
        let err = attach(&mut asm, &registry, 2, order("1", "apple")).unwrap_err();
        assert_eq!(err.kind, LineErrorKind::ChildWrapperNotInitialized);
        assert_eq!(asm.len(), 1);
    }

    #[test]
    fn test_parent_without_slot_is_no_child_slot() {
        // Note names User as its parent, but User declares no field for notes.
        let registry = Registry::build(vec![
            RecordDecl::new("User", "U").field(s("id").column(1).key()),
            RecordDecl::new("Note", "N").field(s("user").column(1).parent_key("User", 0)),
        ])
        .unwrap();
        let mut asm = TreeAssembler::new(&registry);
        attach(&mut asm, &registry, 1, Record::new("User").with("id", "1")).unwrap();
        let keys_before: Vec<String> = asm.keys().map(String::from).collect();

        let raw = vec!["N".to_string(), "1".to_string()];
        let schema = registry.by_type("Note").unwrap();
        let err = asm
            .attach(schema, 2, &raw, Record::new("Note").with("user", "1"))
            .unwrap_err();

        assert_eq!(err.kind, LineErrorKind::NoChildSlot);
        assert_eq!(err.line_number, 2);
        assert_eq!(err.type_name.as_deref(), Some("Note"));
        assert!(err.message.contains("'User'"));
        assert_eq!(asm.len(), 1);
        assert_eq!(asm.root_count(), 1);
        let keys_after: Vec<String> = asm.keys().map(String::from).collect();
        assert_eq!(keys_after, keys_before);
        assert_eq!(keys_after, vec!["User(1)".to_string()]);
    }

    #[test]
    fn test_single_slot_last_write_wins() {
        let registry = registry();
        let mut asm = TreeAssembler::new(&registry);
        attach(&mut asm, &registry, 1, user("1")).unwrap();
        let first = attach(
            &mut asm,
            &registry,
            2,
            Record::new("Profile").with("user", "1").with("nick", "a"),
        )
        .unwrap();
        let second = attach(
            &mut asm,
            &registry,
            3,
            Record::new("Profile").with("user", "1").with("nick", "b"),
        )
        .unwrap();

        assert_eq!(
            second.placement,
            Placement::Replaced {
                parent: NodeId(0),
                previous: Some(first.node)
            }
        );
        let forest = asm.finish();
        let profile = forest[0].child("profile").unwrap();
        assert_eq!(profile.get("nick"), Some(&Value::from("b")));
        assert_eq!(forest[0].descendant_count(), 1);
    }

    #[test]
    fn test_forest_snapshot_does_not_end_pass() {
        let registry = registry();
        let mut asm = TreeAssembler::new(&registry);
        attach(&mut asm, &registry, 1, user("1")).unwrap();
        attach(&mut asm, &registry, 2, order("1", "apple")).unwrap();
        let snapshot = asm.forest();
        attach(&mut asm, &registry, 3, order("1", "pear")).unwrap();

        assert_eq!(snapshot[0].children("orders").len(), 1);
        assert_eq!(asm.finish()[0].children("orders").len(), 2);
    }

    #[test]
    fn test_get_returns_shallow_record() {
        let registry = registry();
        let mut asm = TreeAssembler::new(&registry);
        attach(&mut asm, &registry, 1, user("1")).unwrap();
        attach(&mut asm, &registry, 2, order("1", "apple")).unwrap();

        let stored = asm.get("User(1)").unwrap();
        assert!(stored.children("orders").is_empty());
        assert_eq!(asm.keys().count(), 2);
    }
}
