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

//! Declaration sets that must fail registration.

use hcsv_core::{ChildKind, FieldDecl, FieldType, RecordDecl, ScalarType};

fn string(name: &str) -> FieldDecl {
    FieldDecl::scalar(name, ScalarType::String)
}

fn user_with_orders() -> RecordDecl {
    RecordDecl::new("User", "U")
        .field(string("id").column(1).key())
        .field(FieldDecl::child_list("orders", "Order"))
}

fn order() -> RecordDecl {
    RecordDecl::new("Order", "O").field(string("user").column(1).parent_key("User", 0))
}

/// Invalid declaration sets.
///
/// Each tuple contains (name, declarations, expected error variant name).
pub fn invalid_schemas() -> Vec<(&'static str, Vec<RecordDecl>, &'static str)> {
    vec![
        ("empty", vec![], "NoTypesDeclared"),
        (
            "duplicate_code",
            vec![RecordDecl::new("User", "U"), RecordDecl::new("Unit", "U")],
            "DuplicateDiscriminatorCode",
        ),
        (
            "parent_without_key",
            vec![
                RecordDecl::new("User", "U").field(FieldDecl::child_list("orders", "Order")),
                order(),
            ],
            "ParentHasNoKey",
        ),
        (
            "child_not_a_record",
            vec![RecordDecl::new("User", "U")
                .field(string("id").key())
                .field(string("orders").as_child(ChildKind::Single))],
            "ChildTypeNotARecord",
        ),
        (
            "child_not_registered",
            vec![user_with_orders()],
            "ChildCodeNotRegistered",
        ),
        (
            "list_slot_not_a_list",
            vec![
                RecordDecl::new("User", "U").field(string("id").key()).field(
                    FieldDecl::new("orders", FieldType::Record("Order".to_string()))
                        .as_child(ChildKind::List),
                ),
                order(),
            ],
            "ChildWrapperNotCollection",
        ),
        (
            "parent_not_referenced",
            vec![user_with_orders(), RecordDecl::new("Order", "O")],
            "ParentNotReferencedInChild",
        ),
        (
            "parent_referenced_twice",
            vec![
                user_with_orders(),
                order().field(string("user_again").parent_key("User", 1)),
            ],
            "ParentReferencedMultipleTimesInChild",
        ),
        (
            "duplicate_parent_order",
            vec![
                user_with_orders(),
                RecordDecl::new("Shop", "S").field(string("id").key()),
                order().field(string("shop").parent_key("Shop", 0)),
            ],
            "DuplicateParentOrder",
        ),
        (
            "unknown_parent",
            vec![order()],
            "ParentCodeNotRegistered",
        ),
        (
            "two_keys",
            vec![RecordDecl::new("User", "U")
                .field(string("id").key())
                .field(string("login").key())],
            "MultipleKeyFields",
        ),
    ]
}
