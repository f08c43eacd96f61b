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

//! Declaration sets.

use hcsv_core::{FieldDecl, RecordDecl, ScalarType};

fn string(name: &str) -> FieldDecl {
    FieldDecl::scalar(name, ScalarType::String)
}

/// Header, users and their orders; codes `H`, `U`, `O` in column 0.
///
/// - `Header`: `date` (column 1), no key.
/// - `User`: key `id` (column 1), list slot `orders`.
/// - `Order`: `user` (column 1) is the `User` key part, key `item` (column 2).
pub fn header_user_order() -> Vec<RecordDecl> {
    vec![
        RecordDecl::new("Header", "H").field(string("date").column(1)),
        RecordDecl::new("User", "U")
            .field(string("id").column(1).key())
            .field(FieldDecl::child_list("orders", "Order")),
        RecordDecl::new("Order", "O")
            .field(string("user").column(1).parent_key("User", 0))
            .field(string("item").column(2).key()),
    ]
}

/// Users with a single `profile` slot, for overwrite tests.
pub fn user_profile() -> Vec<RecordDecl> {
    vec![
        RecordDecl::new("User", "U")
            .field(string("id").column(1).key())
            .field(FieldDecl::child("profile", "Profile")),
        RecordDecl::new("Profile", "P")
            .field(string("user").column(1).parent_key("User", 0))
            .field(string("nick").column(2).key()),
    ]
}

/// Multi-parent layout with four-digit codes.
///
/// | Code   | Type      | Columns                                          |
/// |--------|-----------|--------------------------------------------------|
/// | `0000` | `Header`  | code, date                                       |
/// | `0001` | `User`    | code, user_code (key), user_name                 |
/// | `0002` | `Address` | code, user_code → User, country (key), postal    |
/// | `0003` | `Region`  | code, user_code → User #0, country → Address #1, region |
/// | `0004` | `Product` | code, user_code → User, barcode (key), name      |
/// | `0999` | `Footer`  | code, count                                      |
///
/// `Region` only hangs below `Address`; its link to `User` exists to spell
/// out the full key chain.
pub fn multi_parent() -> Vec<RecordDecl> {
    vec![
        RecordDecl::new("Header", "0000")
            .field(string("code").column(0))
            .field(string("date").column(1)),
        RecordDecl::new("User", "0001")
            .field(string("code").column(0))
            .field(string("user_code").column(1).key())
            .field(string("user_name").column(2))
            .field(FieldDecl::child_list("addresses", "Address"))
            .field(FieldDecl::child_list("products", "Product")),
        RecordDecl::new("Address", "0002")
            .field(string("code").column(0))
            .field(string("user_code").column(1).parent_key("User", 0))
            .field(string("country").column(2).key())
            .field(string("postal_code").column(3))
            .field(FieldDecl::child("region", "Region")),
        RecordDecl::new("Region", "0003")
            .field(string("code").column(0))
            .field(string("user_code").column(1).parent_key("User", 0))
            .field(string("country").column(2).parent_key("Address", 1))
            .field(string("region").column(3)),
        RecordDecl::new("Product", "0004")
            .field(string("code").column(0))
            .field(string("user_code").column(1).parent_key("User", 0))
            .field(string("barcode").column(2).key())
            .field(string("name").column(3)),
        RecordDecl::new("Footer", "0999")
            .field(string("code").column(0))
            .field(FieldDecl::scalar("count", ScalarType::Int).column(1)),
    ]
}

/// Discriminators spread over three columns.
///
/// | Position | Code | Type    |
/// |----------|------|---------|
/// | 0        | `A`  | `Alpha` |
/// | 0        | `B`  | `Beta`  |
/// | 1        | `C`  | `Gamma` |
/// | 2        | `D`  | `Delta` |
///
/// A line like `A,C,D` matches a code at every position; the lowest
/// position wins, so it is an `Alpha`. `C,C` is a `Gamma`: column 0 holds
/// no position-0 code.
pub fn multi_position() -> Vec<RecordDecl> {
    vec![
        RecordDecl::new("Alpha", "A").field(string("value").column(3)),
        RecordDecl::new("Beta", "B").field(string("value").column(3)),
        RecordDecl::new("Gamma", "C")
            .at_position(1)
            .field(string("value").column(3)),
        RecordDecl::new("Delta", "D")
            .at_position(2)
            .field(string("value").column(3)),
    ]
}

/// Product filter of the multi-parent file: barcodes starting with `A` or `B`.
pub fn product_filter(fields: &[String]) -> bool {
    fields
        .get(2)
        .is_some_and(|barcode| barcode.starts_with('A') || barcode.starts_with('B'))
}
