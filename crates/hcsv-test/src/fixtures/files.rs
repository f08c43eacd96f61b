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

//! Sample files.

/// Comma-separated file for [`header_user_order`](super::header_user_order).
pub const HEADER_USER_ORDER_CSV: &str = "\
H,2023-03-01
U,1
O,1,apple
O,1,pear
U,2
O,2,plum
";

/// Semicolon-separated file for [`multi_parent`](super::multi_parent).
///
/// The first two lines are a banner and a column legend to skip. Of the
/// remaining 17 lines, some codes lack leading zeros, two products fail
/// the product filter and one line has an unknown code.
pub const MULTI_PARENT_CSV: &str = "\
HIERARCHICAL EXPORT v1
code;fields
0000;2023-03-01
1;001;user1
0002;001;Spain;99
0003;001;Spain;Barcelona
0002;001;France;93
3;001;France;Paris
0004;001;C123456789;Toaster
0001;002;user2
0002;002;France;93
0003;002;France;Paris
0002;002;France;76
0003;002;France;Normandie
0004;002;B938197310;Iphone 14
9999;unknown line
4;002;A917497177;Washing Machine Hisence
0004;002;Z000000001;Unknown product
0999;2
";

/// Lines to skip at the start of [`MULTI_PARENT_CSV`].
pub const MULTI_PARENT_SKIP_LINES: usize = 2;

/// JSON description of [`header_user_order`](super::header_user_order).
pub const HEADER_USER_ORDER_SCHEMA_JSON: &str = r#"[
  {
    "type": "Header",
    "code": "H",
    "fields": [
      { "name": "date", "type": { "scalar": "string" }, "column": 1 }
    ]
  },
  {
    "type": "User",
    "code": "U",
    "fields": [
      { "name": "id", "type": { "scalar": "string" }, "column": 1, "key": true },
      { "name": "orders", "type": { "list": { "record": "Order" } }, "child": "list" }
    ]
  },
  {
    "type": "Order",
    "code": "O",
    "fields": [
      { "name": "user", "type": { "scalar": "string" }, "column": 1,
        "parent_key": { "parent": "User", "order": 0 } },
      { "name": "item", "type": { "scalar": "string" }, "column": 2, "key": true }
    ]
  }
]"#;

/// JSON description of [`multi_parent`](super::multi_parent).
pub const MULTI_PARENT_SCHEMA_JSON: &str = r#"[
  {
    "type": "Header",
    "code": "0000",
    "fields": [
      { "name": "code", "type": { "scalar": "string" }, "column": 0 },
      { "name": "date", "type": { "scalar": "string" }, "column": 1 }
    ]
  },
  {
    "type": "User",
    "code": "0001",
    "fields": [
      { "name": "code", "type": { "scalar": "string" }, "column": 0 },
      { "name": "user_code", "type": { "scalar": "string" }, "column": 1, "key": true },
      { "name": "user_name", "type": { "scalar": "string" }, "column": 2 },
      { "name": "addresses", "type": { "list": { "record": "Address" } }, "child": "list" },
      { "name": "products", "type": { "list": { "record": "Product" } }, "child": "list" }
    ]
  },
  {
    "type": "Address",
    "code": "0002",
    "fields": [
      { "name": "code", "type": { "scalar": "string" }, "column": 0 },
      { "name": "user_code", "type": { "scalar": "string" }, "column": 1,
        "parent_key": { "parent": "User", "order": 0 } },
      { "name": "country", "type": { "scalar": "string" }, "column": 2, "key": true },
      { "name": "postal_code", "type": { "scalar": "string" }, "column": 3 },
      { "name": "region", "type": { "record": "Region" }, "child": "single" }
    ]
  },
  {
    "type": "Region",
    "code": "0003",
    "fields": [
      { "name": "code", "type": { "scalar": "string" }, "column": 0 },
      { "name": "user_code", "type": { "scalar": "string" }, "column": 1,
        "parent_key": { "parent": "User", "order": 0 } },
      { "name": "country", "type": { "scalar": "string" }, "column": 2,
        "parent_key": { "parent": "Address", "order": 1 } },
      { "name": "region", "type": { "scalar": "string" }, "column": 3 }
    ]
  },
  {
    "type": "Product",
    "code": "0004",
    "fields": [
      { "name": "code", "type": { "scalar": "string" }, "column": 0 },
      { "name": "user_code", "type": { "scalar": "string" }, "column": 1,
        "parent_key": { "parent": "User", "order": 0 } },
      { "name": "barcode", "type": { "scalar": "string" }, "column": 2, "key": true },
      { "name": "name", "type": { "scalar": "string" }, "column": 3 }
    ]
  },
  {
    "type": "Footer",
    "code": "0999",
    "fields": [
      { "name": "code", "type": { "scalar": "string" }, "column": 0 },
      { "name": "count", "type": { "scalar": "int" }, "column": 1 }
    ]
  }
]"#;
