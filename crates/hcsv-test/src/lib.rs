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

//! Shared test fixtures and utilities for HCSV crates.
//!
//! This crate provides canonical type declarations, sample files, invalid
//! declaration sets and small listeners so that core, reader and CLI tests
//! exercise the same data.
//!
//! # Quick Start
//!
//! ```rust
//! use hcsv_core::{Pass, PassOptions, PositionalBinder, Registry};
//! use hcsv_test::{fixtures, line};
//!
//! let registry = Registry::build(fixtures::header_user_order()).unwrap();
//! let mut pass = Pass::new(&registry, PositionalBinder, PassOptions::default());
//! pass.process_line(1, line(&["H", "2023-03-01"])).unwrap();
//! assert_eq!(pass.finish().records.len(), 1);
//! ```

pub mod fixtures;
mod listeners;

pub use listeners::{CountingListener, ZeroPadCodes};

use hcsv_core::Record;

/// Build an owned line from string slices.
pub fn line(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

/// Split `text` into lines of fields on `delimiter`, numbering from 1.
///
/// Blank lines are kept as empty lines. No quoting is understood.
pub fn split_lines(text: &str, delimiter: char) -> Vec<(u64, Vec<String>)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| {
            let fields = if l.is_empty() {
                Vec::new()
            } else {
                l.split(delimiter).map(String::from).collect()
            };
            (i as u64 + 1, fields)
        })
        .collect()
}

/// Count records in a forest, nested ones included.
pub fn count_records(forest: &[Record]) -> usize {
    forest.iter().map(|r| 1 + r.descendant_count()).sum()
}

/// Type names of the top-level records, in order.
pub fn root_types(forest: &[Record]) -> Vec<&str> {
    forest.iter().map(|r| r.type_name.as_str()).collect()
}
