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

//! Delimited text reading for hierarchical flat files.
//!
//! This crate tokenizes delimited text with the `csv` crate and feeds each
//! line to a [`hcsv_core::Pass`]. Lines are records of different types, so
//! the tokenizer runs without headers and accepts lines of any width.
//!
//! # Features
//!
//! - **Streaming**: [`HcsvReader::read_line`] processes one line at a time
//! - **Configurable**: delimiter, quote character, trimming, leading lines to skip
//! - **Bounded**: a line limit guards against unbounded input
//! - **Error handling**: tokenizer failures end the read, line failures are reported
//!
//! # Examples
//!
//! ## Reading a file
//!
//! ```no_run
//! use hcsv_core::Registry;
//! use hcsv_csv::{read_path, ReaderConfig};
//! # use hcsv_core::RecordDecl;
//! # let decls = vec![RecordDecl::new("Header", "H")];
//!
//! let registry = Registry::build(decls).unwrap();
//! let output = read_path("users.csv", &registry, ReaderConfig::default()).unwrap();
//! for error in &output.errors {
//!     eprintln!("{}", error);
//! }
//! ```
//!
//! ## Custom configuration and hooks
//!
//! ```
//! use hcsv_core::{FieldDecl, RecordDecl, Registry, ScalarType};
//! use hcsv_csv::{HcsvReader, ReaderConfig};
//!
//! let registry = Registry::build(vec![
//!     RecordDecl::new("User", "U")
//!         .field(FieldDecl::scalar("id", ScalarType::String).column(1).key())
//!         .field(FieldDecl::scalar("age", ScalarType::Int).column(2)),
//! ])
//! .unwrap();
//!
//! let data = "exported 2023-03-01\nU;1;30\nU;2;12\n";
//! let config = ReaderConfig {
//!     delimiter: b';',
//!     skip_lines: 1,
//!     ..Default::default()
//! };
//! let output = HcsvReader::from_reader(data.as_bytes(), &registry, config)
//!     .configure(|pass| {
//!         pass.with_verifier("User", |user| {
//!             Ok(user.get("age").and_then(|v| v.as_int()).unwrap_or(0) >= 18)
//!         })
//!     })
//!     .read_all()
//!     .unwrap();
//!
//! assert_eq!(output.records.len(), 1);
//! assert_eq!(output.stats.filtered, 1);
//! ```

mod error;
mod reader;

pub use error::{ReadError, Result};
pub use reader::{read_path, read_str, HcsvReader, ReaderConfig, DEFAULT_MAX_LINES};
