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

//! Core model for hierarchical flat files.
//!
//! A hierarchical flat file is a delimited text file in which every line is
//! one record of one of several types. A discriminator column selects the
//! type; key and parent key columns say where the record hangs in a tree.
//! This crate turns such lines into an ordered forest of [`Record`]s.
//!
//! # Building blocks
//!
//! - [`RecordDecl`] / [`FieldDecl`]: declarative type descriptions.
//! - [`Registry`]: validates declarations once and classifies lines.
//! - [`RecordBinder`]: turns a classified line into a [`Record`];
//!   [`PositionalBinder`] reads declared columns.
//! - [`TreeAssembler`]: attaches records to their parents through the
//!   runtime key index.
//! - [`Pass`]: drives the above line by line with filters, verifiers,
//!   listeners and error handlers.
//!
//! Tokenizing text is left to callers; see the `hcsv-csv` crate.
//!
//! # Example
//!
//! ```
//! use hcsv_core::{FieldDecl, Pass, PassOptions, PositionalBinder, RecordDecl, Registry, ScalarType};
//!
//! let registry = Registry::build(vec![
//!     RecordDecl::new("Header", "H").field(FieldDecl::scalar("date", ScalarType::String).column(1)),
//!     RecordDecl::new("User", "U")
//!         .field(FieldDecl::scalar("id", ScalarType::String).column(1).key())
//!         .field(FieldDecl::child_list("orders", "Order")),
//!     RecordDecl::new("Order", "O")
//!         .field(FieldDecl::scalar("user", ScalarType::String).column(1).parent_key("User", 0))
//!         .field(FieldDecl::scalar("item", ScalarType::String).column(2)),
//! ])?;
//!
//! let lines = [
//!     "H,2023-03-01",
//!     "U,1",
//!     "O,1,apple",
//!     "U,2",
//!     "O,2,pear",
//! ];
//!
//! let mut pass = Pass::new(&registry, PositionalBinder, PassOptions::default());
//! for (n, text) in lines.iter().enumerate() {
//!     let fields = text.split(',').map(String::from).collect();
//!     pass.process_line(n as u64 + 1, fields).unwrap();
//! }
//! let output = pass.finish();
//!
//! assert_eq!(output.records.len(), 3);
//! assert_eq!(output.records[1].children("orders").len(), 1);
//! # Ok::<(), hcsv_core::RegistrationError>(())
//! ```

mod assemble;
mod bind;
mod decl;
mod error;
mod pass;
mod registry;
mod schema;
mod value;

pub use assemble::{AttachOutcome, NodeId, Placement, TreeAssembler};
pub use bind::{coerce, PositionalBinder, RecordBinder};
pub use decl::{
    ChildKind, FieldDecl, FieldType, ParentKeyPart, RecordDecl, ScalarType, DEFAULT_CODE_POSITION,
};
pub use error::{FieldError, LineError, LineErrorKind, RegistrationError, RegistrationResult};
pub use pass::{
    ContinueOnError, ErrorAction, ErrorHandler, FailFast, LineListener, LineOutcome, ParseOutput,
    Pass, PassAborted, PassOptions, PassStats,
};
pub use registry::{Classification, Registry};
pub use schema::{ChildRelation, FieldRef, Schema, SchemaId};
pub use value::{Record, Value};
