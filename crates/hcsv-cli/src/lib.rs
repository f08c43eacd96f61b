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

//! HCSV CLI library for command-line parsing and execution.
//!
//! # Commands
//!
//! - **parse**: assemble a hierarchical flat file into a JSON forest
//! - **check**: validate a schema file and print its classification table
//!
//! # Examples
//!
//! ```no_run
//! use hcsv_cli::commands::{check, parse, ParseArgs};
//!
//! # fn main() -> Result<(), hcsv_cli::error::CliError> {
//! check("schema.json")?;
//! parse(&ParseArgs {
//!     schema: "schema.json".to_string(),
//!     data: "export.csv".to_string(),
//!     skip_lines: 2,
//!     ..Default::default()
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! The binary logs to stderr through `tracing`; set `RUST_LOG` (for example
//! `RUST_LOG=hcsv_core=debug`) to see registry and per-line diagnostics.

pub mod cli;
pub mod commands;
pub mod error;
