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

//! CLI command implementations

mod check;
pub mod json;
mod parse;

pub use check::check;
pub use parse::{parse, ParseArgs};

use crate::error::CliError;
use hcsv_core::{RecordDecl, Registry};
use std::fs;
use std::io::{self, Write};
use tracing::debug;

/// Read type declarations from a JSON schema file.
///
/// The file holds a JSON array of declarations:
///
/// ```json
/// [
///   { "type": "User", "code": "U", "fields": [
///       { "name": "id", "type": { "scalar": "string" }, "column": 1, "key": true } ] }
/// ]
/// ```
///
/// # Errors
///
/// Returns `Err` if the file cannot be read or does not decode.
pub fn read_schema(path: &str) -> Result<Vec<RecordDecl>, CliError> {
    let content = fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))?;
    let decls: Vec<RecordDecl> =
        serde_json::from_str(&content).map_err(|e| CliError::schema(path, e))?;
    debug!(path, types = decls.len(), "schema file decoded");
    Ok(decls)
}

/// Read a schema file and build the registry.
pub fn load_registry(path: &str) -> Result<Registry, CliError> {
    Ok(Registry::build(read_schema(path)?)?)
}

/// Write content to a file or stdout.
///
/// # Errors
///
/// Returns `Err` if writing fails.
pub fn write_output(content: &str, path: Option<&str>) -> Result<(), CliError> {
    match path {
        Some(p) => fs::write(p, content).map_err(|e| CliError::io_error(p, e)),
        None => io::stdout()
            .write_all(content.as_bytes())
            .map_err(|e| CliError::io_error("<stdout>", e)),
    }
}
