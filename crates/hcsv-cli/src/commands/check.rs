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

//! Check command - validate a schema file and show its classification table

use super::read_schema;
use crate::error::CliError;
use colored::Colorize;
use hcsv_core::{ChildKind, Registry, Schema};

/// Validate a schema file.
///
/// On success prints, per discriminator position, each type with its code,
/// key field, child slots and ordered parents.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read or decoded, or if the
/// declarations do not form a valid registry.
///
/// # Examples
///
/// ```no_run
/// use hcsv_cli::commands::check;
///
/// # fn main() -> Result<(), hcsv_cli::error::CliError> {
/// check("schema.json")?;
/// # Ok(())
/// # }
/// ```
pub fn check(file: &str) -> Result<(), CliError> {
    let decls = read_schema(file)?;
    let registry = match Registry::build(decls) {
        Ok(registry) => registry,
        Err(e) => {
            println!("{} {}", "✗".red().bold(), file);
            return Err(e.into());
        }
    };

    println!("{} {}", "✓".green().bold(), file);
    println!("  Types: {}", registry.len());
    for (position, schemas) in registry.classification_table() {
        println!("  Position {}:", position);
        for schema in schemas {
            println!("    {}", describe(&registry, schema));
        }
    }
    Ok(())
}

fn describe(registry: &Registry, schema: &Schema) -> String {
    let mut line = format!("{} {}", schema.code().bold(), schema.type_name());

    if let Some(key) = schema.key_field() {
        line.push_str(&format!("  key: {}", key.name()));
    }

    let mut children: Vec<String> = schema
        .potential_children()
        .values()
        .map(|rel| {
            let child = registry.schema(rel.child).type_name();
            match rel.slot {
                ChildKind::List => format!("{}: [{}]", rel.field.name(), child),
                ChildKind::Single => format!("{}: {}", rel.field.name(), child),
            }
        })
        .collect();
    children.sort();
    if !children.is_empty() {
        line.push_str(&format!("  children: {}", children.join(", ")));
    }

    let parents: Vec<String> = schema
        .ordered_parents()
        .map(|(order, id)| format!("{}({})", registry.schema(id).type_name(), order))
        .collect();
    if !parents.is_empty() {
        line.push_str(&format!("  parents: {}", parents.join(" > ")));
    }

    line
}
