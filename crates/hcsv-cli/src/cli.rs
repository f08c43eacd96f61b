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

//! CLI command definitions and argument parsing.

use crate::commands::{self, ParseArgs};
use crate::error::CliError;
use clap::Subcommand;

/// Top-level CLI commands.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use hcsv_cli::cli::Commands;
///
/// #[derive(Parser)]
/// struct Cli {
///     #[command(subcommand)]
///     command: Commands,
/// }
/// ```
#[derive(Subcommand)]
pub enum Commands {
    /// Parse a data file into a JSON forest
    ///
    /// Classifies every line by its discriminator, binds it to a record and
    /// attaches the record below its parents. Exits with a failure status if
    /// any line failed.
    Parse {
        /// JSON schema file
        #[arg(value_name = "SCHEMA")]
        schema: String,

        /// Delimited data file
        #[arg(value_name = "DATA")]
        data: String,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Leading lines to skip (banners, column legends)
        #[arg(long, default_value = "0")]
        skip_lines: usize,

        /// Skip lines with unknown codes instead of reporting them
        #[arg(long)]
        ignore_unknown: bool,

        /// Stop at the first failed line
        #[arg(short, long)]
        strict: bool,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Validate a schema file
    ///
    /// Builds the type registry and prints the classification table, or the
    /// first registration error.
    Check {
        /// JSON schema file
        #[arg(value_name = "SCHEMA")]
        schema: String,
    },
}

impl Commands {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the command fails; see [`commands::parse`] and
    /// [`commands::check`].
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            Commands::Parse {
                schema,
                data,
                delimiter,
                skip_lines,
                ignore_unknown,
                strict,
                pretty,
                output,
            } => commands::parse(&ParseArgs {
                schema,
                data,
                delimiter,
                skip_lines,
                ignore_unknown,
                strict,
                pretty,
                output,
            }),
            Commands::Check { schema } => commands::check(&schema),
        }
    }
}
