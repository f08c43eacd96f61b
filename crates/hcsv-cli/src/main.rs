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

//! HCSV Command Line Interface

use clap::Parser;
use hcsv_cli::cli::Commands;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// HCSV - hierarchical flat-file toolkit
///
/// # Examples
///
/// ```bash
/// # Validate a schema
/// hcsv check schema.json
///
/// # Parse a semicolon-separated export, skipping its banner
/// hcsv parse schema.json export.csv --delimiter ';' --skip-lines 2 --pretty
/// ```
#[derive(Parser)]
#[command(name = "hcsv")]
#[command(author, version, about = "HCSV - hierarchical flat-file toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("hcsv_cli=info".parse().expect("valid log directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
