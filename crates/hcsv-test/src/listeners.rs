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

//! Line listeners used across tests.

use hcsv_core::{LineListener, LineOutcome};

/// Pads a non-empty discriminator in column 0 with leading zeros up to `width`.
#[derive(Debug, Clone, Copy)]
pub struct ZeroPadCodes {
    pub width: usize,
}

impl Default for ZeroPadCodes {
    fn default() -> Self {
        Self { width: 4 }
    }
}

impl LineListener for ZeroPadCodes {
    fn before_line(&mut self, _line_number: u64, fields: &mut Vec<String>) {
        if let Some(code) = fields.first_mut() {
            if !code.is_empty() && code.len() < self.width {
                *code = format!("{:0>width$}", code, width = self.width);
            }
        }
    }
}

/// Counts `after_line` calls and filtered lines; optionally pads codes first.
#[derive(Debug, Clone, Default)]
pub struct CountingListener {
    pub pad: Option<ZeroPadCodes>,
    pub after_calls: usize,
    pub filtered: usize,
    pub failed: usize,
    /// Line numbers seen by `after_line`, in order.
    pub line_numbers: Vec<u64>,
}

impl CountingListener {
    /// Counter that also pads codes to four digits.
    pub fn with_zero_padding() -> Self {
        Self {
            pad: Some(ZeroPadCodes::default()),
            ..Self::default()
        }
    }
}

impl LineListener for CountingListener {
    fn before_line(&mut self, line_number: u64, fields: &mut Vec<String>) {
        if let Some(pad) = self.pad.as_mut() {
            pad.before_line(line_number, fields);
        }
    }

    fn after_line(&mut self, line_number: u64, outcome: &LineOutcome) {
        self.after_calls += 1;
        self.line_numbers.push(line_number);
        if outcome.is_filtered() {
            self.filtered += 1;
        }
        if outcome.is_failed() {
            self.failed += 1;
        }
    }
}
