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

//! JSON rendering of parse results.

use hcsv_core::{LineError, LineErrorKind, ParseOutput, Record, Value};
use serde_json::{json, Map, Number, Value as JsonValue};

/// Key holding the type name of a rendered record.
pub const TYPE_KEY: &str = "@type";

/// Render a record and its children as a JSON object.
///
/// The type name is stored under [`TYPE_KEY`]; fields follow in name order.
pub fn record_to_json(record: &Record) -> JsonValue {
    let mut map = Map::with_capacity(record.fields.len() + 1);
    map.insert(
        TYPE_KEY.to_string(),
        JsonValue::String(record.type_name.clone()),
    );
    for (name, value) in &record.fields {
        map.insert(name.clone(), value_to_json(value));
    }
    JsonValue::Object(map)
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(n) => JsonValue::Number(Number::from(*n)),
        Value::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Record(r) => record_to_json(r),
        Value::List(items) => JsonValue::Array(items.iter().map(record_to_json).collect()),
    }
}

/// Render a line failure as a JSON object.
pub fn error_to_json(error: &LineError) -> JsonValue {
    let mut value = json!({
        "line": error.line_number,
        "kind": error.kind.to_string(),
        "type": error.type_name,
        "message": error.message,
        "raw": error.raw_line,
    });
    if let LineErrorKind::BindingFailed(fields) = &error.kind {
        value["fields"] = fields.iter().map(|f| f.to_string()).collect();
    }
    value
}

/// Render a whole pass: `{ "records": [...], "errors": [...], "stats": {...} }`.
pub fn output_to_json(output: &ParseOutput) -> JsonValue {
    json!({
        "records": output.records.iter().map(record_to_json).collect::<Vec<_>>(),
        "errors": output.errors.iter().map(error_to_json).collect::<Vec<_>>(),
        "stats": output.stats,
    })
}
