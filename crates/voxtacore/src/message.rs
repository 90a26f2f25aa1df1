//! Probing of execution-result messages.
//!
//! The host delivers whatever the backend returned when a node finished, and
//! the wrapping has changed between host versions. Candidates are pulled out
//! by walking a fixed table of accessor paths, so a new wrapping only needs a
//! new table entry.

use serde_json::Value;

/// Accessor path into an execution message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// `message[field]`
    Field(&'static str),
    /// `message[parent][field]`, only when `message[parent]` is an object
    Nested(&'static str, &'static str),
    /// Every element of the `message[list]` array: its `field` when truthy, else the element
    EachOf(&'static str, &'static str),
    /// The message itself
    Root,
}

/// Known payload wrappings, highest priority first
pub const CANDIDATE_PROBES: &[Probe] = &[
    Probe::Field("ui"),
    Probe::Field("UI"),
    Probe::Field("output"),
    Probe::Field("result"),
    Probe::Nested("result", "ui"),
    Probe::EachOf("outputs", "ui"),
    Probe::Root,
];

/// Fields that mark an object as a ui-like payload
pub const UI_FIELDS: &[&str] = &["summary", "skipped", "kept"];

impl Probe {
    fn collect<'a>(&self, message: &'a Value, out: &mut Vec<&'a Value>) {
        match *self {
            Probe::Field(field) => out.extend(message.get(field)),
            Probe::Nested(parent, field) => {
                if let Some(parent @ Value::Object(_)) = message.get(parent) {
                    out.extend(parent.get(field));
                }
            }
            Probe::EachOf(list, field) => {
                if let Some(Value::Array(items)) = message.get(list) {
                    for item in items {
                        match item.get(field) {
                            Some(inner) if is_truthy(inner) => out.push(inner),
                            _ => out.push(item),
                        }
                    }
                }
            }
            Probe::Root => out.push(message),
        }
    }
}

/// Walk `probes` in order and gather every value they reach.
///
/// An absent message yields no candidates at all.
pub fn collect_candidates<'a>(message: Option<&'a Value>, probes: &[Probe]) -> Vec<&'a Value> {
    let mut out = Vec::new();
    if let Some(message) = message {
        for probe in probes {
            probe.collect(message, &mut out);
        }
    }
    out
}

/// First candidate carrying a truthy `summary`, `skipped` or `kept`
pub fn find_ui_candidate<'a>(candidates: &[&'a Value]) -> Option<&'a Value> {
    candidates.iter().copied().find(|candidate| {
        UI_FIELDS
            .iter()
            .any(|field| candidate.get(field).is_some_and(is_truthy))
    })
}

/// Loose truthiness as the host's scripting layer applies it.
///
/// `0`, `""`, `false` and `null` are falsy; arrays and objects are truthy even
/// when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a JSON value for display: strings unquoted, whole floats without a
/// fraction, arrays comma-joined at every depth
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or_default();
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", f as i64)
                } else {
                    f.to_string()
                }
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => join_values(items, ","),
        Value::Object(_) => value.to_string(),
    }
}

/// Join array elements with `separator`; null elements render empty
pub fn join_values(items: &[Value], separator: &str) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Null => String::new(),
            other => display_value(other),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// First element of an array field, or the scalar itself; `None` when absent or empty
pub fn first_or_scalar(value: Option<&Value>) -> Option<&Value> {
    match value? {
        Value::Array(items) => items.first(),
        Value::Null => None,
        scalar => Some(scalar),
    }
}
