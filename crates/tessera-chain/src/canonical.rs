//! Canonical serialization of log entries.
//!
//! The canonical form is what gets hashed, so it has to match, byte for byte,
//! the form the analyzer tooling has always produced:
//!
//!   1. the entry's own `ph` pointer is excluded,
//!   2. object keys are sorted recursively by UTF-16 code unit (arrays keep
//!      their order),
//!   3. output is compact JSON with no whitespace,
//!   4. numbers use shortest round-trip formatting with ECMAScript rules:
//!      integral values print without a fraction, and exponent notation is
//!      used below `1e-6` and at or above `1e21`,
//!   5. a `dt` member whose value is numerically zero prints as `0.0`,
//!      whether it arrived as an integer or a float.

use serde_json::{Map, Number, Value};

use tessera_contracts::entry::RawLogEntry;

/// Wire key of the chain pointer, excluded from the canonical form.
pub const CHAIN_POINTER_KEY: &str = "ph";

/// Wire key whose zero value keeps an explicit fractional marker.
const DURATION_KEY: &str = "dt";

/// Canonical JSON of a wire entry with its own `ph` excluded.
///
/// The form is rebuilt from the typed `RawLogEntry` fields, so the typed
/// schema is authoritative: top-level keys outside `t,a,o,ot,d,dt,s` and
/// `s` members other than `v,f,o` are dropped on parse and never hashed.
/// Arbitrary keys inside `d` are kept.
pub fn canonical_entry_json(entry: &RawLogEntry) -> String {
    let mut members = Map::new();
    members.insert("t".to_string(), f64_value(entry.t));
    members.insert("a".to_string(), Value::String(entry.a.clone()));
    members.insert("o".to_string(), Value::String(entry.o.clone()));
    members.insert("ot".to_string(), Value::String(entry.ot.clone()));
    members.insert("d".to_string(), Value::Object(entry.d.clone()));
    members.insert("dt".to_string(), f64_value(entry.dt));

    let mut stats = Map::new();
    stats.insert("v".to_string(), Value::from(entry.s.v));
    stats.insert("f".to_string(), Value::from(entry.s.f));
    stats.insert("o".to_string(), Value::from(entry.s.o));
    members.insert("s".to_string(), Value::Object(stats));

    canonical_json(&Value::Object(members))
}

/// Canonical JSON of an arbitrary value, with a top-level `ph` excluded when
/// the value is an object.
pub fn canonical_value_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut out = String::new();
            write_object(&mut out, map, Some(CHAIN_POINTER_KEY));
            out
        }
        other => canonical_json(other),
    }
}

/// Canonical JSON of a value.  Nothing is excluded.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

// ── Writer ────────────────────────────────────────────────────────────────────

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(n)),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(out, map, None),
    }
}

fn write_object(out: &mut String, map: &Map<String, Value>, exclude: Option<&str>) {
    let mut keys: Vec<&String> = map
        .keys()
        .filter(|k| exclude != Some(k.as_str()))
        .collect();
    // Code-unit order, not byte order: the two differ above the BMP.
    keys.sort_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));

    out.push('{');
    for (i, key) in keys.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(out, key);
        out.push(':');

        let value = &map[key.as_str()];
        match value {
            Value::Number(n) if key == DURATION_KEY && is_zero(n) => out.push_str("0.0"),
            _ => write_value(out, value),
        }
    }
    out.push('}');
}

fn write_string(out: &mut String, s: &str) {
    // serde_json's escaping matches JSON.stringify: `"`, `\` and control
    // characters only, with lower-case `\u00xx` forms.
    match serde_json::to_string(s) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => out.push_str("\"\""),
    }
}

// ── Numbers ───────────────────────────────────────────────────────────────────

fn f64_value(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

fn is_zero(n: &Number) -> bool {
    n.as_f64() == Some(0.0)
}

/// Largest integer magnitude an `f64` holds exactly.
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Format a JSON number the way ECMAScript's `Number#toString` does.
///
/// Integers beyond `MAX_SAFE_INTEGER` go through `f64` first, as they would
/// in a JavaScript number.
pub fn format_number(n: &Number) -> String {
    if let Some(u) = n.as_u64().filter(|u| *u <= MAX_SAFE_INTEGER) {
        return u.to_string();
    }
    if let Some(i) = n.as_i64().filter(|i| i.unsigned_abs() <= MAX_SAFE_INTEGER) {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) => format_f64(f),
        None => "null".to_string(),
    }
}

/// Shortest round-trip rendering of an `f64` with ECMAScript notation rules.
pub fn format_f64(value: f64) -> String {
    if !value.is_finite() {
        return "null".to_string();
    }
    if value == 0.0 {
        // Covers -0.0 as well.
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        // `Display` for f64 is shortest round-trip and never uses an exponent.
        return value.to_string();
    }

    let exp = format!("{value:e}");
    match exp.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => exp,
    }
}
