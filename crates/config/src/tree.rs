//! Nested configuration tree helpers.
//!
//! Responsibilities:
//! - Resolve `/`-delimited paths inside a nested configuration value.
//! - Deep-merge trees so that later leaf values replace earlier ones.
//! - Convert scalar leaves to the string form used for environment variables.
//! - Convert YAML documents into the JSON value model used everywhere else.
//!
//! Does NOT handle:
//! - Reading files or environment variables (see `reader`).
//! - Writing environment variables (see `environment_creator`).
//!
//! Invariants:
//! - Arrays behave like integer-keyed mappings for lookup, iteration and merge.
//! - Only strings, numbers and booleans are scalars; null is not.
//! - Containers merged onto containers merge recursively; an array meeting a
//!   mapping is merged as an index-keyed mapping. Any other pairing replaces.

use serde_json::{Map, Number, Value};

/// A configuration tree: string keys mapped to scalars or nested trees.
pub type ConfigTree = Map<String, Value>;

/// Separator between path components, e.g. `CMS/base/foo`.
pub const PATH_DELIMITER: char = '/';

/// Resolve `path` inside `tree`.
///
/// Returns `None` if any component is missing or a non-container value is
/// reached before the path is exhausted.
pub fn value_by_path<'a>(tree: &'a ConfigTree, path: &str) -> Option<&'a Value> {
    let mut segments = path.split(PATH_DELIMITER);
    let mut current = tree.get(segments.next()?)?;

    for segment in segments {
        current = child(current, segment)?;
    }

    Some(current)
}

/// Set `value` at the given path components, creating intermediate mappings.
///
/// A scalar found on the way is replaced by a mapping.
pub fn set_value_by_path<S: AsRef<str>>(tree: &mut ConfigTree, segments: &[S], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = tree;
    for segment in parents {
        let slot = current
            .entry(segment.as_ref().to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            tracing::debug!(
                segment = segment.as_ref(),
                "Replacing scalar configuration value with nested mapping"
            );
            *slot = Value::Object(Map::new());
        }
        let Some(map) = slot.as_object_mut() else {
            return;
        };
        current = map;
    }

    current.insert(last.as_ref().to_string(), value);
}

/// Look up a direct child of a mapping or array.
fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    }
}

/// Returns true if the value can be traversed (mapping or array).
pub fn is_iterable(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Key/value pairs of a mapping or array; arrays use their indices as keys.
pub fn entries(value: &Value) -> Vec<(String, &Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(idx, v)| (idx.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

/// String form of a scalar value, or `None` for containers and null.
///
/// Booleans follow the CMS convention: `true` becomes `"1"`, `false` the
/// empty string. Floats are rendered like the CMS renders them (see
/// `float_string`).
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if n.is_f64() => float_string(f),
            _ => n.to_string(),
        }),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Significant digits kept when rendering floats.
const FLOAT_PRECISION: usize = 14;

/// Render a float with 14 significant digits and no trailing zeros.
///
/// Decimal exponents below -4 or from 14 upwards use exponent notation with
/// at least one fractional digit: `1.0` is `"1"`, `1e20` is `"1.0E+20"`,
/// `0.00001` is `"1.0E-5"`.
fn float_string(value: f64) -> String {
    let formatted = format!("{:.*e}", FLOAT_PRECISION - 1, value);
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return formatted;
    };

    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let digits = match digits.trim_end_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };

    if exponent < -4 || exponent >= FLOAT_PRECISION as i32 {
        let (first, rest) = digits.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        let exponent_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{first}.{rest}E{exponent_sign}{}", exponent.abs());
    }

    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("{sign}0.{zeros}{digits}");
    }

    let int_len = exponent as usize + 1;
    if digits.len() <= int_len {
        format!("{sign}{digits}{}", "0".repeat(int_len - digits.len()))
    } else {
        let (int_part, frac_part) = digits.split_at(int_len);
        format!("{sign}{int_part}.{frac_part}")
    }
}

/// Merge `overlay` into `base`; overlay leaves win.
pub fn deep_merge(base: &mut ConfigTree, overlay: ConfigTree) {
    for (key, incoming) in overlay {
        match base.get_mut(&key) {
            Some(existing) => merge_value(existing, incoming),
            None => {
                base.insert(key, incoming);
            }
        }
    }
}

fn merge_value(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Object(current), Value::Object(overlay)) => deep_merge(current, overlay),
        (Value::Array(current), Value::Array(overlay)) => {
            for (idx, item) in overlay.into_iter().enumerate() {
                match current.get_mut(idx) {
                    Some(slot) => merge_value(slot, item),
                    None => current.push(item),
                }
            }
        }
        (Value::Object(current), Value::Array(overlay)) => deep_merge(current, indexed(overlay)),
        (slot, Value::Object(overlay)) if slot.is_array() => {
            let Value::Array(items) = std::mem::take(slot) else {
                return;
            };
            let mut merged = indexed(items);
            deep_merge(&mut merged, overlay);
            *slot = Value::Object(merged);
        }
        (slot, incoming) => *slot = incoming,
    }
}

/// Array items keyed by their index, as seen by `entries`.
fn indexed(items: Vec<Value>) -> ConfigTree {
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| (idx.to_string(), item))
        .collect()
}

/// Convert a YAML value into the JSON value model.
///
/// Mapping keys that are strings, integers or booleans are kept (booleans
/// become `"1"`/`"0"`); any other key is dropped.
pub fn value_from_yaml(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => yaml_number(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(value_from_yaml).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                match yaml_key(&key) {
                    Some(key) => {
                        map.insert(key, value_from_yaml(value));
                    }
                    None => tracing::debug!(?key, "Skipping non-scalar configuration key"),
                }
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => value_from_yaml(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}

fn yaml_key(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}
