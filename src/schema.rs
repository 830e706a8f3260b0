//! Leaf validators and object composition.
//!
//! Each helper checks one JSON node against one expected shape, appending a
//! [`ValidationIssue`] and returning `None` on mismatch. Sibling fields are
//! validated independently so one pass reports every structural problem.
//! Object validation is closed: keys not claimed through the reader are
//! rejected.
//!
//! A field that is present with a JSON `null` value is not absent: the leaf
//! validator rejects it like any other wrong type. Only identifier-keyed
//! record entries may be `null`, meaning "no override for this entry".

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::issue::{FieldPath, ValidationIssue};

/// String enums with a fixed set of accepted keywords.
pub trait KeywordEnum: Sized {
    /// Accepted document spellings, in declaration order.
    const KEYWORDS: &'static [&'static str];

    fn from_keyword(keyword: &str) -> Option<Self>;
}

/// Validation seam for sub-schemas owned by the host platform.
///
/// The channel config nests several host-defined shapes (tool policies,
/// per-DM overrides, markdown rendering, block-streaming coalescing). Their
/// interiors are opaque to this crate; the host wires its own validators in
/// through [`crate::ExternalSchemas`] and any issues they raise surface on
/// the nested field path.
pub trait ExternalSchema: Send + Sync {
    fn validate(&self, value: &Value, path: &FieldPath, issues: &mut Vec<ValidationIssue>);
}

/// Accepts any value. The default for every external seam.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAny;

impl ExternalSchema for AcceptAny {
    fn validate(&self, _value: &Value, _path: &FieldPath, _issues: &mut Vec<ValidationIssue>) {}
}

pub fn expect_bool(
    value: &Value,
    path: &FieldPath,
    issues: &mut Vec<ValidationIssue>,
) -> Option<bool> {
    match value.as_bool() {
        Some(b) => Some(b),
        None => {
            issues.push(ValidationIssue::new(path.clone(), "expected a boolean"));
            None
        }
    }
}

pub fn expect_string(
    value: &Value,
    path: &FieldPath,
    issues: &mut Vec<ValidationIssue>,
) -> Option<String> {
    match value.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            issues.push(ValidationIssue::new(path.clone(), "expected a string"));
            None
        }
    }
}

/// Array of strings, with per-element paths. Any bad element fails the whole
/// field after all elements have been reported.
pub fn expect_string_array(
    value: &Value,
    path: &FieldPath,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Vec<String>> {
    let Some(items) = value.as_array() else {
        issues.push(ValidationIssue::new(path.clone(), "expected an array of strings"));
        return None;
    };
    let mut out = Vec::with_capacity(items.len());
    let mut ok = true;
    for (i, item) in items.iter().enumerate() {
        match expect_string(item, &path.index(i), issues) {
            Some(s) => out.push(s),
            None => ok = false,
        }
    }
    ok.then_some(out)
}

/// Integer strictly greater than zero. A float with a zero fractional part
/// counts as an integer.
pub fn expect_positive_int(
    value: &Value,
    path: &FieldPath,
    issues: &mut Vec<ValidationIssue>,
) -> Option<u64> {
    let parsed = as_unsigned(value).filter(|&n| n > 0);
    if parsed.is_none() {
        issues.push(ValidationIssue::new(
            path.clone(),
            format!("must be a positive integer, got {value}"),
        ));
    }
    parsed
}

/// Integer greater than or equal to zero.
pub fn expect_non_negative_int(
    value: &Value,
    path: &FieldPath,
    issues: &mut Vec<ValidationIssue>,
) -> Option<u64> {
    let parsed = as_unsigned(value);
    if parsed.is_none() {
        issues.push(ValidationIssue::new(
            path.clone(),
            format!("must be an integer >= 0, got {value}"),
        ));
    }
    parsed
}

/// Any number strictly greater than zero; fractions are fine.
pub fn expect_positive_number(
    value: &Value,
    path: &FieldPath,
    issues: &mut Vec<ValidationIssue>,
) -> Option<f64> {
    let parsed = value.as_f64().filter(|&n| n > 0.0);
    if parsed.is_none() {
        issues.push(ValidationIssue::new(
            path.clone(),
            format!("must be a positive number, got {value}"),
        ));
    }
    parsed
}

/// One of a fixed set of keyword spellings.
pub fn expect_keyword<T: KeywordEnum>(
    value: &Value,
    path: &FieldPath,
    issues: &mut Vec<ValidationIssue>,
) -> Option<T> {
    let Some(s) = value.as_str() else {
        issues.push(ValidationIssue::new(path.clone(), "expected a string"));
        return None;
    };
    match T::from_keyword(s) {
        Some(parsed) => Some(parsed),
        None => {
            issues.push(ValidationIssue::new(
                path.clone(),
                format!("must be one of {}, got \"{s}\"", keyword_list(T::KEYWORDS)),
            ));
            None
        }
    }
}

/// Map keyed by arbitrary identifiers. Each present entry is validated with
/// `entry`; a `null` entry is kept as `None`. Entry issues are reported on
/// the entry's own path, and any bad entry fails the whole field once every
/// entry has been visited.
pub fn expect_record<T>(
    value: &Value,
    path: &FieldPath,
    issues: &mut Vec<ValidationIssue>,
    mut entry: impl FnMut(&Value, &FieldPath, &mut Vec<ValidationIssue>) -> Option<T>,
) -> Option<HashMap<String, Option<T>>> {
    let Some(map) = value.as_object() else {
        issues.push(ValidationIssue::new(path.clone(), "expected an object"));
        return None;
    };
    let mut out = HashMap::with_capacity(map.len());
    let mut ok = true;
    for (key, item) in map {
        if item.is_null() {
            out.insert(key.clone(), None);
            continue;
        }
        match entry(item, &path.key(key), issues) {
            Some(parsed) => {
                out.insert(key.clone(), Some(parsed));
            }
            None => ok = false,
        }
    }
    ok.then_some(out)
}

/// Closed-object reader: fields are claimed by key, and [`ObjectReader::finish`]
/// rejects everything left unclaimed.
pub struct ObjectReader<'a> {
    map: &'a Map<String, Value>,
    path: FieldPath,
    claimed: Vec<&'static str>,
}

impl<'a> ObjectReader<'a> {
    pub fn new(
        value: &'a Value,
        path: &FieldPath,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<Self> {
        match value.as_object() {
            Some(map) => Some(Self {
                map,
                path: path.clone(),
                claimed: Vec::new(),
            }),
            None => {
                issues.push(ValidationIssue::new(path.clone(), "expected an object"));
                None
            }
        }
    }

    /// Claims `key`. Returns the value and its path when the field is
    /// present. An explicit `null` is returned too, so the leaf validator
    /// reports it as a type mismatch rather than silently dropping it.
    pub fn take(&mut self, key: &'static str) -> Option<(&'a Value, FieldPath)> {
        self.claimed.push(key);
        self.map.get(key).map(|v| (v, self.path.key(key)))
    }

    /// Reports every key that was never claimed.
    pub fn finish(self, issues: &mut Vec<ValidationIssue>) {
        for key in self.map.keys() {
            if !self.claimed.contains(&key.as_str()) {
                issues.push(ValidationIssue::new(self.path.key(key), "unrecognized key"));
            }
        }
    }
}

fn as_unsigned(value: &Value) -> Option<u64> {
    let n = value.as_number()?;
    if let Some(u) = n.as_u64() {
        return Some(u);
    }
    // Whole-valued floats count as integers; negatives fall through here too.
    let f = n.as_f64()?;
    (f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}

fn keyword_list(keywords: &[&str]) -> String {
    keywords
        .iter()
        .map(|k| format!("\"{k}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
