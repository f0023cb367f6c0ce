//! Label presence predicates
//!
//! An attribute registers its entity under the attribute name only when the
//! predicate accepts the attribute's value.

use serde_json::Value;

/// Decides whether an attribute value marks its label as present
pub trait LabelPredicate {
    fn is_label_present(&self, value: &Value) -> bool;
}

impl<F> LabelPredicate for F
where
    F: Fn(&Value) -> bool,
{
    fn is_label_present(&self, value: &Value) -> bool {
        self(value)
    }
}

/// Explicit truthiness.
///
/// - `true` is present, `false` is not
/// - numbers are present when non-zero
/// - strings are present when non-empty and not one of
///   `false`, `no`, `0`, `none`, `null` (case-insensitive)
/// - null, arrays and objects are never present
#[derive(Debug, Clone, Copy, Default)]
pub struct TruthyPredicate;

const FALSY_STRINGS: [&str; 5] = ["false", "no", "0", "none", "null"];

impl LabelPredicate for TruthyPredicate {
    fn is_label_present(&self, value: &Value) -> bool {
        match value {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
            Value::String(s) => {
                let s = s.trim();
                !s.is_empty() && !FALSY_STRINGS.iter().any(|f| s.eq_ignore_ascii_case(f))
            }
            Value::Null | Value::Array(_) | Value::Object(_) => false,
        }
    }
}
