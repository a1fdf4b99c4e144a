//! Normalizes a raw submission into a canonical [`EvaluationRecord`].
//!
//! Pure transform: nothing here touches storage. The submission arrives as
//! untyped JSON from the transport, so every field is coerced leniently
//! (trimmed strings, truthy flags) and only the three required fields can
//! reject it.

use crate::errors::{EvalError, EvalResult};
use crate::model::EvaluationRecord;
use chrono::{DateTime, Utc};
use serde_json::Value;

pub const FIELD_RATER: &str = "rater_first_name";
pub const FIELD_REPORT: &str = "report_internal_id";
pub const FIELD_SCORE: &str = "odsc_score";
pub const FIELD_LOCALFIT: &str = "dimension_localfit_yes";
pub const FIELD_MINIMAL_FOLLOWUPS: &str = "dimension_minimal_followups_yes";
pub const FIELD_RETRIEVAL_MISS: &str = "failure_retrieval_miss";
pub const FIELD_OVERCONFIDENT: &str = "failure_overconfident_or_drift";
pub const FIELD_COMMENT: &str = "comment";

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 3.0;

/// Validates with a timestamp taken now.
pub fn validate_submission(raw: &Value) -> EvalResult<EvaluationRecord> {
    validate_submission_at(raw, Utc::now())
}

/// Validates with an explicit timestamp.
pub fn validate_submission_at(raw: &Value, now: DateTime<Utc>) -> EvalResult<EvaluationRecord> {
    let body = raw.as_object();
    let field = |name: &str| body.and_then(|m| m.get(name));

    let rater_id = coerce_string(field(FIELD_RATER));
    if rater_id.is_empty() {
        return Err(EvalError::validation("missing rater"));
    }

    let report_id = coerce_string(field(FIELD_REPORT));
    if report_id.is_empty() {
        return Err(EvalError::validation("missing report id"));
    }

    let odsc_score = match coerce_number(field(FIELD_SCORE)) {
        Some(score) if score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score) => score,
        _ => return Err(EvalError::validation("score out of range")),
    };

    Ok(EvaluationRecord {
        timestamp: now,
        rater_id,
        report_id,
        odsc_score,
        dimension_localfit: is_truthy(field(FIELD_LOCALFIT)),
        dimension_minimal_followups: is_truthy(field(FIELD_MINIMAL_FOLLOWUPS)),
        failure_retrieval_miss: is_truthy(field(FIELD_RETRIEVAL_MISS)),
        failure_overconfident_or_drift: is_truthy(field(FIELD_OVERCONFIDENT)),
        comment: coerce_string(field(FIELD_COMMENT)),
    })
}

/// Falsy values (absent, null, false, 0, "") become empty; strings are
/// trimmed; other scalars use their display form. Arrays and objects are
/// treated as absent.
fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => String::new(),
    }
}

/// Numeric reading of a submitted score. Only an absent key has none;
/// null, booleans and blank strings read as numbers (`0`, `0`/`1`, `0`).
/// `None` also covers text that is not a number.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => number_from_text(s),
        Value::Array(items) => number_from_text(&array_text(items)?),
        Value::Object(_) => None,
    }
}

/// Reads a number from text the way a loosely typed form field is read:
/// surrounding whitespace is ignored, blank text is `0`, and `0x`/`0o`/`0b`
/// prefixes select a radix. Non-finite results are returned as-is.
pub fn number_from_text(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return None;
        }
        return u128::from_str_radix(digits, radix).ok().map(|n| n as f64);
    }

    // `f64::from_str` also takes "inf" and "nan" spellings; those are not numbers here.
    if s.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Text form of an array: elements joined by commas, null as empty.
fn array_text(items: &[Value]) -> Option<String> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        parts.push(match item {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Array(inner) => array_text(inner)?,
            Value::Object(_) => return None,
        });
    }
    Some(parts.join(","))
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
