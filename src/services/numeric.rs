//! Numeric normalization for human- and AI-formatted values.
//!
//! Every extraction result passes through here before it reaches precedence
//! logic: "$275M", "1,234,567", "5M shares" and friends all become canonical
//! floats, and the usual not-a-value sentinels become `None`. Parsing is
//! total; nothing in this module can fail.

use serde_json::Value;

/// Strings that mean "no value", compared case-insensitively.
const NON_VALUES: &[&str] = &["N/A", "NA", "TBD", "TBA", "-", "NONE", "NULL"];

/// Trailing words that may follow a magnitude suffix.
const UNIT_WORDS: &[&str] = &["shares", "share", "million", "billion", "trillion", "thousand"];

/// Parse any JSON value into a canonical float.
///
/// Numbers pass through, strings go through the full normalization, and
/// everything else (null, bool, arrays, objects) is `None`.
pub fn parse(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_str(s),
        _ => None,
    }
}

/// Parse a formatted numeric string into a canonical float.
pub fn parse_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if NON_VALUES.iter().any(|nv| nv.eq_ignore_ascii_case(trimmed)) {
        return None;
    }

    // Strip currency symbols and thousands separators, keeping the magnitude
    // suffix (if any) attached to the digits.
    let mut cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ','))
        .collect::<String>()
        .trim()
        .to_string();

    // "5M shares" -> "5M"; the unit word adds nothing once the suffix is kept.
    for unit in UNIT_WORDS {
        if let Some(stripped) = cleaned
            .to_lowercase()
            .strip_suffix(unit)
            .map(|s| s.trim_end().len())
        {
            cleaned.truncate(stripped);
            break;
        }
    }
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    // Magnitude suffix: K/M/B/T, case-insensitive.
    let last = cleaned.chars().last()?;
    let multiplier = match last.to_ascii_uppercase() {
        'K' => Some(1e3),
        'M' => Some(1e6),
        'B' => Some(1e9),
        'T' => Some(1e12),
        _ => None,
    };

    if let Some(mult) = multiplier {
        let mantissa = cleaned[..cleaned.len() - last.len_utf8()].trim();
        return mantissa.parse::<f64>().ok().map(|v| v * mult);
    }

    cleaned.parse::<f64>().ok()
}

/// Apply `parse` to each named field of an extraction result, in place.
///
/// Fields that are absent or already null stay untouched; named fields that
/// fail to parse become null. Keys not named are never modified. This is the
/// mandatory gate between generative-extraction output and persistence.
pub fn sanitize_fields(map: &mut serde_json::Map<String, Value>, fields: &[&str]) {
    for field in fields {
        if let Some(value) = map.get_mut(*field) {
            if value.is_null() {
                continue;
            }
            *value = match parse(value) {
                Some(n) => serde_json::json!(n),
                None => Value::Null,
            };
        }
    }
}
