//! Response Parser: pulls structure out of free-form model output.
//!
//! Two shapes are recognised:
//! - numbered lines ("1. ...", "2. ..."), paired positionally with the inputs;
//! - the first balanced `{...}` region, decoded as a JSON object.
//!
//! The check is syntactic only. Field values are read leniently (numbers may be
//! strings, lists may be a single string) and never range-checked, so consumers
//! must treat numeric fields defensively. Failures come back as `ParseError`
//! values; callers choose their own fallback and never re-ask the model.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("no numbered lines in model output")]
    NoNumberedLines,

    #[error("no JSON object in model output")]
    NoObject,

    #[error("malformed JSON object: {0}")]
    Malformed(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Numbered lines
// ────────────────────────────────────────────────────────────────────────────

/// Returns the body of every line that starts with an ordinal marker, in order.
pub fn numbered_lines(text: &str) -> Result<Vec<String>, ParseError> {
    let lines: Vec<String> = text
        .lines()
        .filter_map(|line| strip_ordinal(line.trim()))
        .map(String::from)
        .collect();

    if lines.is_empty() {
        Err(ParseError::NoNumberedLines)
    } else {
        Ok(lines)
    }
}

fn strip_ordinal(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix('.').map(str::trim)
}

/// Zips originals with rewritten lines by position. Short output truncates;
/// nothing is padded.
pub fn pair_positionally<T>(
    originals: &[String],
    rewritten: Vec<String>,
    mut pair: impl FnMut(&str, String) -> T,
) -> Vec<T> {
    originals
        .iter()
        .zip(rewritten)
        .map(|(original, line)| pair(original, line))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Objects
// ────────────────────────────────────────────────────────────────────────────

/// Decodes the first balanced `{...}` region of `text` as a JSON object.
pub fn first_object(text: &str) -> Result<Map<String, Value>, ParseError> {
    let region = object_region(text)?;
    match serde_json::from_str::<Value>(region) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ParseError::Malformed(format!("expected an object, got {other}"))),
        Err(e) => Err(ParseError::Malformed(e.to_string())),
    }
}

/// Finds the first `{` and its matching `}`, skipping braces inside string literals.
fn object_region(text: &str) -> Result<&str, ParseError> {
    let start = text.find('{').ok_or(ParseError::NoObject)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    Err(ParseError::Malformed("unterminated object".to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient field readers
// ────────────────────────────────────────────────────────────────────────────

/// Reads a number, accepting numeric strings such as `"85"` or `"85%"`.
pub fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

/// Reads a value as display text. Missing and null become empty.
pub fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

/// Reads a list of strings. A lone string becomes a one-element list.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| text(Some(item)))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}
