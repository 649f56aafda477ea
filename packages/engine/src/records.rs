//! Structured-record codec.
//!
//! A located region carries its payload as a bracketed array of record
//! literals inside one attribute, e.g. `flights={[ {...}, {...} ]}`. The
//! attribute is never an array of arrays, so a single non-nested regex
//! capture between the attribute's `[` and `]` is safe; record boundaries
//! inside the capture are then found with a brace-depth scan, which is
//! what lets the codec handle arbitrarily nested sub-records (travelers,
//! roomDescription) without a parser.
//!
//! Decoding is tolerant: a record missing an optional field still
//! decodes, and a record missing a family-required field is skipped with
//! a diagnostic instead of aborting the rest of the array.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::tags::TagFamily;

const INDENT: &str = "  ";

/// One field value inside a record literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordValue {
    Str(String),
    Int(i64),
    Record(Record),
}

/// A brace-delimited record literal as ordered key/value pairs. Field
/// order is preserved through decode and encode, so a round trip keeps
/// the original field sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, RecordValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an existing one in place (position kept) or
    /// appending a new one.
    pub fn insert(&mut self, key: &str, value: RecordValue) {
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.fields.push((key.to_string(), value));
        }
    }

    pub fn with_str(mut self, key: &str, value: &str) -> Self {
        self.insert(key, RecordValue::Str(value.to_string()));
        self
    }

    pub fn with_int(mut self, key: &str, value: i64) -> Self {
        self.insert(key, RecordValue::Int(value));
        self
    }

    pub fn with_record(mut self, key: &str, value: Record) -> Self {
        self.insert(key, RecordValue::Record(value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(RecordValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn int_field(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(RecordValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn fields(&self) -> &[(String, RecordValue)] {
        &self.fields
    }
}

/// Capture everything between the attribute's `[` and `]`. Safe as a
/// non-nested capture because the attribute value is never an array of
/// arrays.
fn attr_array_regex(attribute: &str) -> Regex {
    let pattern = format!(
        r#"\b{attr}=\{{\s*\[([\s\S]*?)\]\s*\}}"#,
        attr = regex::escape(attribute)
    );
    Regex::new(&pattern).expect("escaped attribute pattern")
}

/// Split an array body into complete record literals by brace depth:
/// whenever the depth returns to zero, the span since it left zero is
/// exactly one record, however deeply its sub-objects nest. Escaped
/// braces do not count.
fn split_record_literals(body: &str) -> Vec<&str> {
    let mut literals = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut escaped = false;

    for (i, b) in body.bytes().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b'{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            b'}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        literals.push(&body[start..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        warn!(depth, "unterminated record literal at end of array body");
    }
    literals
}

static KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*:\s*").unwrap());
static INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+").unwrap());

/// Scan a string literal starting at its opening quote. Returns the
/// unescaped value and the byte length consumed, or `None` if the literal
/// never closes.
fn scan_string_literal(text: &str) -> Option<(String, usize)> {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, '"')) => {}
        _ => return None,
    }

    let mut value = String::new();
    let mut escaped = false;
    for (i, c) in chars {
        if escaped {
            match c {
                '"' => value.push('"'),
                '\\' => value.push('\\'),
                'n' => value.push('\n'),
                other => {
                    value.push('\\');
                    value.push(other);
                }
            }
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some((value, i + 1));
        } else {
            value.push(c);
        }
    }
    None
}

/// Scan a brace literal starting at its opening `{`, returning the full
/// literal including both braces.
fn scan_brace_literal(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, b) in text.bytes().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Field-extract one record literal (including its outer braces). String
/// fields un-escape `\"`, numeric fields parse as integers, nested
/// sub-objects recurse. Unparseable values are skipped, never fatal.
fn decode_record_literal(literal: &str) -> Record {
    let inner = literal
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(literal);

    let mut record = Record::new();
    let mut pos = 0usize;

    while let Some(caps) = KEY_RE.captures(&inner[pos..]) {
        let (Some(whole), Some(key_match)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let key = key_match.as_str().to_string();
        let value_start = pos + whole.end();
        let rest = &inner[value_start..];

        match rest.as_bytes().first() {
            Some(b'"') => match scan_string_literal(rest) {
                Some((value, consumed)) => {
                    record.insert(&key, RecordValue::Str(value));
                    pos = value_start + consumed;
                }
                None => {
                    warn!(%key, "unterminated string value, skipping rest of record");
                    break;
                }
            },
            Some(b'{') => match scan_brace_literal(rest) {
                Some(nested) => {
                    record.insert(&key, RecordValue::Record(decode_record_literal(nested)));
                    pos = value_start + nested.len();
                }
                None => {
                    warn!(%key, "unterminated nested record, skipping rest of record");
                    break;
                }
            },
            _ => match INT_RE.find(rest) {
                Some(m) => match m.as_str().parse::<i64>() {
                    Ok(n) => {
                        record.insert(&key, RecordValue::Int(n));
                        pos = value_start + m.end();
                    }
                    Err(_) => {
                        debug!(%key, "integer out of range, skipping field");
                        pos = value_start + m.end();
                    }
                },
                None => {
                    debug!(%key, "unrecognized value shape, skipping field");
                    pos = value_start;
                    // Move past the key so the scan always advances.
                    if pos >= inner.len() {
                        break;
                    }
                }
            },
        }

        if pos >= inner.len() {
            break;
        }
    }

    record
}

/// Decode the record array held by `attribute` inside a located region.
///
/// Read path: a region without the attribute (or with an empty array)
/// decodes to an empty vec rather than failing, so preview rendering
/// stays resilient to partially-generated content.
pub fn decode_records(region: &str, attribute: &str) -> Vec<Record> {
    let Some(caps) = attr_array_regex(attribute).captures(region) else {
        debug!(attribute, "records attribute not present in region");
        return Vec::new();
    };
    let body = match caps.get(1) {
        Some(m) => m.as_str(),
        None => return Vec::new(),
    };

    split_record_literals(body)
        .into_iter()
        .map(decode_record_literal)
        .collect()
}

/// Decode a family's record array, skipping records that lack one of the
/// family's required fields.
pub fn decode_family_records(region: &str, family: &TagFamily) -> Vec<Record> {
    decode_records(region, family.records_attribute)
        .into_iter()
        .filter(|record| {
            let missing: Vec<&str> = family
                .required_fields
                .iter()
                .copied()
                .filter(|field| !record.has(field))
                .collect();
            if missing.is_empty() {
                true
            } else {
                warn!(
                    tag = family.tag_name,
                    ?missing,
                    "skipping record missing required fields"
                );
                false
            }
        })
        .collect()
}

pub(crate) fn escape_string_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

fn write_value(out: &mut String, value: &RecordValue, level: usize) {
    match value {
        RecordValue::Str(s) => {
            out.push('"');
            out.push_str(&escape_string_value(s));
            out.push('"');
        }
        RecordValue::Int(n) => out.push_str(&n.to_string()),
        RecordValue::Record(record) => write_record(out, record, level),
    }
}

fn write_record(out: &mut String, record: &Record, level: usize) {
    out.push_str("{\n");
    let inner = INDENT.repeat(level + 1);
    for (i, (key, value)) in record.fields().iter().enumerate() {
        out.push_str(&inner);
        out.push_str(key);
        out.push_str(": ");
        write_value(out, value, level + 1);
        if i + 1 < record.fields().len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str(&INDENT.repeat(level));
    out.push('}');
}

/// Render records as multi-line brace literals with stable field order,
/// joined with comma-newline separators. Exact inverse of the decode as
/// far as field values are concerned; whitespace is normalized.
pub fn encode_records(records: &[Record]) -> String {
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        out.push_str(INDENT);
        write_record(&mut out, record, 1);
        if i + 1 < records.len() {
            out.push_str(",\n");
        }
    }
    out
}

/// Splice an edited record array back between the attribute's original
/// `[`/`]` markers. Everything outside the markers is left untouched.
pub fn replace_records(
    region: &str,
    attribute: &str,
    records: &[Record],
) -> EngineResult<String> {
    let caps = attr_array_regex(attribute)
        .captures(region)
        .ok_or_else(|| EngineError::MissingAttribute(attribute.to_string()))?;
    let body = caps
        .get(1)
        .ok_or_else(|| EngineError::MissingAttribute(attribute.to_string()))?;

    let new_body = if records.is_empty() {
        String::new()
    } else {
        format!("\n{}\n", encode_records(records))
    };

    let mut out = String::with_capacity(region.len() + new_body.len());
    out.push_str(&region[..body.start()]);
    out.push_str(&new_body);
    out.push_str(&region[body.end()..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::AIRPLANE_SECTION;

    const REGION: &str = r#"<AirplaneSection id="user_airplane_7" flights={[
  {
    airline: "KLM",
    flightNumber: 1601,
    notes: "seat 12A \"window\"",
    travelers: {
      adults: 2,
      children: 1
    }
  },
  {
    airline: "TAP",
    flightNumber: 665
  }
]} />"#;

    #[test]
    fn test_decode_records_with_nested_sub_object() {
        let records = decode_records(REGION, "flights");
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.str_field("airline"), Some("KLM"));
        assert_eq!(first.int_field("flightNumber"), Some(1601));
        assert_eq!(first.str_field("notes"), Some("seat 12A \"window\""));

        let travelers = match first.get("travelers") {
            Some(RecordValue::Record(r)) => r,
            other => panic!("expected nested record, got {other:?}"),
        };
        assert_eq!(travelers.int_field("adults"), Some(2));
        assert_eq!(travelers.int_field("children"), Some(1));

        assert_eq!(records[1].str_field("airline"), Some("TAP"));
    }

    #[test]
    fn test_decode_missing_attribute_is_empty() {
        assert!(decode_records(REGION, "hotels").is_empty());
    }

    #[test]
    fn test_decode_empty_array() {
        let region = r#"<AirplaneSection id="user_airplane_1" flights={[]} />"#;
        assert!(decode_records(region, "flights").is_empty());
    }

    #[test]
    fn test_round_trip_preserves_field_values() {
        let records = decode_records(REGION, "flights");
        let encoded = encode_records(&records);
        let region = format!(r#"<X id="user_airplane_9" flights={{[{encoded}]}} />"#);
        let again = decode_records(&region, "flights");
        assert_eq!(records, again);

        // And once more, to pin the fixed point.
        let encoded_again = encode_records(&again);
        assert_eq!(encoded, encoded_again);
    }

    #[test]
    fn test_family_decode_skips_record_missing_required_field() {
        let region = r#"<AirplaneSection id="user_airplane_7" flights={[
  {
    airline: "KLM",
    flightNumber: 1601
  },
  {
    airline: "TAP"
  }
]} />"#;
        let records = decode_family_records(region, &AIRPLANE_SECTION);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].str_field("airline"), Some("KLM"));
    }

    #[test]
    fn test_replace_records_touches_only_the_array() {
        let records = vec![Record::new()
            .with_str("airline", "LH")
            .with_int("flightNumber", 992)];
        let replaced = replace_records(REGION, "flights", &records).unwrap();

        assert!(replaced.starts_with(r#"<AirplaneSection id="user_airplane_7" flights={["#));
        assert!(replaced.ends_with("]} />"));
        assert!(replaced.contains("airline: \"LH\""));
        assert!(!replaced.contains("KLM"));
    }

    #[test]
    fn test_replace_records_missing_attribute_errors() {
        let err = replace_records(REGION, "hotels", &[]).unwrap_err();
        assert_eq!(err, EngineError::MissingAttribute("hotels".to_string()));
    }

    #[test]
    fn test_record_insert_replaces_in_place() {
        let mut record = Record::new().with_str("airline", "KLM").with_int("flightNumber", 1);
        record.insert("airline", RecordValue::Str("TAP".to_string()));

        assert_eq!(record.fields().len(), 2);
        assert_eq!(record.fields()[0].0, "airline");
        assert_eq!(record.str_field("airline"), Some("TAP"));
    }
}
