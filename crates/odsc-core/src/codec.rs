//! Delimited text encoding for ledger and summary lines.
//!
//! One record is one line of comma-separated fields. A field is wrapped in
//! double quotes only when it contains a comma, a double quote or a line
//! break; embedded quotes are doubled. Line breaks are normalized to `\n`
//! before encoding, so a quoted field may span several physical lines.
//!
//! ```
//! use odsc_core::codec::{decode_line, encode_row};
//!
//! let line = encode_row(["plain", "with, comma", "say \"hi\""]);
//! assert_eq!(line, r#"plain,"with, comma","say ""hi""""#);
//! assert_eq!(decode_line(&line), vec!["plain", "with, comma", "say \"hi\""]);
//! ```

use std::borrow::Cow;

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Rewrites `\r\n` and lone `\r` to `\n`.
pub fn normalize_line_breaks(value: &str) -> Cow<'_, str> {
    if !value.contains('\r') {
        return Cow::Borrowed(value);
    }
    Cow::Owned(value.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Encodes one field. Unchanged unless it needs quoting.
pub fn encode_field(value: &str) -> Cow<'_, str> {
    let normalized = normalize_line_breaks(value);
    let needs_quotes = normalized
        .chars()
        .any(|c| c == DELIMITER || c == QUOTE || c == '\n');
    if !needs_quotes {
        return normalized;
    }

    let mut out = String::with_capacity(normalized.len() + 2);
    out.push(QUOTE);
    for c in normalized.chars() {
        if c == QUOTE {
            out.push(QUOTE);
        }
        out.push(c);
    }
    out.push(QUOTE);
    Cow::Owned(out)
}

/// Encodes and joins fields into one record (no trailing line feed).
pub fn encode_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = String::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            line.push(DELIMITER);
        }
        line.push_str(&encode_field(field.as_ref()));
    }
    line
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Unquoted,
    Quoted,
}

/// Decodes one record into its fields.
///
/// Never fails: unbalanced quotes simply run to the end of the input. A
/// trailing comma yields a trailing empty field.
pub fn decode_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut state = ScanState::Unquoted;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            ScanState::Unquoted => match c {
                DELIMITER => fields.push(std::mem::take(&mut current)),
                QUOTE => state = ScanState::Quoted,
                _ => current.push(c),
            },
            ScanState::Quoted => {
                if c == QUOTE {
                    if chars.peek() == Some(&QUOTE) {
                        chars.next();
                        current.push(QUOTE);
                    } else {
                        state = ScanState::Unquoted;
                    }
                } else {
                    current.push(c);
                }
            }
        }
    }
    fields.push(current);
    fields
}

/// Splits artifact text into records.
///
/// A line feed inside a quoted field belongs to the field, so multi-line
/// values stay in one record. A carriage return directly before a record
/// terminator is dropped.
pub fn split_records(text: &str) -> Vec<&str> {
    let mut records = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, b) in text.bytes().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'\n' if !in_quotes => {
                records.push(trim_cr(&text[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < text.len() {
        records.push(trim_cr(&text[start..]));
    }
    records
}

fn trim_cr(record: &str) -> &str {
    record.strip_suffix('\r').unwrap_or(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plain_fields_are_left_alone() {
        assert_eq!(encode_field("Alice"), "Alice");
        assert_eq!(encode_field(""), "");
        assert_eq!(encode_field("2024-01-01T00:00:00.000Z"), "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn special_characters_force_quoting() {
        assert_eq!(encode_field("a,b"), "\"a,b\"");
        assert_eq!(encode_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(encode_field("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn line_breaks_are_normalized_before_quoting() {
        assert_eq!(encode_field("a\r\nb\rc"), "\"a\nb\nc\"");
    }

    #[test]
    fn trailing_comma_yields_empty_field() {
        assert_eq!(decode_line("a,b,"), vec!["a", "b", ""]);
        assert_eq!(decode_line(""), vec![""]);
    }

    #[test]
    fn doubled_quote_inside_quotes_is_literal() {
        assert_eq!(decode_line(r#""he said ""no""",x"#), vec![r#"he said "no""#, "x"]);
    }

    #[test]
    fn quoted_comma_does_not_split() {
        assert_eq!(decode_line(r#"1,"a,b",2"#), vec!["1", "a,b", "2"]);
    }

    #[test]
    fn split_keeps_quoted_line_feeds_together() {
        let text = "h1,h2\n1,\"multi\nline\"\n\n2,plain\r\n";
        let records = split_records(text);
        assert_eq!(records, vec!["h1,h2", "1,\"multi\nline\"", "", "2,plain"]);
        assert_eq!(decode_line(records[1]), vec!["1", "multi\nline"]);
    }

    #[test]
    fn split_without_trailing_newline_keeps_last_record() {
        assert_eq!(split_records("a\nb"), vec!["a", "b"]);
        assert!(split_records("").is_empty());
    }

    proptest! {
        #[test]
        fn roundtrip_normalizes_line_breaks(fields in proptest::collection::vec("[a-z ,\"\r\n]{0,12}", 1..6)) {
            let line = encode_row(&fields);
            let expected: Vec<String> = fields
                .iter()
                .map(|f| normalize_line_breaks(f).into_owned())
                .collect();
            prop_assert_eq!(decode_line(&line), expected);
        }

        #[test]
        fn encoded_row_is_a_single_record(fields in proptest::collection::vec("[a-z,\"\n]{0,8}", 1..5)) {
            let line = encode_row(&fields);
            let text = format!("{}\n", line);
            prop_assert_eq!(split_records(&text), vec![line.as_str()]);
        }
    }
}
