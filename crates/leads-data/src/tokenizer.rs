//! Line-level CSV field splitting.
//!
//! A field is either a double-quoted span (commas allowed inside, `""` for a
//! literal quote) or an unquoted run up to the next comma. Every field is
//! trimmed; empty fields are kept, including leading and trailing ones.
//!
//! Lines are tokenized independently, so a quoted field cannot span lines. A
//! quote left open at the end of the line, or text after a closing quote,
//! rejects the whole line instead of guessing where the field ends.

use std::iter::Peekable;
use std::str::Chars;

use leads_core::{LeadsError, Result};

const DELIMITER: char = ',';
const QUOTE: char = '"';

// ── Splitting ─────────────────────────────────────────────────────────────────

/// Split one line into trimmed, unquoted field values.
pub fn split_fields(line: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let at_end = if chars.peek() == Some(&QUOTE) {
            chars.next();
            let (value, at_end) = read_quoted(&mut chars, fields.len())?;
            fields.push(value);
            at_end
        } else {
            let (value, at_end) = read_unquoted(&mut chars);
            fields.push(value);
            at_end
        };

        if at_end {
            return Ok(fields);
        }
    }
}

/// `true` when a tokenized line carries at least one non-empty field.
pub fn has_content(fields: &[String]) -> bool {
    fields.iter().any(|f| !f.trim().is_empty())
}

/// Read the rest of a quoted field (opening quote already consumed) and the
/// delimiter after it. Returns the value and whether the line ended.
fn read_quoted(chars: &mut Peekable<Chars<'_>>, field: usize) -> Result<(String, bool)> {
    let mut value = String::new();

    loop {
        match chars.next() {
            None => return Err(LeadsError::UnterminatedQuote { field }),
            Some(QUOTE) if chars.peek() == Some(&QUOTE) => {
                chars.next();
                value.push(QUOTE);
            }
            Some(QUOTE) => break,
            Some(c) => value.push(c),
        }
    }

    let value = value.trim().to_string();
    loop {
        match chars.next() {
            None => return Ok((value, true)),
            Some(DELIMITER) => return Ok((value, false)),
            Some(c) if c.is_whitespace() => continue,
            Some(_) => return Err(LeadsError::TrailingAfterQuote { field }),
        }
    }
}

/// Read an unquoted field up to the next delimiter or end of line.
fn read_unquoted(chars: &mut Peekable<Chars<'_>>) -> (String, bool) {
    let mut value = String::new();
    for c in chars.by_ref() {
        if c == DELIMITER {
            return (value.trim().to_string(), false);
        }
        value.push(c);
    }
    (value.trim().to_string(), true)
}

// ── Writing ───────────────────────────────────────────────────────────────────

/// Render a value as a CSV field, quoting it when it contains a delimiter or
/// a quote. Surrounding whitespace is not preserved: fields are trimmed when
/// read back, quoted or not.
pub fn quote_field(value: &str) -> String {
    let needs_quotes = value.contains([DELIMITER, QUOTE, '\r', '\n']);
    if needs_quotes {
        format!("\"{}\"", value.replace(QUOTE, "\"\""))
    } else {
        value.to_string()
    }
}

/// Render a full line from field values.
pub fn join_fields<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| quote_field(v.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
