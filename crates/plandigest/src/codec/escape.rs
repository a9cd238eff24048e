//! Field escaping for the compact format.
//!
//! Separators and control characters never appear raw inside a field:
//! `\\`, `\|`, `\;`, `\n`, `\r`, `\t`, and `\xHH` for any other ASCII control.

use std::fmt::Write as _;
use thiserror::Error as ThisError;

pub(crate) const RECORD_SEP: char = ';';
pub(crate) const FIELD_SEP: char = '|';
pub(crate) const ESCAPE: char = '\\';

///
/// EscapeOverflowError
///
/// An escaped field exceeds the configured field bound. Fields are never
/// truncated to fit.
///

#[derive(Clone, Debug, Eq, ThisError, PartialEq)]
#[error("escaped {field} is {len} bytes, exceeding the {max}-byte field limit")]
pub struct EscapeOverflowError {
    pub field: &'static str,
    pub len: usize,
    pub max: usize,
}

/// Append the escaped form of `field` to `out`.
pub(crate) fn escape_into(out: &mut String, field: &str) {
    for ch in field.chars() {
        match ch {
            ESCAPE | FIELD_SEP | RECORD_SEP => {
                out.push(ESCAPE);
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch.is_ascii_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(ch));
            }
            ch => out.push(ch),
        }
    }
}

/// Escape `value` and check it against `max` bytes.
pub(crate) fn escape_bounded(
    name: &'static str,
    value: &str,
    max: usize,
) -> Result<String, EscapeOverflowError> {
    let mut escaped = String::with_capacity(value.len());
    escape_into(&mut escaped, value);
    if escaped.len() > max {
        return Err(EscapeOverflowError {
            field: name,
            len: escaped.len(),
            max,
        });
    }

    Ok(escaped)
}

/// Resolve the character after a `\` (other than `x`).
pub(crate) const fn unescape_simple(ch: char) -> Option<char> {
    match ch {
        ESCAPE | FIELD_SEP | RECORD_SEP => Some(ch),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        _ => None,
    }
}

/// Resolve the two hex digits of a `\xHH` escape to an ASCII control.
pub(crate) fn unescape_hex(high: char, low: char) -> Option<char> {
    let high = high.to_digit(16)?;
    let low = low.to_digit(16)?;
    let ch = char::from_u32(high * 16 + low)?;

    ch.is_ascii_control().then_some(ch)
}

///
/// TESTS
///
