use super::expr::{Datum, write_joined};
use crate::config::InListPolicy;
use std::fmt;

///
/// Range
///
/// One scan range over a (possibly composite) key. Displays as
/// `[5 3,5 3]`, `(-inf,1)`, or `["b" "aa","b" +inf]`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Range {
    pub low: Vec<Datum>,
    pub high: Vec<Datum>,
    pub low_exclude: bool,
    pub high_exclude: bool,
}

impl Range {
    /// Closed range `[low, high]`.
    #[must_use]
    pub const fn closed(low: Vec<Datum>, high: Vec<Datum>) -> Self {
        Self {
            low,
            high,
            low_exclude: false,
            high_exclude: false,
        }
    }

    /// Single-key point range `[value, value]`.
    #[must_use]
    pub fn point(value: impl Into<Datum>) -> Self {
        let value = value.into();
        Self::closed(vec![value.clone()], vec![value])
    }

    /// `(-inf, high)`.
    #[must_use]
    pub fn less_than(high: impl Into<Datum>) -> Self {
        Self {
            low: vec![Datum::MinNotNull],
            high: vec![high.into()],
            low_exclude: true,
            high_exclude: true,
        }
    }

    /// `(low, +inf]`.
    #[must_use]
    pub fn greater_than(low: impl Into<Datum>) -> Self {
        Self {
            low: vec![low.into()],
            high: vec![Datum::MaxValue],
            low_exclude: true,
            high_exclude: false,
        }
    }

    const fn brackets(&self) -> (char, char) {
        let open = if self.low_exclude { '(' } else { '[' };
        let close = if self.high_exclude { ')' } else { ']' };
        (open, close)
    }

    pub(crate) fn write_normalized(&self, out: &mut String) {
        let (open, close) = self.brackets();
        out.push(open);
        write_joined(out, &self.low, " ", |out, datum| datum.write_normalized_bound(out));
        out.push(',');
        write_joined(out, &self.high, " ", |out, datum| datum.write_normalized_bound(out));
        out.push(close);
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = self.brackets();
        write!(f, "{open}")?;
        write_datums(f, &self.low)?;
        f.write_str(",")?;
        write_datums(f, &self.high)?;
        write!(f, "{close}")
    }
}

fn write_datums(f: &mut fmt::Formatter<'_>, datums: &[Datum]) -> fmt::Result {
    for (idx, datum) in datums.iter().enumerate() {
        if idx > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{datum}")?;
    }
    Ok(())
}

/// Write the normalized form of a range list.
///
/// Under [`InListPolicy::Collapse`] adjacent ranges with the same shape are
/// written once, so point lists of any length normalize identically.
pub(crate) fn write_normalized_ranges(out: &mut String, ranges: &[Range], policy: InListPolicy) {
    let mut previous: Option<String> = None;
    let mut first = true;
    for range in ranges {
        let mut shape = String::new();
        range.write_normalized(&mut shape);
        if policy == InListPolicy::Collapse && previous.as_deref() == Some(shape.as_str()) {
            continue;
        }
        if !first {
            out.push_str(", ");
        }
        first = false;
        out.push_str(&shape);
        previous = Some(shape);
    }
}
