use super::{
    NORMALIZED_FIELDS, NORMALIZED_HEADER, PLAN_FIELDS, PLAN_HEADER,
    escape::{ESCAPE, FIELD_SEP, RECORD_SEP, unescape_hex, unescape_simple},
};
use crate::{
    config::Config,
    error::ErrorClass,
    plan::ChildRole,
    view::{DisplayNode, DisplayRuntime, DisplayTree},
};
use thiserror::Error as ThisError;
use tracing::{debug, instrument};

///
/// DecodeError
///
/// Why a compact plan string was rejected. Input may come from logs written
/// by another version, so every variant is recoverable.
///

#[derive(Clone, Debug, Eq, ThisError, PartialEq)]
pub enum DecodeError {
    #[error("encoded plan is empty")]
    Empty,

    #[error("encoded plan is {len} bytes, exceeding the {max}-byte limit")]
    TooLong { len: usize, max: usize },

    #[error("encoded plan has no format header")]
    MissingHeader,

    #[error("unsupported plan format `{found}`, expected `{expected}`")]
    UnsupportedVersion {
        expected: &'static str,
        found: String,
    },

    #[error("encoded plan has no records")]
    NoRecords,

    #[error("record {record} has {found} fields, expected {expected}")]
    FieldCount {
        record: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid escape sequence at byte {offset}")]
    InvalidEscape { offset: usize },

    #[error("input ends inside an escape sequence")]
    UnterminatedEscape,

    #[error("field at byte {offset} exceeds the {max}-byte field limit")]
    FieldTooLong { offset: usize, max: usize },

    #[error("record {record}: `{value}` is not a valid {field}")]
    InvalidNumber {
        record: usize,
        field: &'static str,
        value: String,
    },

    #[error("record {record}: unknown child role `{role}`")]
    UnknownRole { record: usize, role: String },

    #[error("record {record}: operator name is empty")]
    MissingName { record: usize },

    #[error("record {record}: a depth-0 node cannot carry a role")]
    RootWithRole { record: usize },

    #[error("record {record}: depth {depth} skips a level (at most {expected_max})")]
    DepthJump {
        record: usize,
        depth: usize,
        expected_max: usize,
    },

    #[error("record {record}: depth {depth} exceeds the limit of {max}")]
    TooDeep {
        record: usize,
        depth: usize,
        max: usize,
    },
}

impl DecodeError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::TooLong { .. } | Self::FieldTooLong { .. } | Self::TooDeep { .. } => {
                ErrorClass::Overflow
            }
            _ => ErrorClass::Corruption,
        }
    }
}

///
/// Layout
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Layout {
    Concrete,
    Normalized,
}

impl Layout {
    const fn header(self) -> &'static str {
        match self {
            Self::Concrete => PLAN_HEADER,
            Self::Normalized => NORMALIZED_HEADER,
        }
    }

    const fn fields(self) -> usize {
        match self {
            Self::Concrete => PLAN_FIELDS,
            Self::Normalized => NORMALIZED_FIELDS,
        }
    }
}

/// Decode a compact plan string into its presentation tree.
#[instrument(
    name = "plandigest::codec::decode",
    level = "debug",
    skip_all,
    fields(len = text.len())
)]
pub fn decode_plan(text: &str, config: &Config) -> Result<DisplayTree, DecodeError> {
    decode(text, Layout::Concrete, config).inspect_err(|err| debug!(%err, "rejected plan"))
}

/// Decode normalized plan text into its presentation tree.
#[instrument(
    name = "plandigest::codec::decode_normalized",
    level = "debug",
    skip_all,
    fields(len = text.len())
)]
pub fn decode_normalized_plan(text: &str, config: &Config) -> Result<DisplayTree, DecodeError> {
    decode(text, Layout::Normalized, config)
        .inspect_err(|err| debug!(%err, "rejected normalized plan"))
}

fn decode(text: &str, layout: Layout, config: &Config) -> Result<DisplayTree, DecodeError> {
    // Line breaks are always escaped inside fields; other trailing
    // whitespace may belong to the last field.
    let text = text
        .trim_start()
        .trim_end_matches(|ch: char| ch == '\n' || ch == '\r');
    if text.is_empty() {
        return Err(DecodeError::Empty);
    }
    if text.len() > config.max_plan_bytes {
        return Err(DecodeError::TooLong {
            len: text.len(),
            max: config.max_plan_bytes,
        });
    }

    let header_end = text.find(RECORD_SEP).unwrap_or(text.len());
    check_header(&text[..header_end], layout)?;

    let body = &text[header_end..];
    if body.is_empty() {
        return Err(DecodeError::NoRecords);
    }

    let records = split_records(body, header_end, config.max_field_bytes)?;
    let mut builder = TreeBuilder::new(config.max_depth);
    for (index, fields) in records.into_iter().enumerate() {
        let record = index + 1;
        if fields.len() != layout.fields() {
            return Err(DecodeError::FieldCount {
                record,
                expected: layout.fields(),
                found: fields.len(),
            });
        }
        let (depth, node) = parse_record(record, fields, layout)?;
        builder.push(record, depth, node)?;
    }

    Ok(builder.finish())
}

fn check_header(header: &str, layout: Layout) -> Result<(), DecodeError> {
    if header == layout.header() {
        return Ok(());
    }

    // `PD<n>` / `PN<n>`: a format we recognise, just not this one.
    let versioned = header.len() > 2
        && (header.starts_with("PD") || header.starts_with("PN"))
        && header[2..].bytes().all(|b| b.is_ascii_digit());
    if versioned {
        return Err(DecodeError::UnsupportedVersion {
            expected: layout.header(),
            found: header.to_string(),
        });
    }

    Err(DecodeError::MissingHeader)
}

// Split `;`-prefixed records into unescaped `|` fields. `base` is the byte
// offset of `body` within the trimmed input, for error positions.
fn split_records(body: &str, base: usize, max_field: usize) -> Result<Vec<Vec<String>>, DecodeError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut field_start = base;
    let mut chars = body.char_indices().skip(1);

    while let Some((offset, ch)) = chars.next() {
        match ch {
            RECORD_SEP => {
                fields.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut fields));
                field_start = base + offset + 1;
            }
            FIELD_SEP => {
                fields.push(std::mem::take(&mut field));
                field_start = base + offset + 1;
            }
            ESCAPE => {
                let (_, next) = chars.next().ok_or(DecodeError::UnterminatedEscape)?;
                let resolved = if next == 'x' {
                    let high = chars.next().ok_or(DecodeError::UnterminatedEscape)?.1;
                    let low = chars.next().ok_or(DecodeError::UnterminatedEscape)?.1;
                    unescape_hex(high, low)
                } else {
                    unescape_simple(next)
                };
                field.push(resolved.ok_or(DecodeError::InvalidEscape {
                    offset: base + offset,
                })?);
            }
            ch => field.push(ch),
        }

        if field.len() > max_field {
            return Err(DecodeError::FieldTooLong {
                offset: field_start,
                max: max_field,
            });
        }
    }
    fields.push(field);
    records.push(fields);

    Ok(records)
}

fn parse_record(
    record: usize,
    fields: Vec<String>,
    layout: Layout,
) -> Result<(usize, DisplayNode), DecodeError> {
    let mut fields = fields.into_iter();
    let mut next = || fields.next().unwrap_or_default();

    let depth = parse_number::<usize>(record, "depth", &next())?;
    let role = parse_role(record, &next())?;
    let name = next();
    if name.is_empty() {
        return Err(DecodeError::MissingName { record });
    }
    if depth == 0 && role.is_some() {
        return Err(DecodeError::RootWithRole { record });
    }

    let mut node = DisplayNode::new(name, role);
    match layout {
        Layout::Normalized => {
            node.task = next();
            node.access_object = next();
            node.operator_info = next();
        }
        Layout::Concrete => {
            let id = next();
            if !id.is_empty() {
                node.id = Some(parse_number(record, "node id", &id)?);
            }
            node.task = next();
            node.est_rows = checked_number::<f64>(record, "row estimate", next())?;
            node.est_cost = checked_number::<f64>(record, "cost estimate", next())?;
            node.access_object = next();
            node.operator_info = next();

            let runtime = DisplayRuntime {
                act_rows: checked_number::<u64>(record, "actual row count", next())?,
                execution_info: next(),
                memory: next(),
                disk: next(),
            };
            if runtime != DisplayRuntime::default() {
                node.runtime = Some(runtime);
            }
        }
    }

    Ok((depth, node))
}

fn parse_role(record: usize, role: &str) -> Result<Option<ChildRole>, DecodeError> {
    if role.is_empty() {
        return Ok(None);
    }

    ChildRole::from_label(role)
        .map(Some)
        .ok_or_else(|| DecodeError::UnknownRole {
            record,
            role: role.to_string(),
        })
}

fn parse_number<T: std::str::FromStr>(
    record: usize,
    field: &'static str,
    value: &str,
) -> Result<T, DecodeError> {
    value.parse().map_err(|_| DecodeError::InvalidNumber {
        record,
        field,
        value: value.to_string(),
    })
}

// Numeric display columns stay text but must parse when present.
fn checked_number<T: std::str::FromStr>(
    record: usize,
    field: &'static str,
    value: String,
) -> Result<String, DecodeError> {
    if !value.is_empty() {
        parse_number::<T>(record, field, &value)?;
    }

    Ok(value)
}

///
/// TreeBuilder
///
/// Rebuilds nesting from pre-order `(depth, node)` records without
/// recursion. `path` holds the open ancestors of the next record.
///

struct TreeBuilder {
    max_depth: usize,
    path: Vec<DisplayNode>,
    roots: Vec<DisplayNode>,
}

impl TreeBuilder {
    const fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            path: Vec::new(),
            roots: Vec::new(),
        }
    }

    fn push(&mut self, record: usize, depth: usize, node: DisplayNode) -> Result<(), DecodeError> {
        if depth >= self.max_depth {
            return Err(DecodeError::TooDeep {
                record,
                depth,
                max: self.max_depth,
            });
        }
        if depth > self.path.len() {
            return Err(DecodeError::DepthJump {
                record,
                depth,
                expected_max: self.path.len(),
            });
        }

        self.close_to(depth);
        self.path.push(node);

        Ok(())
    }

    // Close open nodes until `depth` open ancestors remain.
    fn close_to(&mut self, depth: usize) {
        while self.path.len() > depth {
            let Some(done) = self.path.pop() else {
                break;
            };
            match self.path.last_mut() {
                Some(parent) => parent.children.push(done),
                None => self.roots.push(done),
            }
        }
    }

    fn finish(mut self) -> DisplayTree {
        self.close_to(0);

        DisplayTree { roots: self.roots }
    }
}
