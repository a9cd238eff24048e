use plandigest::{Config, ConfigError, DecodeError, DisplayTree, decode_normalized_plan, decode_plan};
use std::{
    fmt::Display,
    io::{self, BufRead, Write},
};
use thiserror::Error as ThisError;
use tracing::{debug, warn};

/// Marker the server writes before an encoded plan in its logs.
pub const LOG_PREFIX: &str = "# Plan: ";

///
/// PlanKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlanKind {
    Concrete,
    Normalized,
}

impl PlanKind {
    fn decode(self, text: &str, config: &Config) -> Result<DisplayTree, DecodeError> {
        match self {
            Self::Concrete => decode_plan(text, config),
            Self::Normalized => decode_normalized_plan(text, config),
        }
    }
}

///
/// CliError
///
/// Failures that stop the run. A line that does not decode is reported and
/// skipped instead.
///

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Open { path: String, source: io::Error },

    #[error("invalid config {path}: {source}")]
    Config { path: String, source: ConfigError },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("cannot serialize decoded plan: {0}")]
    Json(#[from] serde_json::Error),
}

///
/// Summary
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    pub decoded: usize,
    pub failed: usize,
}

/// Decode one plan per input line into `out`; report bad lines to `err`
/// and keep going. Blank lines are skipped.
pub fn decode_lines<R, W, E>(
    mut input: R,
    out: &mut W,
    err: &mut E,
    kind: PlanKind,
    config: &Config,
    json: bool,
) -> Result<Summary, CliError>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut summary = Summary::default();
    let mut buf = Vec::new();
    let mut number = 0;

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        number += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(utf8) => {
                let reason = format!("invalid UTF-8 at byte {}", utf8.valid_up_to());
                report(err, number, &reason)?;
                summary.failed += 1;
                continue;
            }
        };
        let text = plan_text(line);
        if text.is_empty() {
            continue;
        }

        match kind.decode(text, config) {
            Ok(tree) => {
                if json {
                    serde_json::to_writer(&mut *out, &tree)?;
                    writeln!(out)?;
                } else {
                    writeln!(out, "{tree}")?;
                }
                summary.decoded += 1;
            }
            Err(reason) => {
                report(err, number, &reason)?;
                summary.failed += 1;
            }
        }
    }
    debug!(decoded = summary.decoded, failed = summary.failed, "decoded input");

    Ok(summary)
}

fn report<E: Write>(err: &mut E, number: usize, reason: &dyn Display) -> io::Result<()> {
    warn!(line = number, %reason, "could not parse log line");
    writeln!(err, "could not parse log line {number}: {reason}")
}

// Only line breaks are stripped at the end: trailing spaces may belong to the
// last field.
fn plan_text(line: &str) -> &str {
    let line = line
        .trim_start()
        .trim_end_matches(|ch: char| ch == '\n' || ch == '\r');

    line.strip_prefix(LOG_PREFIX.trim_end())
        .map_or(line, str::trim_start)
}

///
/// TESTS
///
