//! Compact, single-line plan codec.
//!
//! Layout: a format header followed by one `;`-prefixed record per node in
//! pre-order, each record a fixed number of `|`-separated escaped fields.
//! The first field is the node depth (roots are 0), the second its role.
//!
//! ```text
//! PD1;0||Limit|1|root|4.00|||offset:0, count:960||||;1||IndexLookUp|2|...
//! ```
//!
//! `PD1` records carry 13 fields: depth, role, name, id, task, estRows,
//! estCost, access object, operator info, actRows, execution info, memory,
//! disk. `PN1` (normalized text) records carry 6: depth, role, name, task,
//! access object, operator info.

mod decode;
mod encode;
mod escape;

#[cfg(test)]
mod tests;

pub use decode::{DecodeError, decode_normalized_plan, decode_plan};
pub use encode::encode_plan;
pub use escape::EscapeOverflowError;

pub(crate) use encode::encode_normalized;

use crate::error::ErrorClass;
use thiserror::Error as ThisError;

pub(crate) const PLAN_HEADER: &str = "PD1";
pub(crate) const NORMALIZED_HEADER: &str = "PN1";

pub(crate) const PLAN_FIELDS: usize = 13;
pub(crate) const NORMALIZED_FIELDS: usize = 6;

///
/// EncodeError
///

#[derive(Clone, Debug, Eq, ThisError, PartialEq)]
pub enum EncodeError {
    #[error("cannot encode `{kind}`: not an executable plan node")]
    UnsupportedNodeKind { kind: &'static str },

    #[error(transparent)]
    EscapeOverflow(#[from] EscapeOverflowError),

    #[error("plan depth {depth} exceeds the limit of {max}")]
    TooDeep { depth: usize, max: usize },

    #[error("encoded plan exceeds the {max}-byte limit")]
    TooLong { max: usize },
}

impl EncodeError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedNodeKind { .. } => ErrorClass::Internal,
            Self::EscapeOverflow(_) | Self::TooDeep { .. } | Self::TooLong { .. } => {
                ErrorClass::Overflow
            }
        }
    }
}
