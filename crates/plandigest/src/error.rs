use crate::{
    codec::{DecodeError, EncodeError},
    config::ConfigError,
    normalize::NormalizeError,
    plan::PlanError,
};
use thiserror::Error as ThisError;

///
/// ErrorClass
///
/// Stable classification that callers use to pick a policy: internal errors
/// fail the request, everything else may be reported and skipped.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// A plan shape this crate cannot represent faithfully.
    Internal,
    /// Persisted text that is malformed, truncated, or from another version.
    Corruption,
    /// A value that does not fit the compact format's configured bounds.
    Overflow,
    /// Caller-supplied configuration or plan construction input.
    InvalidInput,
}

impl ErrorClass {
    #[must_use]
    pub const fn is_recoverable(self) -> bool {
        !matches!(self, Self::Internal)
    }
}

///
/// Error
///
/// Umbrella error for callers that drive several components at once.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Plan(_) | Self::Config(_) => ErrorClass::InvalidInput,
            Self::Normalize(err) => err.class(),
            Self::Encode(err) => err.class(),
            Self::Decode(err) => err.class(),
        }
    }
}

///
/// TESTS
///
