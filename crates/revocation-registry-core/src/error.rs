//! Error types for the revocation registry core.
//!
//! Every variant here describes malformed client input. Messages may name a
//! claim, but never carry a token or a claim value.

use thiserror::Error;

use crate::fact::RevocationKind;

/// Errors raised while validating or digesting revocation input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("token must not be empty")]
    EmptyToken,

    #[error("claim set must contain at least one claim")]
    EmptyClaimSet,

    #[error("claim names must not be empty")]
    EmptyClaimName,

    #[error("claim {name:?} appears more than once")]
    DuplicateClaim { name: String },

    #[error("claim name {name:?} contains the separator {separator:?}")]
    SeparatorInClaimName { name: String, separator: char },

    #[error("value of claim {name:?} contains the separator {separator:?}")]
    SeparatorInClaimValue { name: String, separator: char },

    #[error("issued_before {value} is past the largest supported timestamp {max}")]
    IssuedBeforeOutOfRange { value: u64, max: u64 },

    #[error("revocation type {declared:?} does not match data of type {actual:?}")]
    KindMismatch {
        declared: RevocationKind,
        actual: RevocationKind,
    },

    #[error("unknown revocation kind code: {0}")]
    UnknownKindCode(u8),

    #[error("unknown hash algorithm: {0}")]
    UnknownHashAlgorithm(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
