//! Error types for the registry.

use revocation_registry_core::{CoreError, Timestamp};
use revocation_registry_store::StoreError;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Malformed revocation input.
    #[error("invalid revocation: {0}")]
    Core(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Unusable configuration, detected at startup.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A poll observed a watermark earlier than one it had already seen.
    #[error("feed watermark moved backwards from {previous} to {current}")]
    WatermarkViolation {
        previous: Timestamp,
        current: Timestamp,
    },
}

/// Coarse error taxonomy for the serving boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The request was malformed. Not retryable.
    InvalidInput,
    /// The backend failed or is unreachable. Retryable with backoff.
    StorageUnavailable,
    /// The feed cannot be served without risking skipped records.
    WatermarkViolation,
}

impl ErrorClass {
    /// Whether the caller is at fault (4xx rather than 5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, ErrorClass::InvalidInput)
    }
}

impl RegistryError {
    pub fn class(&self) -> ErrorClass {
        match self {
            RegistryError::Core(_) => ErrorClass::InvalidInput,
            RegistryError::Store(StoreError::InvalidInput(_)) => ErrorClass::InvalidInput,
            RegistryError::Store(StoreError::WatermarkViolation { .. })
            | RegistryError::WatermarkViolation { .. } => ErrorClass::WatermarkViolation,
            RegistryError::Store(_) | RegistryError::Config(_) => ErrorClass::StorageUnavailable,
        }
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RegistryError::Store(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let invalid = RegistryError::from(StoreError::InvalidInput(CoreError::EmptyToken));
        assert_eq!(invalid.class(), ErrorClass::InvalidInput);
        assert!(invalid.class().is_client_error());
        assert!(!invalid.is_retryable());

        let down = RegistryError::from(StoreError::Unavailable("mutex poisoned".into()));
        assert_eq!(down.class(), ErrorClass::StorageUnavailable);
        assert!(!down.class().is_client_error());
        assert!(down.is_retryable());

        let regressed = RegistryError::from(StoreError::WatermarkViolation {
            previous: Timestamp(20),
            current: Timestamp(10),
        });
        assert_eq!(regressed.class(), ErrorClass::WatermarkViolation);
        assert!(!regressed.is_retryable());
    }

    #[test]
    fn test_messages_never_carry_claim_values() {
        let err = RegistryError::from(CoreError::SeparatorInClaimValue {
            name: "realm".into(),
            separator: '|',
        });
        let msg = err.to_string();
        assert!(msg.contains("realm"));
        assert!(!msg.contains("employees"));
    }
}
