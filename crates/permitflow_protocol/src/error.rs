//! Error taxonomy for the permit core.
//!
//! Every variant is recoverable at the call site; none of them should crash
//! the process, and the core never downgrades a denial into a no-op success.

use thiserror::Error;

/// Permit operation result type.
pub type Result<T> = std::result::Result<T, PermitError>;

/// Permit core errors.
#[derive(Error, Debug)]
pub enum PermitError {
    /// Creation-time invariant violated. Surfaced before any write.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Actor's role/identity does not satisfy a gate. The message names the
    /// specific unmet condition.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Status-transition gate not satisfied.
    #[error("Precondition not met: {0}")]
    PreconditionNotMet(String),

    /// Referenced permit id does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Underlying store/identity call failed. Distinct from the permission
    /// variants so callers can tell "not allowed" from "backend unreachable".
    #[error("Gateway failure: {0}")]
    Gateway(String),
}

impl PermitError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a permission-denied error.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a precondition error.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionNotMet(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a gateway error.
    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }
}

impl From<std::io::Error> for PermitError {
    fn from(err: std::io::Error) -> Self {
        Self::Gateway(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for PermitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Gateway(format!("Serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_condition() {
        let err = PermitError::precondition("falta firma de solicitante");
        assert_eq!(
            err.to_string(),
            "Precondition not met: falta firma de solicitante"
        );
    }

    #[test]
    fn test_io_maps_to_gateway() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "down");
        let err: PermitError = io.into();
        assert!(matches!(err, PermitError::Gateway(_)));
    }
}
