use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Errors returned to the application layer for a bridge call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    #[error("invalid arguments for '{method}': {reason}")]
    InvalidArguments { method: String, reason: String },

    #[error("method '{0}' is not implemented")]
    NotImplemented(String),

    /// Only returned when `strict_permissions` is enabled.
    #[error("location permission not granted for '{0}'")]
    PermissionDenied(String),
}

impl BridgeError {
    pub(crate) fn invalid(method: &str, reason: impl ToString) -> Self {
        BridgeError::InvalidArguments {
            method: method.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Stable error code for the wire.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::InvalidArguments { .. } => "invalid_arguments",
            BridgeError::NotImplemented(_) => "not_implemented",
            BridgeError::PermissionDenied(_) => "permission_denied",
        }
    }
}

impl Serialize for BridgeError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("BridgeError", 2)?;
        s.serialize_field("code", self.code())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
