use serde::{Deserialize, Serialize};
use thiserror::Error;

/// In-band failure body returned by the interview services with a 2xx status,
/// e.g. `{"error": "No session found with this ID"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    pub error: String,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error("service rejected request: {message}")]
pub struct ServiceException {
    pub message: String,
}

impl From<ServiceError> for ServiceException {
    fn from(value: ServiceError) -> Self {
        Self {
            message: value.error,
        }
    }
}
