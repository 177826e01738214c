use thiserror::Error;

use crate::http_client::HttpError;

/// Recognized API error: the proxy answered with a status and a message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    status: String,
    message: String,
}

impl ApiError {
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }

    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        Self::new(status.to_string(), message)
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure of a single call through the API-call capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] HttpError),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Failure of an order submission, as surfaced to the form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error(transparent)]
    Call(#[from] CallError),

    /// The call went through but the broker reported `success: false`.
    #[error("{message}")]
    Rejected { message: String },
}

impl OrderError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Text shown in the form's error slot.
    pub fn user_message(&self) -> String {
        match self {
            Self::Call(CallError::Api(api)) => {
                format!("Error {}: {}", api.status(), api.message())
            }
            other => format!("Error: {other}"),
        }
    }
}

/// Invalid configuration input from the environment or command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer: '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("base url must start with http:// or https://: '{value}'")]
    InvalidBaseUrl { value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_includes_status() {
        let error = OrderError::from(CallError::from(ApiError::from_http_status(400, "bad price")));
        assert_eq!(error.user_message(), "Error 400: bad price");
    }

    #[test]
    fn rejection_message_has_no_status() {
        let error = OrderError::rejected("bad price");
        assert_eq!(error.user_message(), "Error: bad price");
    }

    #[test]
    fn transport_message_has_no_status() {
        let error = OrderError::from(CallError::from(HttpError::new("connection failed")));
        assert_eq!(error.user_message(), "Error: connection failed");
    }
}
