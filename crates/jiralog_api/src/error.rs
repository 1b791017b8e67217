//! Error model used by Jira API client operations.

use std::io;

use chrono::NaiveDate;
use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JiraError>;

/// Represents the error conditions that can occur during an extraction run:
/// HTTP failures with status and response body, authentication rejections,
/// timeouts, network issues, serialization problems and invalid caller input.
#[derive(Debug, Error)]
pub enum JiraError {
    #[error("http {status} on {endpoint}: {message}")]
    Http {
        status: StatusCode,
        endpoint: String,
        message: String,
    },
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("invalid date range: {from} > {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl JiraError {
    /// Constructs an HTTP error variant carrying the endpoint (with its
    /// query context) and the response body.
    pub fn http(status: StatusCode, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        JiraError::Http {
            status,
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for JiraError {
    /// Converts reqwest errors into semantic JiraError variants.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            JiraError::Timeout(err.to_string())
        } else if err.is_status() {
            let status = err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            JiraError::Http {
                status,
                endpoint: String::new(),
                message: err.to_string(),
            }
        } else if err.is_connect() {
            JiraError::Network(err.to_string())
        } else {
            JiraError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for JiraError {
    /// Converts serde_json decode/encode failures into serialization errors.
    fn from(err: serde_json::Error) -> Self {
        JiraError::Serialization(err.to_string())
    }
}
