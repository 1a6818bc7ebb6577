use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum EnaError {
    #[error(
        "unknown catalog parameter: {0} (known: {known})",
        known = crate::catalog::Parameter::NAMES.join(", ")
    )]
    UnknownParameter(String),

    #[error(
        "the result value ({value}) does not correspond to a possible result value in ENA (valid: {})",
        .valid.join(", ")
    )]
    InvalidResult { value: String, valid: Vec<String> },

    #[error(
        "the {parameter} value ({value}) is not valid for {context} (valid: {})",
        .valid.join(", ")
    )]
    InvalidOption {
        parameter: String,
        value: String,
        context: String,
        valid: Vec<String>,
    },

    #[error("the field {field} is not a {kind} field for result {result}")]
    InvalidField {
        field: String,
        kind: String,
        result: String,
    },

    #[error("invalid length value ({value}): {reason}")]
    InvalidLength { value: i64, reason: String },

    #[error("invalid subsequence range: {0}")]
    InvalidRange(String),

    #[error("malformed response ({location}): {message}")]
    MalformedResponse { location: String, message: String },

    #[error("ENA request failed: {0}")]
    UpstreamRequest(String),

    #[error("ENA returned status {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("config file not found at {0}")]
    MissingConfig(PathBuf),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to parse option catalog: {0}")]
    CatalogParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl EnaError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EnaError::UnknownParameter(_)
                | EnaError::InvalidResult { .. }
                | EnaError::InvalidOption { .. }
                | EnaError::InvalidField { .. }
                | EnaError::InvalidLength { .. }
                | EnaError::InvalidRange(_)
                | EnaError::InvalidRequest(_)
        )
    }

    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            EnaError::UpstreamRequest(_) | EnaError::UpstreamStatus { .. }
        )
    }
}
