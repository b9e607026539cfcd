//! The crate-wide error and result types.
//!
//! Internally everything is an `anyhow::Error`. At the public edges (command functions, the HTTP
//! server) errors are tagged with an `ErrorType` so that callers can decide how to report them,
//! e.g. as a `404` rather than a `500`.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// A broad classification of what went wrong.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The configuration or home directory is missing or invalid.
    Config,
    /// Reading or writing the data file failed.
    Store,
    /// A transaction with the requested ID does not exist.
    NotFound,
    /// The caller supplied invalid input.
    Request,
    /// Producing an export file failed.
    Export,
    /// The HTTP service failed to start or stopped unexpectedly.
    Service,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An `anyhow::Error` tagged with an `ErrorType`.
pub struct TypedError {
    kind: ErrorType,
    source: Error,
}

impl TypedError {
    pub fn new(kind: ErrorType, source: impl Into<Error>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorType {
        self.kind
    }
}

impl Debug for TypedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.kind, self.source)
    }
}

impl Display for TypedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.source)
    }
}

impl std::error::Error for TypedError {}

/// Tags the error of a `Result` with an `ErrorType`. An error that already carries a type keeps
/// it, so the innermost classification wins.
pub trait IntoResult<T> {
    fn pub_result(self, kind: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for Result<T> {
    fn pub_result(self, kind: ErrorType) -> Result<T> {
        self.map_err(|e| {
            if e.downcast_ref::<TypedError>().is_some() {
                e
            } else {
                TypedError::new(kind, e).into()
            }
        })
    }
}

/// Returns the `ErrorType` that `e` was tagged with, if any.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<TypedError>().map(TypedError::kind)
}

/// Creates an error tagged as `ErrorType::NotFound`.
pub(crate) fn not_found(message: impl Into<String>) -> Error {
    TypedError::new(ErrorType::NotFound, anyhow::anyhow!(message.into())).into()
}

/// Creates an error tagged as `ErrorType::Request`.
pub(crate) fn bad_request(message: impl Into<String>) -> Error {
    TypedError::new(ErrorType::Request, anyhow::anyhow!(message.into())).into()
}
