use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::OrderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rejected locally; the request never reached the network.
    InvalidInput,
    NotFound,
    ListFailed,
    FetchFailed,
    CreateFailed,
    DeleteFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::NotFound => "not found",
            ErrorKind::ListFailed => "list failed",
            ErrorKind::FetchFailed => "fetch failed",
            ErrorKind::CreateFailed => "create failed",
            ErrorKind::DeleteFailed => "delete failed",
        };
        f.write_str(label)
    }
}

/// Failure half of an [`OperationResult`]: every remote or local failure of an
/// order operation ends up as one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct OperationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl OperationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn empty_order_id() -> Self {
        Self::new(ErrorKind::InvalidInput, "order id must not be empty")
    }

    pub fn not_found(id: &OrderId) -> Self {
        Self::new(ErrorKind::NotFound, format!("order {id} not found"))
    }
}

pub type OperationResult<T> = Result<T, OperationError>;
