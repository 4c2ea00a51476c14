use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    ListRecords,
    CreateRecord,
    DeleteRecord,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreOperation::ListRecords => "list koders",
            StoreOperation::CreateRecord => "create koder",
            StoreOperation::DeleteRecord => "delete koder",
        })
    }
}

/// Any failure talking to the record store: connection errors, non-success
/// statuses and undecodable bodies all land here without further distinction.
#[derive(Debug, Clone, Error)]
#[error("{operation} failed: {message}")]
pub struct TransportError {
    pub operation: StoreOperation,
    pub message: String,
}

impl TransportError {
    pub fn new(operation: StoreOperation, source: impl fmt::Display) -> Self {
        Self {
            operation,
            message: source.to_string(),
        }
    }
}
