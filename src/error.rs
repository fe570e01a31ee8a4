use std::sync::Arc;

use alloy::transports::{RpcError, TransportErrorKind};
use thiserror::Error;

use crate::provider::Error as ProviderError;

/// Errors emitted while scanning, filtering or persisting whitelisted vaults.
///
/// Every variant is terminal: the scanner never recovers locally, and a failed run leaves the
/// output file untouched.
#[derive(Error, Debug, Clone)]
pub enum ScannerError {
    /// The underlying RPC transport returned an error.
    #[error("RPC error: {0}")]
    RpcError(Arc<RpcError<TransportErrorKind>>),

    /// A single RPC call exceeded the provider's call timeout.
    #[error("Operation timed out")]
    Timeout,

    /// The whole scan exceeded its configured deadline.
    #[error("Scan deadline exceeded")]
    DeadlineExceeded,

    /// A fetched log could not be decoded as `VaultWhitelistedStatusUpdated`.
    #[error("Failed to decode log: {0}")]
    Decode(Arc<alloy::sol_types::Error>),

    /// The output artifact could not be encoded or decoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(Arc<serde_json::Error>),

    /// Reading or writing the output artifact failed.
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    /// The configured window size is invalid (must be greater than zero).
    #[error("Max block range must be greater than 0")]
    InvalidMaxBlockRange,

    /// The configured fan-out width is invalid (must be greater than zero).
    #[error("Fan-out must be greater than 0")]
    InvalidFanOut,
}

impl From<ProviderError> for ScannerError {
    fn from(error: ProviderError) -> ScannerError {
        match error {
            ProviderError::Timeout => ScannerError::Timeout,
            ProviderError::RpcError(err) => ScannerError::RpcError(err),
        }
    }
}

impl From<RpcError<TransportErrorKind>> for ScannerError {
    fn from(error: RpcError<TransportErrorKind>) -> Self {
        ScannerError::RpcError(Arc::new(error))
    }
}

impl From<alloy::sol_types::Error> for ScannerError {
    fn from(error: alloy::sol_types::Error) -> Self {
        ScannerError::Decode(Arc::new(error))
    }
}

impl From<serde_json::Error> for ScannerError {
    fn from(error: serde_json::Error) -> Self {
        ScannerError::Serialization(Arc::new(error))
    }
}

impl From<std::io::Error> for ScannerError {
    fn from(error: std::io::Error) -> Self {
        ScannerError::Io(Arc::new(error))
    }
}
