use std::{sync::Arc, time::Duration};

use alloy::{
    network::{Ethereum, Network},
    primitives::BlockNumber,
    providers::{Provider, RootProvider},
    rpc::types::{Filter, Log},
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;
use tokio::time::{error::Elapsed, timeout};

/// Errors returned by [`ChainProvider`] calls.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("Operation timed out")]
    Timeout,
    #[error("RPC call failed: {0}")]
    RpcError(Arc<RpcError<TransportErrorKind>>),
}

impl From<RpcError<TransportErrorKind>> for Error {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        Error::RpcError(Arc::new(err))
    }
}

impl From<Elapsed> for Error {
    fn from(_: Elapsed) -> Self {
        Error::Timeout
    }
}

/// Handle to a chain RPC endpoint.
///
/// Wraps an Alloy [`RootProvider`] and exposes the two reads the vault scanner needs: the current
/// head height and event logs for a filter. Each call is optionally bounded by a per-call timeout.
/// Calls are never retried; the first failure is returned to the caller.
#[derive(Clone, Debug)]
pub struct ChainProvider<N: Network = Ethereum> {
    pub(crate) root: RootProvider<N>,
    pub(crate) call_timeout: Option<Duration>,
}

impl<N: Network> ChainProvider<N> {
    /// Get a reference to the wrapped provider
    #[must_use]
    pub fn root(&self) -> &RootProvider<N> {
        &self.root
    }

    /// Returns the per-call timeout, if one is configured.
    #[must_use]
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout
    }

    /// Fetch the latest block number.
    ///
    /// # Errors
    ///
    /// * [`Error::Timeout`] if the call timeout elapses.
    /// * [`Error::RpcError`] if the RPC call fails.
    pub async fn get_block_number(&self) -> Result<BlockNumber, Error> {
        info!("eth_blockNumber called");
        let result = self
            .run_with_timeout(|provider| async move { provider.get_block_number().await })
            .await;
        if let Err(e) = &result {
            error!(error = %e, "eth_blockNumber failed");
        }
        result
    }

    /// Fetch logs for the given [`Filter`].
    ///
    /// # Errors
    ///
    /// * [`Error::Timeout`] if the call timeout elapses.
    /// * [`Error::RpcError`] if the RPC call fails.
    pub async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>, Error> {
        info!("eth_getLogs called");
        let result = self
            .run_with_timeout(move |provider| async move { provider.get_logs(filter).await })
            .await;
        if let Err(e) = &result {
            error!(error = %e, "eth_getLogs failed");
        }
        result
    }

    /// Execute `operation` against the wrapped provider, bounded by the call timeout when set.
    pub(crate) async fn run_with_timeout<T, F, Fut>(&self, operation: F) -> Result<T, Error>
    where
        F: FnOnce(RootProvider<N>) -> Fut,
        Fut: Future<Output = Result<T, RpcError<TransportErrorKind>>>,
    {
        let call = operation(self.root.clone());
        match self.call_timeout {
            Some(limit) => timeout(limit, call).await?.map_err(Error::from),
            None => call.await.map_err(Error::from),
        }
    }
}
