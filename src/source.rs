use alloy::{
    network::Network,
    primitives::BlockNumber,
    rpc::types::{Filter, Log},
};

use crate::{ScannerError, provider::ChainProvider};

/// The two chain reads the vault scanner depends on.
///
/// [`ChainProvider`] is the production implementation. Tests substitute a stub that returns
/// canned logs per block window.
pub trait LogSource {
    /// Returns the current head block height.
    fn latest_block(&self) -> impl Future<Output = Result<BlockNumber, ScannerError>> + Send;

    /// Returns the logs matching `filter`, including its block range.
    fn logs(&self, filter: &Filter) -> impl Future<Output = Result<Vec<Log>, ScannerError>> + Send;
}

impl<N: Network> LogSource for ChainProvider<N> {
    async fn latest_block(&self) -> Result<BlockNumber, ScannerError> {
        Ok(self.get_block_number().await?)
    }

    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, ScannerError> {
        Ok(self.get_logs(filter).await?)
    }
}
