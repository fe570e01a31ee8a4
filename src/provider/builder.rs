use std::{marker::PhantomData, time::Duration};

use alloy::network::Network;

use crate::provider::{ChainProvider, IntoRootProvider, chain_provider::Error};

/// Builder for constructing a [`ChainProvider`].
///
/// By default no call timeout is applied, so a hung RPC call waits indefinitely. Set
/// [`call_timeout`](Self::call_timeout) to bound every call.
#[derive(Debug)]
pub struct ChainProviderBuilder<N: Network, P: IntoRootProvider<N>> {
    provider: P,
    call_timeout: Option<Duration>,
    _network: PhantomData<N>,
}

impl<N: Network, P: IntoRootProvider<N>> ChainProviderBuilder<N, P> {
    /// Create a new builder around `provider`.
    ///
    /// Any type implementing [`IntoRootProvider`] can be used.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self { provider, call_timeout: None, _network: PhantomData }
    }

    /// Set the maximum duration of a single RPC call.
    #[must_use]
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Build the `ChainProvider`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to connect.
    pub async fn build(self) -> Result<ChainProvider<N>, Error> {
        debug!(
            call_timeout_ms = self.call_timeout.map(|timeout| timeout.as_millis()),
            "Building ChainProvider"
        );

        let root = self.provider.into_root_provider().await?;

        info!("ChainProvider initialized");

        Ok(ChainProvider { root, call_timeout: self.call_timeout })
    }
}
