use alloy::{
    network::{Ethereum, Network},
    providers::{
        Provider, RootProvider,
        fillers::{FillProvider, TxFiller},
    },
    transports::http::reqwest::Url,
};

use crate::provider::{ChainProvider, ChainProviderBuilder, chain_provider::Error};

/// Conversion trait for endpoints and providers that resolve to an Alloy [`RootProvider`].
///
/// Used by [`ChainProviderBuilder`]: an endpoint URL is connected, while an existing provider
/// contributes its root and drops any fillers, which the read-only scanner never uses.
pub trait IntoRootProvider<N: Network = Ethereum> {
    /// Convert `self` into a [`RootProvider`].
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying provider cannot be constructed or connected.
    fn into_root_provider(self) -> impl Future<Output = Result<RootProvider<N>, Error>> + Send;
}

impl<N: Network> IntoRootProvider<N> for RootProvider<N> {
    async fn into_root_provider(self) -> Result<RootProvider<N>, Error> {
        Ok(self)
    }
}

impl<N: Network> IntoRootProvider<N> for &str {
    async fn into_root_provider(self) -> Result<RootProvider<N>, Error> {
        Ok(RootProvider::connect(self).await?)
    }
}

impl<N: Network> IntoRootProvider<N> for Url {
    async fn into_root_provider(self) -> Result<RootProvider<N>, Error> {
        Ok(RootProvider::connect(self.as_str()).await?)
    }
}

impl<F, P, N> IntoRootProvider<N> for FillProvider<F, P, N>
where
    F: TxFiller<N>,
    P: Provider<N>,
    N: Network,
{
    async fn into_root_provider(self) -> Result<RootProvider<N>, Error> {
        Ok(self.root().to_owned())
    }
}

/// Conversion trait for types that can be turned into a [`ChainProvider`].
///
/// An existing [`ChainProvider`] converts to itself and keeps its call timeout; anything else is
/// wrapped with default settings.
pub trait IntoChainProvider<N: Network = Ethereum> {
    /// Convert `self` into a [`ChainProvider`].
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to connect.
    fn into_chain_provider(self) -> impl Future<Output = Result<ChainProvider<N>, Error>> + Send;
}

impl<N: Network> IntoChainProvider<N> for ChainProvider<N> {
    async fn into_chain_provider(self) -> Result<ChainProvider<N>, Error> {
        Ok(self)
    }
}

impl<N: Network> IntoChainProvider<N> for RootProvider<N> {
    async fn into_chain_provider(self) -> Result<ChainProvider<N>, Error> {
        ChainProviderBuilder::new(self).build().await
    }
}

impl<F, P, N> IntoChainProvider<N> for FillProvider<F, P, N>
where
    F: TxFiller<N>,
    P: Provider<N>,
    N: Network,
{
    async fn into_chain_provider(self) -> Result<ChainProvider<N>, Error> {
        ChainProviderBuilder::new(self).build().await
    }
}
