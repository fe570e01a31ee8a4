//! Chain client handle used by the vault scanner.
//!
//! [`ChainProvider`] wraps an Alloy [`RootProvider`](alloy::providers::RootProvider) and is passed
//! explicitly to the scanner; there is no process-wide connection. It adds an optional per-call
//! timeout and nothing else: calls are not retried and there is no failover.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use vault_scanner::provider::{ChainProvider, ChainProviderBuilder};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider: ChainProvider = ChainProviderBuilder::new("https://rpc.berachain.com")
//!     .call_timeout(Duration::from_secs(30))
//!     .build()
//!     .await?;
//!
//! let head = provider.get_block_number().await?;
//! println!("Current block: {head}");
//! # Ok(()) }
//! ```

pub mod builder;
pub mod chain_provider;
pub mod provider_conversion;

pub use builder::ChainProviderBuilder;
pub use chain_provider::{ChainProvider, Error};
pub use provider_conversion::{IntoChainProvider, IntoRootProvider};
