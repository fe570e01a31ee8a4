//! Vault-Scanner collects the vaults whitelisted by a vault registry contract.
//!
//! The registry emits `VaultWhitelistedStatusUpdated(address indexed receiver, bool indexed
//! isWhitelisted, string metadata)` whenever a vault's status changes. [`VaultScanner`] pages
//! through the chain's history for these logs, [`whitelisted_vaults`] keeps the receivers of
//! updates with `isWhitelisted == true`, and [`WhitelistedVaults`] persists them as
//! `{ "vaults": [...] }`.
//!
//! # Pagination
//!
//! The scan starts at [`DEFAULT_FROM_BLOCK`] and covers the chain in windows of
//! [`DEFAULT_MAX_BLOCK_RANGE`] blocks. Windows are queried in batches of [`DEFAULT_FAN_OUT`]
//! concurrent `eth_getLogs` calls; a batch only starts once every query of the previous batch
//! has returned. The chain head is read once before the first batch unless
//! [`HeadPolicy::RefreshPerBatch`] is selected.
//!
//! # Ordering
//!
//! Batch results are joined in issue order, so logs are accumulated in block order. Addresses
//! are not deduplicated: a vault whitelisted twice is reported twice.
//!
//! # Failures
//!
//! Every error is terminal. A failing query aborts the scan before the next batch is issued and
//! nothing is written.
//!
//! # Example
//!
//! ```rust,no_run
//! use vault_scanner::{
//!     DEFAULT_OUTPUT_PATH, VaultScannerBuilder,
//!     provider::{ChainProvider, ChainProviderBuilder},
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider: ChainProvider =
//!     ChainProviderBuilder::new("https://rpc.berachain.com").build().await?;
//! let scanner = VaultScannerBuilder::new().connect(provider).await?;
//!
//! let vaults = scanner.whitelisted_vaults().await?;
//! vaults.write_to(DEFAULT_OUTPUT_PATH).await?;
//! # Ok(()) }
//! ```

#[macro_use]
mod logging;

pub mod provider;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod error;
mod event;
mod output;
mod scanner;
mod source;
mod window;

pub use error::ScannerError;
pub use event::{
    VAULT_REGISTRY_ADDRESS, VaultWhitelistedStatusUpdated, decode_status_update, whitelisted_vaults,
};
pub use output::{DEFAULT_OUTPUT_PATH, WhitelistedVaults};
pub use scanner::{
    DEFAULT_FAN_OUT, DEFAULT_FROM_BLOCK, DEFAULT_MAX_BLOCK_RANGE, HeadPolicy, ScanConfig,
    ScanProgress, VaultScanner, VaultScannerBuilder,
};
pub use source::LogSource;
pub use window::BlockWindows;
