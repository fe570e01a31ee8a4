//! Helpers for exercising the scanner without a live chain.

mod stub_source;

pub use stub_source::StubLogSource;

use alloy::{
    primitives::{Address, BlockNumber},
    rpc::types::Log,
    sol_types::SolEvent,
};

use crate::event::{VAULT_REGISTRY_ADDRESS, VaultWhitelistedStatusUpdated};

/// Builds a registry log carrying a `VaultWhitelistedStatusUpdated` event at `block_number`.
#[must_use]
pub fn status_update_log(receiver: Address, is_whitelisted: bool, block_number: BlockNumber) -> Log {
    let event = VaultWhitelistedStatusUpdated {
        receiver,
        isWhitelisted: is_whitelisted,
        metadata: format!("vault registered at block {block_number}"),
    };
    Log {
        inner: alloy::primitives::Log { address: VAULT_REGISTRY_ADDRESS, data: event.encode_log_data() },
        block_number: Some(block_number),
        ..Default::default()
    }
}
