use alloy::{
    primitives::{Address, address},
    rpc::types::Log,
    sol,
    sol_types::SolEvent,
};

use crate::ScannerError;

sol! {
    /// Emitted by the vault registry whenever a vault's whitelist status changes.
    #[derive(Debug, PartialEq, Eq)]
    event VaultWhitelistedStatusUpdated(
        address indexed receiver,
        bool indexed isWhitelisted,
        string metadata
    );
}

/// Address of the vault registry contract that emits [`VaultWhitelistedStatusUpdated`].
pub const VAULT_REGISTRY_ADDRESS: Address = address!("0xdf960E8F3F19C481dDE769edEDD439ea1a63426a");

/// Decodes a raw log into the whitelist status update it carries.
///
/// # Errors
///
/// Returns [`ScannerError::Decode`] if the log's topics or data do not match the event.
pub fn decode_status_update(log: &Log) -> Result<VaultWhitelistedStatusUpdated, ScannerError> {
    VaultWhitelistedStatusUpdated::decode_log_data(log.data()).map_err(|e| {
        error!(
            error = %e,
            block_number = ?log.block_number,
            transaction_hash = ?log.transaction_hash,
            "failed to decode VaultWhitelistedStatusUpdated log"
        );
        ScannerError::from(e)
    })
}

/// Keeps the updates that whitelist a vault and returns their receivers, in input order.
///
/// Duplicates are preserved: a vault whitelisted twice appears twice.
///
/// # Errors
///
/// Returns [`ScannerError::Decode`] on the first log that is not a valid status update.
pub fn whitelisted_vaults(logs: &[Log]) -> Result<Vec<Address>, ScannerError> {
    let mut vaults = Vec::new();
    for log in logs {
        let update = decode_status_update(log)?;
        trace!(
            receiver = %update.receiver,
            is_whitelisted = update.isWhitelisted,
            metadata = %update.metadata,
            "decoded status update"
        );
        if update.isWhitelisted {
            vaults.push(update.receiver);
        }
    }
    Ok(vaults)
}
