use std::{ops::RangeInclusive, time::Duration};

use alloy::{
    network::Network,
    primitives::{Address, BlockNumber},
    rpc::types::{Filter, Log},
    sol_types::SolEvent,
};
use futures::future::try_join_all;
use tokio::{sync::watch, time::timeout};

use crate::{
    ScannerError,
    event::{VAULT_REGISTRY_ADDRESS, VaultWhitelistedStatusUpdated, whitelisted_vaults},
    output::WhitelistedVaults,
    provider::{ChainProvider, IntoChainProvider},
    source::LogSource,
    window::BlockWindows,
};

/// Default first block scanned.
pub const DEFAULT_FROM_BLOCK: BlockNumber = 8_000;
/// Default number of blocks covered by a single `eth_getLogs` query.
pub const DEFAULT_MAX_BLOCK_RANGE: u64 = 10_000;
/// Default number of concurrent `eth_getLogs` queries per batch.
pub const DEFAULT_FAN_OUT: usize = 5;

/// How the scan bound is determined.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum HeadPolicy {
    /// Read the head once before the first batch. Blocks produced during the scan are not
    /// visited.
    #[default]
    Snapshot,
    /// Re-read the head after every batch and keep scanning while the chain grows.
    RefreshPerBatch,
}

/// Progress published once per completed batch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanProgress {
    /// The next unscanned block number.
    pub cursor: BlockNumber,
    /// The current scan bound.
    pub head: BlockNumber,
    /// Number of completed batches.
    pub batches: u64,
    /// Number of events accumulated so far.
    pub events: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    pub(crate) registry: Address,
    pub(crate) from_block: BlockNumber,
    pub(crate) max_block_range: u64,
    pub(crate) fan_out: usize,
    pub(crate) head_policy: HeadPolicy,
    pub(crate) deadline: Option<Duration>,
}

impl ScanConfig {
    #[must_use]
    pub fn registry(&self) -> Address {
        self.registry
    }

    #[must_use]
    pub fn from_block(&self) -> BlockNumber {
        self.from_block
    }

    #[must_use]
    pub fn max_block_range(&self) -> u64 {
        self.max_block_range
    }

    #[must_use]
    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    #[must_use]
    pub fn head_policy(&self) -> HeadPolicy {
        self.head_policy
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            registry: VAULT_REGISTRY_ADDRESS,
            from_block: DEFAULT_FROM_BLOCK,
            max_block_range: DEFAULT_MAX_BLOCK_RANGE,
            fan_out: DEFAULT_FAN_OUT,
            head_policy: HeadPolicy::Snapshot,
            deadline: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct VaultScannerBuilder {
    pub(crate) config: ScanConfig,
}

impl VaultScannerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the contract whose `VaultWhitelistedStatusUpdated` logs are scanned.
    ///
    /// Defaults to [`VAULT_REGISTRY_ADDRESS`].
    #[must_use]
    pub fn registry(mut self, registry: Address) -> Self {
        self.config.registry = registry;
        self
    }

    /// Sets the first block scanned. Defaults to [`DEFAULT_FROM_BLOCK`].
    #[must_use]
    pub fn from_block(mut self, from_block: BlockNumber) -> Self {
        self.config.from_block = from_block;
        self
    }

    /// Sets the number of blocks covered by each log query.
    ///
    /// Providers commonly cap the block range or result size of `eth_getLogs`; keep this below
    /// the provider's limit. Must be greater than 0. Defaults to [`DEFAULT_MAX_BLOCK_RANGE`].
    #[must_use]
    pub fn max_block_range(mut self, max_block_range: u64) -> Self {
        self.config.max_block_range = max_block_range;
        self
    }

    /// Sets how many log queries run concurrently per batch.
    ///
    /// Must be greater than 0. Defaults to [`DEFAULT_FAN_OUT`].
    #[must_use]
    pub fn fan_out(mut self, fan_out: usize) -> Self {
        self.config.fan_out = fan_out;
        self
    }

    #[must_use]
    pub fn head_policy(mut self, head_policy: HeadPolicy) -> Self {
        self.config.head_policy = head_policy;
        self
    }

    /// Bounds the total duration of [`VaultScanner::scan`]. No deadline is applied by default.
    #[must_use]
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.config.deadline = Some(deadline);
        self
    }

    /// Builds a scanner over any [`LogSource`].
    ///
    /// # Errors
    ///
    /// * [`ScannerError::InvalidMaxBlockRange`] if the window size is zero.
    /// * [`ScannerError::InvalidFanOut`] if the fan-out is zero.
    pub fn build<S: LogSource>(self, source: S) -> Result<VaultScanner<S>, ScannerError> {
        if self.config.max_block_range == 0 {
            return Err(ScannerError::InvalidMaxBlockRange);
        }
        if self.config.fan_out == 0 {
            return Err(ScannerError::InvalidFanOut);
        }

        let filter = Filter::new()
            .address(self.config.registry)
            .event_signature(VaultWhitelistedStatusUpdated::SIGNATURE_HASH);
        let (progress, _) = watch::channel(ScanProgress {
            cursor: self.config.from_block,
            ..ScanProgress::default()
        });

        Ok(VaultScanner { config: self.config, source, filter, progress })
    }

    /// Connects to a chain provider and builds a scanner over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to connect or the configuration is invalid.
    pub async fn connect<N: Network>(
        self,
        provider: impl IntoChainProvider<N>,
    ) -> Result<VaultScanner<ChainProvider<N>>, ScannerError> {
        let provider = provider.into_chain_provider().await?;
        self.build(provider)
    }
}

/// Collects `VaultWhitelistedStatusUpdated` logs over `[from_block, head)`.
///
/// The range is split into windows of `max_block_range` blocks. Windows are fetched in batches
/// of `fan_out` concurrent queries, and every query of a batch completes before the next batch
/// is issued. The first failing query aborts the scan.
#[derive(Debug)]
pub struct VaultScanner<S> {
    config: ScanConfig,
    source: S,
    filter: Filter,
    progress: watch::Sender<ScanProgress>,
}

impl<S: LogSource> VaultScanner<S> {
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Subscribes to per-batch progress updates.
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<ScanProgress> {
        self.progress.subscribe()
    }

    /// Fetches every status update log in the scan range.
    ///
    /// Logs are returned in window order, and within a window in the order the source returned
    /// them.
    ///
    /// # Errors
    ///
    /// * [`ScannerError::RpcError`] or [`ScannerError::Timeout`] if any query fails.
    /// * [`ScannerError::DeadlineExceeded`] if the configured deadline elapses.
    pub async fn scan(&self) -> Result<Vec<Log>, ScannerError> {
        info!(
            registry = %self.config.registry,
            from_block = self.config.from_block,
            max_block_range = self.config.max_block_range,
            fan_out = self.config.fan_out,
            head_policy = ?self.config.head_policy,
            "Starting vault scan"
        );

        match self.config.deadline {
            Some(deadline) => timeout(deadline, self.scan_windows()).await.map_err(|_| {
                error!(deadline_ms = deadline.as_millis(), "Vault scan deadline exceeded");
                ScannerError::DeadlineExceeded
            })?,
            None => self.scan_windows().await,
        }
    }

    /// Scans, then keeps the receivers of updates that whitelist a vault.
    ///
    /// # Errors
    ///
    /// See [`scan`](Self::scan); additionally [`ScannerError::Decode`] if a log is not a valid
    /// status update.
    pub async fn whitelisted_vaults(&self) -> Result<WhitelistedVaults, ScannerError> {
        let logs = self.scan().await?;
        let vaults = whitelisted_vaults(&logs)?;
        info!(event_count = logs.len(), vault_count = vaults.len(), "Filtered whitelisted vaults");
        Ok(vaults.into())
    }

    async fn scan_windows(&self) -> Result<Vec<Log>, ScannerError> {
        let head = self.source.latest_block().await?;
        let mut windows = BlockWindows::new(self.config.from_block, head, self.config.max_block_range);
        let mut events = Vec::new();
        let mut batches = 0u64;

        while !windows.is_exhausted() {
            let batch = windows.next_batch(self.config.fan_out);
            debug!(
                batch = batches + 1,
                window_count = batch.len(),
                first_block = ?batch.first().map(|range| *range.start()),
                "Issuing batch"
            );

            let fetched = try_join_all(batch.into_iter().map(|range| self.fetch_window(range))).await?;
            events.extend(fetched.into_iter().flatten());
            batches += 1;

            info!(
                cursor = windows.cursor(),
                head = windows.head(),
                batches,
                event_count = events.len(),
                "processing block"
            );
            self.progress.send_replace(ScanProgress {
                cursor: windows.cursor(),
                head: windows.head(),
                batches,
                events: events.len(),
            });

            if self.config.head_policy == HeadPolicy::RefreshPerBatch {
                windows.extend_head(self.source.latest_block().await?);
            }
        }

        info!(head = windows.head(), batches, event_count = events.len(), "Vault scan finished");
        Ok(events)
    }

    async fn fetch_window(&self, range: RangeInclusive<BlockNumber>) -> Result<Vec<Log>, ScannerError> {
        let filter = self.filter.clone().from_block(*range.start()).to_block(*range.end());

        match self.source.logs(&filter).await {
            Ok(logs) => {
                if !logs.is_empty() {
                    info!(
                        log_count = logs.len(),
                        block_range = ?range,
                        "found logs for event in block range"
                    );
                }
                Ok(logs)
            }
            Err(e) => {
                error!(error = %e, block_range = ?range, "failed to get logs for block range");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{StubLogSource, status_update_log};
    use alloy::{
        network::Ethereum,
        primitives::U64,
        providers::{ProviderBuilder, RootProvider, mock::Asserter},
        rpc::client::RpcClient,
    };

    #[test]
    fn builder_defaults() {
        let builder = VaultScannerBuilder::new();

        assert_eq!(builder.config.registry, VAULT_REGISTRY_ADDRESS);
        assert_eq!(builder.config.from_block, DEFAULT_FROM_BLOCK);
        assert_eq!(builder.config.max_block_range, DEFAULT_MAX_BLOCK_RANGE);
        assert_eq!(builder.config.fan_out, DEFAULT_FAN_OUT);
        assert_eq!(builder.config.head_policy, HeadPolicy::Snapshot);
        assert_eq!(builder.config.deadline, None);
    }

    #[test]
    fn builder_last_call_wins() {
        let builder = VaultScannerBuilder::new()
            .from_block(1)
            .from_block(2)
            .max_block_range(100)
            .max_block_range(200)
            .fan_out(2)
            .fan_out(8)
            .head_policy(HeadPolicy::RefreshPerBatch)
            .deadline(Duration::from_secs(1))
            .deadline(Duration::from_secs(9));

        assert_eq!(builder.config.from_block, 2);
        assert_eq!(builder.config.max_block_range, 200);
        assert_eq!(builder.config.fan_out, 8);
        assert_eq!(builder.config.head_policy, HeadPolicy::RefreshPerBatch);
        assert_eq!(builder.config.deadline, Some(Duration::from_secs(9)));
    }

    #[test]
    fn zero_max_block_range_is_rejected() {
        let result = VaultScannerBuilder::new().max_block_range(0).build(StubLogSource::new(0));
        assert!(matches!(result, Err(ScannerError::InvalidMaxBlockRange)));
    }

    #[test]
    fn zero_fan_out_is_rejected() {
        let result = VaultScannerBuilder::new().fan_out(0).build(StubLogSource::new(0));
        assert!(matches!(result, Err(ScannerError::InvalidFanOut)));
    }

    #[tokio::test]
    async fn queries_target_registry_and_event() -> anyhow::Result<()> {
        let source = StubLogSource::new(18_000);
        let scanner = VaultScannerBuilder::new().build(source.clone())?;

        scanner.scan().await?;

        let filters = source.filters();
        assert_eq!(filters.len(), 1);
        let filter = &filters[0];
        assert!(filter.address.matches(&VAULT_REGISTRY_ADDRESS));
        assert!(!filter.address.is_empty());
        assert!(filter.topics[0].matches(&VaultWhitelistedStatusUpdated::SIGNATURE_HASH));
        assert_eq!(filter.get_from_block(), Some(8_000));
        assert_eq!(filter.get_to_block(), Some(17_999));
        Ok(())
    }

    #[tokio::test]
    async fn batches_never_exceed_fan_out() -> anyhow::Result<()> {
        let source = StubLogSource::new(8_000 + 12 * 10_000);
        let scanner = VaultScannerBuilder::new().build(source.clone())?;
        let progress = scanner.progress();

        scanner.scan().await?;

        assert_eq!(source.requested_ranges().len(), 12);
        assert_eq!(source.max_in_flight(), 5);
        assert_eq!(progress.borrow().batches, 3);
        assert_eq!(progress.borrow().cursor, 128_000);
        Ok(())
    }

    #[tokio::test]
    async fn logs_are_accumulated_in_window_order() -> anyhow::Result<()> {
        let early = status_update_log(Address::repeat_byte(0x01), true, 9_000);
        let late = status_update_log(Address::repeat_byte(0x02), true, 47_000);
        let middle = status_update_log(Address::repeat_byte(0x03), false, 20_000);
        let source = StubLogSource::new(58_000).with_logs([late.clone(), early.clone(), middle.clone()]);
        let scanner = VaultScannerBuilder::new().build(source)?;

        let logs = scanner.scan().await?;

        assert_eq!(logs, vec![early, middle, late]);
        Ok(())
    }

    #[tokio::test]
    async fn snapshot_policy_ignores_new_blocks() -> anyhow::Result<()> {
        let source = StubLogSource::with_heads([18_000, 38_000]);
        let scanner = VaultScannerBuilder::new().build(source.clone())?;

        scanner.scan().await?;

        assert_eq!(source.requested_ranges(), vec![8_000..=17_999]);
        assert_eq!(source.head_reads(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn refresh_policy_follows_growing_head() -> anyhow::Result<()> {
        let source = StubLogSource::with_heads([18_000, 38_000]);
        let scanner = VaultScannerBuilder::new()
            .head_policy(HeadPolicy::RefreshPerBatch)
            .build(source.clone())?;

        scanner.scan().await?;

        assert_eq!(
            source.requested_ranges(),
            vec![8_000..=17_999, 18_000..=27_999, 28_000..=37_999]
        );
        Ok(())
    }

    #[tokio::test]
    async fn deadline_cancels_hung_query() -> anyhow::Result<()> {
        let source = StubLogSource::new(58_000).hang();
        let scanner =
            VaultScannerBuilder::new().deadline(Duration::from_millis(50)).build(source)?;

        let result = scanner.scan().await;

        assert!(matches!(result, Err(ScannerError::DeadlineExceeded)));
        Ok(())
    }

    #[tokio::test]
    async fn failing_window_stops_later_batches() -> anyhow::Result<()> {
        let source = StubLogSource::new(8_000 + 10 * 10_000).fail_window_at(28_000);
        let scanner = VaultScannerBuilder::new().build(source.clone())?;

        let result = scanner.scan().await;

        assert!(matches!(result, Err(ScannerError::RpcError(_))));
        assert!(source.requested_ranges().iter().all(|range| *range.start() < 58_000));
        assert_eq!(scanner.progress().borrow().batches, 0);
        Ok(())
    }

    #[tokio::test]
    async fn mocked_provider_at_start_block_scans_nothing() -> anyhow::Result<()> {
        let asserter = Asserter::new();
        asserter.push_success(&U64::from(DEFAULT_FROM_BLOCK));
        let provider = RootProvider::<Ethereum>::new(RpcClient::mocked(asserter));
        let scanner = VaultScannerBuilder::new().connect(provider).await?;

        let vaults = scanner.whitelisted_vaults().await?;

        assert!(vaults.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn connects_through_fill_provider() -> anyhow::Result<()> {
        let asserter = Asserter::new();
        asserter.push_success(&U64::from(DEFAULT_FROM_BLOCK));
        let filled = ProviderBuilder::new().connect_client(RpcClient::mocked(asserter));
        let scanner = VaultScannerBuilder::new().connect(filled).await?;

        let vaults = scanner.whitelisted_vaults().await?;

        assert!(vaults.is_empty());
        assert_eq!(scanner.progress().borrow().batches, 0);
        Ok(())
    }

    #[tokio::test]
    async fn mocked_provider_failure_aborts_scan() -> anyhow::Result<()> {
        let asserter = Asserter::new();
        asserter.push_success(&U64::from(58_000));
        for _ in 0..DEFAULT_FAN_OUT {
            asserter.push_failure_msg("upstream unavailable");
        }
        let provider = RootProvider::<Ethereum>::new(RpcClient::mocked(asserter));
        let scanner = VaultScannerBuilder::new().connect(provider).await?;

        let result = scanner.scan().await;

        assert!(matches!(result, Err(ScannerError::RpcError(_))));
        Ok(())
    }
}
