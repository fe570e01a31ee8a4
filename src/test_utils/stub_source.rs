use std::{
    collections::{BTreeSet, VecDeque},
    ops::RangeInclusive,
    sync::{Arc, Mutex, MutexGuard},
};

use alloy::{
    primitives::BlockNumber,
    rpc::types::{Filter, Log},
    transports::TransportErrorKind,
};

use crate::{ScannerError, source::LogSource};

#[derive(Debug, Default)]
struct StubState {
    heads: VecDeque<BlockNumber>,
    logs: Vec<Log>,
    failing_windows: BTreeSet<BlockNumber>,
    hang: bool,
    filters: Vec<Filter>,
    head_reads: usize,
    in_flight: usize,
    max_in_flight: usize,
}

/// In-memory [`LogSource`] returning canned logs and recording every query.
///
/// Each query returns the stored logs whose block number lies in the queried range, in storage
/// order. Clones share state, so a test can keep one handle and hand another to the scanner.
#[derive(Clone, Debug, Default)]
pub struct StubLogSource {
    state: Arc<Mutex<StubState>>,
}

impl StubLogSource {
    /// A source whose head is always `head`.
    #[must_use]
    pub fn new(head: BlockNumber) -> Self {
        Self::with_heads([head])
    }

    /// A source returning `heads` on successive head reads, then repeating the last one.
    #[must_use]
    pub fn with_heads(heads: impl IntoIterator<Item = BlockNumber>) -> Self {
        let source = Self::default();
        source.lock().heads = heads.into_iter().collect();
        source
    }

    #[must_use]
    pub fn with_logs(self, logs: impl IntoIterator<Item = Log>) -> Self {
        self.lock().logs.extend(logs);
        self
    }

    /// Makes the query for the window starting at `window_start` fail.
    #[must_use]
    pub fn fail_window_at(self, window_start: BlockNumber) -> Self {
        self.lock().failing_windows.insert(window_start);
        self
    }

    /// Makes every log query wait forever.
    #[must_use]
    pub fn hang(self) -> Self {
        self.lock().hang = true;
        self
    }

    /// Every filter received so far, in issue order.
    #[must_use]
    pub fn filters(&self) -> Vec<Filter> {
        self.lock().filters.clone()
    }

    /// The block range of every query received so far, in issue order.
    #[must_use]
    pub fn requested_ranges(&self) -> Vec<RangeInclusive<BlockNumber>> {
        self.lock()
            .filters
            .iter()
            .map(|filter| {
                filter.get_from_block().unwrap_or_default()..=filter.get_to_block().unwrap_or_default()
            })
            .collect()
    }

    #[must_use]
    pub fn head_reads(&self) -> usize {
        self.lock().head_reads
    }

    /// The highest number of log queries observed running at once.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.lock().max_in_flight
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().expect("stub state poisoned")
    }
}

enum Reply {
    Logs(Vec<Log>),
    Fail(BlockNumber),
    Hang,
}

impl LogSource for StubLogSource {
    async fn latest_block(&self) -> Result<BlockNumber, ScannerError> {
        let mut state = self.lock();
        state.head_reads += 1;
        let head = if state.heads.len() > 1 { state.heads.pop_front() } else { state.heads.front().copied() };
        Ok(head.unwrap_or_default())
    }

    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, ScannerError> {
        let from = filter.get_from_block().unwrap_or_default();
        let to = filter.get_to_block().unwrap_or(BlockNumber::MAX);

        let reply = {
            let mut state = self.lock();
            state.filters.push(filter.clone());
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);

            if state.hang {
                Reply::Hang
            } else if state.failing_windows.contains(&from) {
                Reply::Fail(from)
            } else {
                Reply::Logs(
                    state
                        .logs
                        .iter()
                        .filter(|log| log.block_number.is_some_and(|block| (from..=to).contains(&block)))
                        .cloned()
                        .collect(),
                )
            }
        };

        if matches!(reply, Reply::Hang) {
            std::future::pending::<()>().await;
        }

        // let sibling queries of the same batch start before this one resolves
        tokio::task::yield_now().await;
        self.lock().in_flight -= 1;

        match reply {
            Reply::Logs(logs) => Ok(logs),
            Reply::Fail(window_start) => Err(TransportErrorKind::custom_str(&format!(
                "window starting at {window_start} failed"
            ))
            .into()),
            Reply::Hang => unreachable!("hung queries never resolve"),
        }
    }
}
