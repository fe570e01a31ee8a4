use std::ops::RangeInclusive;

use alloy::primitives::BlockNumber;

/// Pagination cursor over fixed-size block windows.
///
/// Each window covers `[cursor, cursor + window_size)` and is yielded as the inclusive range
/// `cursor..=cursor + window_size - 1`. The cursor advances as soon as a window is yielded, so a
/// window depends only on the cursor value at the time it was produced. Iteration stops once the
/// cursor reaches or exceeds the head; the last window may extend past the head.
#[derive(Debug, Clone)]
pub struct BlockWindows {
    cursor: BlockNumber,
    head: BlockNumber,
    window_size: u64,
    window_count: u64,
}

impl BlockWindows {
    /// Creates windows starting at `start` and bounded by `head`.
    ///
    /// # Panics
    ///
    /// Panics if `window_size` is 0.
    #[must_use]
    pub const fn new(start: BlockNumber, head: BlockNumber, window_size: u64) -> Self {
        assert!(window_size >= 1, "window_size must be at least 1");
        Self { cursor: start, head, window_size, window_count: 0 }
    }

    /// The next unscanned block number.
    #[must_use]
    pub fn cursor(&self) -> BlockNumber {
        self.cursor
    }

    #[must_use]
    pub fn head(&self) -> BlockNumber {
        self.head
    }

    /// Returns the number of windows yielded so far.
    #[must_use]
    pub fn window_count(&self) -> u64 {
        self.window_count
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.head
    }

    /// Raises the head bound. A lower head is ignored; the bound never moves backwards.
    pub fn extend_head(&mut self, head: BlockNumber) {
        if head > self.head {
            debug!(previous_head = self.head, head, "Extending scan head");
            self.head = head;
        }
    }

    /// Takes up to `fan_out` windows, advancing the cursor past each one.
    pub fn next_batch(&mut self, fan_out: usize) -> Vec<RangeInclusive<BlockNumber>> {
        self.by_ref().take(fan_out).collect()
    }
}

impl Iterator for BlockWindows {
    type Item = RangeInclusive<BlockNumber>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_exhausted() {
            return None;
        }

        self.window_count += 1;

        let window_start = self.cursor;
        let window_end = window_start.saturating_add(self.window_size - 1);
        self.cursor = window_start.saturating_add(self.window_size);

        Some(window_start..=window_end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.is_exhausted() {
            0
        } else {
            (self.head - self.cursor).div_ceil(self.window_size)
        };
        match usize::try_from(remaining) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}
