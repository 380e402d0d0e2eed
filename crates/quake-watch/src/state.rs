//! Shared filter state with lock-free reads.
//!
//! The console replaces the [`FilterState`] as a whole; the refresh loop
//! loads the current value once per tick. Every replacement also wakes the
//! loop so the new filter is applied without waiting for the next interval.

use arc_swap::ArcSwap;
use quake_common::FilterState;
use std::sync::Arc;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;
use tracing::debug;

/// Current filter plus a wake-up signal for the refresh loop.
pub struct FilterHandle {
    state: ArcSwap<FilterState>,
    wake: Notify,
}

impl FilterHandle {
    /// Creates a handle holding `initial`.
    pub fn new(initial: FilterState) -> Self {
        Self {
            state: ArcSwap::from_pointee(initial),
            wake: Notify::new(),
        }
    }

    /// The filter in effect right now.
    pub fn current(&self) -> Arc<FilterState> {
        self.state.load_full()
    }

    /// Replaces the filter and wakes the refresh loop.
    pub fn set(&self, filter: FilterState) {
        debug!(filter = %filter, "Filter changed");
        self.state.store(Arc::new(filter));
        self.wake();
    }

    /// Derives a new filter from the current one and stores it.
    pub fn update<F>(&self, change: F) -> Arc<FilterState>
    where
        F: FnOnce(&FilterState) -> FilterState,
    {
        let next = change(&self.current());
        self.set(next);
        self.current()
    }

    /// Requests a refresh without changing the filter.
    ///
    /// A wake-up sent while the loop is busy is kept and consumed by its next
    /// wait, so requests are never lost, only coalesced.
    pub fn wake(&self) {
        self.wake.notify_one();
    }

    /// Resolves on the next wake-up.
    pub fn woken(&self) -> Notified<'_> {
        self.wake.notified()
    }
}

impl Default for FilterHandle {
    fn default() -> Self {
        Self::new(FilterState::unfiltered())
    }
}
