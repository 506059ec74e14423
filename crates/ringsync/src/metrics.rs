/// Optional counters for monitoring a container.
///
/// Counters are only updated when `Config::enable_metrics` is set. They live
/// next to the storage and are mutated under the same lock, so plain integers
/// suffice.
#[derive(Debug, Clone, Default)]
pub(crate) struct Metrics {
    enabled: bool,
    snapshot: MetricsSnapshot,
}

impl Metrics {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            snapshot: MetricsSnapshot::default(),
        }
    }

    #[inline]
    pub(crate) fn add_pushed(&mut self) {
        if self.enabled {
            self.snapshot.pushed += 1;
        }
    }

    #[inline]
    pub(crate) fn add_pulled(&mut self) {
        if self.enabled {
            self.snapshot.pulled += 1;
        }
    }

    #[inline]
    pub(crate) fn add_evicted(&mut self, n: u64) {
        if self.enabled {
            self.snapshot.evicted += n;
        }
    }

    #[inline]
    pub(crate) fn add_rejected(&mut self) {
        if self.enabled {
            self.snapshot.rejected += 1;
        }
    }

    #[inline]
    pub(crate) fn add_wait_timeout(&mut self) {
        if self.enabled {
            self.snapshot.wait_timeouts += 1;
        }
    }

    #[inline]
    pub(crate) fn add_wait_interrupt(&mut self) {
        if self.enabled {
            self.snapshot.wait_interrupts += 1;
        }
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        self.snapshot
    }
}

/// Point-in-time copy of a container's counters. All zero when disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Elements accepted by a push
    pub pushed: u64,
    /// Elements handed out by a pull
    pub pulled: u64,
    /// Elements discarded by the container (eviction, fill, clear, pop)
    pub evicted: u64,
    /// Pushes refused because the buffer was full
    pub rejected: u64,
    /// Blocking pulls that hit their timeout
    pub wait_timeouts: u64,
    /// Blocking pulls ended by `wait_break`
    pub wait_interrupts: u64,
}
