/// What a container does with elements it discards on its own.
///
/// Elements handed out by a pull always become the caller's. The policy only
/// matters for elements the container gets rid of itself: evicted by a forced
/// push, overwritten by `fill`, removed by `clear`/`pop_*`, or still queued when
/// the container is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ownership {
    /// Discarded elements are dropped (a `Box<T>` frees its pointee).
    #[default]
    Owning,
    /// Discarded elements are released without running their destructor.
    ///
    /// Use for handle types whose pointee lifetime is managed elsewhere.
    Detached,
}

impl Ownership {
    /// Disposes of an element the container no longer holds.
    #[inline]
    pub(crate) fn dispose<T>(self, item: T) {
        match self {
            Self::Owning => drop(item),
            Self::Detached => std::mem::forget(item),
        }
    }
}

/// Configuration for ring buffers and deques.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Number of slots of a ring buffer; initial reservation of a deque
    pub capacity: usize,
    /// Disposal policy for discarded elements
    pub ownership: Ownership,
    /// Enable metrics collection (slight overhead)
    pub enable_metrics: bool,
}

impl Config {
    /// Creates an owning configuration with the given capacity and metrics off.
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ownership: Ownership::Owning,
            enable_metrics: false,
        }
    }

    /// Sets the ownership policy.
    pub const fn with_ownership(mut self, ownership: Ownership) -> Self {
        self.ownership = ownership;
        self
    }

    /// Enables or disables metrics collection.
    pub const fn with_metrics(mut self, enable_metrics: bool) -> Self {
        self.enable_metrics = enable_metrics;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(1024)
    }
}

/// Short buffer of sensor frames between a capture and a processing thread
pub const SENSOR_FRAME_CONFIG: Config = Config::new(64);

/// Object pool of reusable buffers, with metrics to watch the hit rate
pub const POOL_CONFIG: Config = Config::new(16).with_metrics(true);
