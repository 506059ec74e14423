//! Process-wide lazily created state.
//!
//! A `Global<T>` is meant to live in a `static`. The first `get` creates the
//! value under a lock, so concurrent first accesses still create exactly one
//! instance. Unlike a `OnceLock`, the value can be torn down explicitly with
//! [`Global::destroy`]; a later `get` creates a fresh one. Callers hold
//! `Arc<T>`, so teardown never invalidates a handle already given out.
//!
//! ```
//! use ringsync::{ConcurrentDeque, Global};
//!
//! static LOG_QUEUE: Global<ConcurrentDeque<String>> = Global::new();
//!
//! LOG_QUEUE.get().push_back("started".to_owned());
//! assert_eq!(LOG_QUEUE.get().len(), 1);
//!
//! assert!(LOG_QUEUE.destroy());
//! assert!(LOG_QUEUE.get().is_empty());
//! ```

use parking_lot::{const_mutex, Mutex};
use std::sync::Arc;
use tracing::debug;

/// Lazily initialized, explicitly destroyable process-wide value.
pub struct Global<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> Global<T> {
    /// Creates an empty holder. Usable in `static` initializers.
    pub const fn new() -> Self {
        Self {
            slot: const_mutex(None),
        }
    }

    /// Returns the value, creating it with `T::default()` on first access.
    pub fn get(&self) -> Arc<T>
    where
        T: Default,
    {
        self.get_or_init(T::default)
    }

    /// Returns the value, creating it with `init` on first access.
    ///
    /// `init` runs under the holder's lock and must not access this holder.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> Arc<T> {
        let mut slot = self.slot.lock();
        match &*slot {
            Some(value) => Arc::clone(value),
            None => {
                debug!(type_name = std::any::type_name::<T>(), "initializing global");
                let value = Arc::new(init());
                *slot = Some(Arc::clone(&value));
                value
            }
        }
    }

    /// Returns the value if it has been created.
    pub fn try_get(&self) -> Option<Arc<T>> {
        self.slot.lock().clone()
    }

    /// Returns true if the value currently exists.
    pub fn is_initialized(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Drops the holder's reference to the value.
    ///
    /// The value itself is dropped once the last outstanding `Arc` goes away.
    /// Returns `false` if there was nothing to destroy.
    pub fn destroy(&self) -> bool {
        let value = self.slot.lock().take();
        match value {
            Some(value) => {
                debug!(
                    type_name = std::any::type_name::<T>(),
                    outstanding = Arc::strong_count(&value) - 1,
                    "destroying global"
                );
                true
            }
            None => false,
        }
    }
}

impl<T> Default for Global<T> {
    fn default() -> Self {
        Self::new()
    }
}
