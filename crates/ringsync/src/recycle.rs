//! Object-pool recycling on top of the pointer-element containers.
//!
//! A pool is any container of `Box<X>` implementing [`RecyclePool`]. Borrowing
//! pulls a pooled object without blocking, or allocates a fresh one when the
//! pool is empty. Dropping the [`Recycled`] handle pushes the object back
//! instead of freeing it, so at every point an object is either held by one
//! handle or sitting in the pool.
//!
//! The handle keeps its pool reachable: it holds either a plain borrow
//! (`&Pool`, checked by the borrow checker) or an `Arc<Pool>`. A pool can
//! therefore never be dropped while one of its objects is on loan.
//!
//! ```
//! use ringsync::{Config, ConcurrentRingBuffer};
//!
//! let pool = ConcurrentRingBuffer::<Box<Vec<u8>>>::new(Config::new(4));
//!
//! let addr = {
//!     let mut frame = pool.borrow();
//!     assert!(!frame.was_recycled());
//!     frame.extend_from_slice(b"frame");
//!     frame.as_ptr()
//! };
//! assert_eq!(pool.len(), 1);
//!
//! let frame = pool.borrow();
//! assert!(frame.was_recycled());
//! assert_eq!(frame.as_ptr(), addr);
//! ```

use crate::sum::NoSum;
use crate::{ConcurrentDeque, ConcurrentRingBuffer, RingBuffer};
use std::cell::RefCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::trace;

/// A container that lends out and takes back boxed objects.
pub trait RecyclePool {
    /// Pooled object type.
    type Item;

    /// Pulls a pooled object without blocking.
    fn take_recycled(&self) -> Option<Box<Self::Item>>;

    /// Returns an object to the pool.
    fn recycle(&self, item: Box<Self::Item>);
}

/// Bounded pool. A full pool evicts (and disposes of) its oldest object.
impl<X> RecyclePool for ConcurrentRingBuffer<Box<X>, NoSum> {
    type Item = X;

    fn take_recycled(&self) -> Option<Box<X>> {
        self.pull_front()
    }

    fn recycle(&self, item: Box<X>) {
        self.push_back_force_notify(item);
    }
}

/// Unbounded pool. Every returned object is kept.
impl<X> RecyclePool for ConcurrentDeque<Box<X>> {
    type Item = X;

    fn take_recycled(&self) -> Option<Box<X>> {
        self.pull_front()
    }

    fn recycle(&self, item: Box<X>) {
        self.push_back_notify(item);
    }
}

/// Single-threaded bounded pool over the sequential ring buffer.
///
/// While the caller holds a borrow of the cell, the pool is unreachable: a
/// borrow allocates a fresh object and a returned object is dropped.
impl<X> RecyclePool for RefCell<RingBuffer<Box<X>, NoSum>> {
    type Item = X;

    fn take_recycled(&self) -> Option<Box<X>> {
        self.try_borrow_mut().ok()?.pull_front()
    }

    fn recycle(&self, item: Box<X>) {
        match self.try_borrow_mut() {
            Ok(mut ring) => ring.push_back_force(item),
            Err(_) => trace!("pool borrowed elsewhere, dropping returned object"),
        }
    }
}

/// A pooled object on loan. Dereferences to the object; returns it to the
/// pool on drop.
pub struct Recycled<R>
where
    R: Deref,
    R::Target: RecyclePool,
{
    /// `None` only after `detach` or during drop
    item: Option<Box<<R::Target as RecyclePool>::Item>>,
    pool: R,
    recycled: bool,
}

impl<R> Recycled<R>
where
    R: Deref,
    R::Target: RecyclePool,
{
    /// Borrows a pooled object, allocating a default one if the pool is empty.
    pub fn borrow(pool: R) -> Self
    where
        <R::Target as RecyclePool>::Item: Default,
    {
        Self::borrow_with(pool, Box::default)
    }

    /// Borrows a pooled object, calling `make` if the pool is empty.
    pub fn borrow_with<F>(pool: R, make: F) -> Self
    where
        F: FnOnce() -> Box<<R::Target as RecyclePool>::Item>,
    {
        let (item, recycled) = match pool.take_recycled() {
            Some(item) => (item, true),
            None => {
                trace!("pool empty, allocating a new object");
                (make(), false)
            }
        };
        Self {
            item: Some(item),
            pool,
            recycled,
        }
    }

    /// Returns true if the object came from the pool rather than a fresh
    /// allocation.
    #[inline]
    pub fn was_recycled(&self) -> bool {
        self.recycled
    }

    /// Takes the object out for good; it will not go back to the pool.
    pub fn detach(mut self) -> Box<<R::Target as RecyclePool>::Item> {
        match self.item.take() {
            Some(item) => item,
            None => unreachable!("recycled object released twice"),
        }
    }

    /// The pool this object returns to.
    pub fn pool(&self) -> &R::Target {
        &self.pool
    }

    fn item(&self) -> &<R::Target as RecyclePool>::Item {
        match &self.item {
            Some(item) => item,
            None => unreachable!("recycled object used after release"),
        }
    }

    fn item_mut(&mut self) -> &mut <R::Target as RecyclePool>::Item {
        match &mut self.item {
            Some(item) => item,
            None => unreachable!("recycled object used after release"),
        }
    }
}

impl<R> Deref for Recycled<R>
where
    R: Deref,
    R::Target: RecyclePool,
{
    type Target = <R::Target as RecyclePool>::Item;

    fn deref(&self) -> &Self::Target {
        self.item()
    }
}

impl<R> DerefMut for Recycled<R>
where
    R: Deref,
    R::Target: RecyclePool,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.item_mut()
    }
}

impl<R> Drop for Recycled<R>
where
    R: Deref,
    R::Target: RecyclePool,
{
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.recycle(item);
        }
    }
}

impl<R> fmt::Debug for Recycled<R>
where
    R: Deref,
    R::Target: RecyclePool,
    <R::Target as RecyclePool>::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recycled")
            .field("item", &self.item)
            .field("recycled", &self.recycled)
            .finish()
    }
}

// ---------------------------------------------------------------------
// Convenience constructors on the concurrent pools
// ---------------------------------------------------------------------

impl<X: Default> ConcurrentRingBuffer<Box<X>, NoSum> {
    /// Borrows a pooled object for the lifetime of `&self`.
    pub fn borrow(&self) -> Recycled<&Self> {
        Recycled::borrow(self)
    }

    /// Borrows a pooled object through a shared handle, so the loan can
    /// outlive the current scope or move to another thread.
    pub fn borrow_arc(self: &Arc<Self>) -> Recycled<Arc<Self>> {
        Recycled::borrow(Arc::clone(self))
    }
}

impl<X: Default> ConcurrentDeque<Box<X>> {
    /// Borrows a pooled object for the lifetime of `&self`.
    pub fn borrow(&self) -> Recycled<&Self> {
        Recycled::borrow(self)
    }

    /// Borrows a pooled object through a shared handle, so the loan can
    /// outlive the current scope or move to another thread.
    pub fn borrow_arc(self: &Arc<Self>) -> Recycled<Arc<Self>> {
        Recycled::borrow(Arc::clone(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[derive(Default)]
    struct Frame {
        data: Vec<u8>,
    }

    #[test]
    fn test_empty_pool_allocates() {
        let pool = ConcurrentRingBuffer::<Box<Frame>>::new(Config::new(2));
        let frame = pool.borrow();
        assert!(!frame.was_recycled());
        assert!(pool.is_empty());
        drop(frame);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_same_object_comes_back() {
        let pool = ConcurrentDeque::<Box<Frame>>::new(Config::default());
        let first = pool.borrow();
        let addr: *const Frame = &*first;
        drop(first);

        let second = pool.borrow();
        assert!(second.was_recycled());
        assert_eq!(&*second as *const Frame, addr);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_contents_survive_recycling() {
        let pool = ConcurrentRingBuffer::<Box<Frame>>::new(Config::new(1));
        {
            let mut frame = pool.borrow();
            frame.data.extend_from_slice(&[1, 2, 3]);
        }
        let frame = pool.borrow();
        assert_eq!(frame.data, vec![1, 2, 3]);
    }

    #[test]
    fn test_full_ring_pool_evicts_oldest() {
        static DROPS: AtomicUsize = AtomicUsize::new(0);

        #[derive(Default)]
        struct Counted;
        impl Drop for Counted {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::SeqCst);
            }
        }

        let pool = ConcurrentRingBuffer::<Box<Counted>>::new(Config::new(1));
        let a = pool.borrow();
        let b = pool.borrow();
        drop(a);
        assert_eq!(DROPS.load(Ordering::SeqCst), 0);
        // Pool holds one object already: returning `b` evicts `a`
        drop(b);
        assert_eq!(DROPS.load(Ordering::SeqCst), 1);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_detach_keeps_object_out() {
        let pool = ConcurrentDeque::<Box<Frame>>::new(Config::default());
        let frame = pool.borrow().detach();
        assert!(pool.is_empty());
        drop(frame);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_borrow_with_factory() {
        let pool = ConcurrentDeque::<Box<Frame>>::new(Config::default());
        let frame = Recycled::borrow_with(&pool, || {
            Box::new(Frame {
                data: Vec::with_capacity(4096),
            })
        });
        assert!(frame.data.capacity() >= 4096);
    }

    #[test]
    fn test_arc_handle_crosses_threads() {
        let pool = Arc::new(ConcurrentRingBuffer::<Box<Frame>>::new(Config::new(4)));
        let frame = pool.borrow_arc();

        thread::spawn(move || {
            let mut frame = frame;
            frame.data.push(9);
        })
        .join()
        .unwrap();

        let frame = pool.borrow();
        assert!(frame.was_recycled());
        assert_eq!(frame.data, vec![9]);
    }

    #[test]
    fn test_sequential_pool() {
        let pool = RefCell::new(RingBuffer::<Box<Frame>>::new(Config::new(2)));
        let frame = Recycled::borrow(&pool);
        assert!(!frame.was_recycled());
        drop(frame);
        assert_eq!(pool.borrow().len(), 1);

        let frame = Recycled::borrow(&pool);
        assert!(frame.was_recycled());
    }

    #[test]
    fn test_sequential_pool_while_cell_borrowed() {
        let pool = RefCell::new(RingBuffer::<Box<Frame>>::new(Config::new(2)));
        drop(Recycled::borrow(&pool));
        let frame = Recycled::borrow(&pool);

        {
            let inspect = pool.borrow();
            assert!(inspect.is_empty());
            // Neither returning nor borrowing may touch the cell right now
            drop(frame);
            let fresh = Recycled::borrow(&pool);
            assert!(!fresh.was_recycled());
            fresh.detach();
        }

        assert!(pool.borrow().is_empty());
        drop(Recycled::borrow(&pool));
        assert_eq!(pool.borrow().len(), 1);
    }
}
