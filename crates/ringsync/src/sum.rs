//! Running-sum tracking for ring buffers.
//!
//! The accumulator is a type parameter of [`RingBuffer`](crate::RingBuffer),
//! so a buffer without sum tracking pays nothing and `sum()` only exists on
//! buffers that track it.

/// Observes every element entering and leaving a ring buffer.
pub trait Accumulator<T> {
    /// An element was stored.
    fn add(&mut self, item: &T);
    /// An element left the buffer (pulled, evicted or discarded).
    fn sub(&mut self, item: &T);
    /// The buffer was emptied in one step.
    fn reset(&mut self);
}

/// No sum tracking.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSum;

impl<T> Accumulator<T> for NoSum {
    #[inline]
    fn add(&mut self, _item: &T) {}

    #[inline]
    fn sub(&mut self, _item: &T) {}

    #[inline]
    fn reset(&mut self) {}
}

/// Element types a [`RunningSum`] can total.
///
/// Integers wrap on overflow, so the total is exact modulo `2^BITS` and stays
/// exact whenever the true sum of the live elements fits in `Self`. A
/// transient overflow while elements come and go never panics.
pub trait Summable: Copy + Default {
    fn sum_add(self, rhs: Self) -> Self;
    fn sum_sub(self, rhs: Self) -> Self;
}

macro_rules! summable_int {
    ($($t:ty),*) => {$(
        impl Summable for $t {
            #[inline]
            fn sum_add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            #[inline]
            fn sum_sub(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }
        }
    )*};
}

macro_rules! summable_float {
    ($($t:ty),*) => {$(
        impl Summable for $t {
            #[inline]
            fn sum_add(self, rhs: Self) -> Self {
                self + rhs
            }

            #[inline]
            fn sum_sub(self, rhs: Self) -> Self {
                self - rhs
            }
        }
    )*};
}

summable_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);
summable_float!(f32, f64);

/// Keeps the arithmetic sum of the elements currently held.
///
/// Only [`Summable`] element types qualify; pointer-like elements (`Box<T>`)
/// cannot be summed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningSum<T> {
    total: T,
}

impl<T: Copy> RunningSum<T> {
    /// Current total.
    #[inline]
    pub fn total(&self) -> T {
        self.total
    }
}

impl<T: Summable> Accumulator<T> for RunningSum<T> {
    #[inline]
    fn add(&mut self, item: &T) {
        self.total = self.total.sum_add(*item);
    }

    #[inline]
    fn sub(&mut self, item: &T) {
        self.total = self.total.sum_sub(*item);
    }

    #[inline]
    fn reset(&mut self) {
        self.total = T::default();
    }
}
