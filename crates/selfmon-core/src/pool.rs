//! Reusable buffer pools for index and key construction.
//!
//! Pools only amortize allocation. A buffer is cleared before it goes back to
//! the free list, so nothing written by one caller is visible to the next.
//! Dropping every pool and allocating fresh storage per call is equivalent.
//!
//! Callers never wait on the free list: if another thread holds it, `get`
//! allocates a fresh buffer and release drops the buffer instead.

use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

/// Idle buffers kept per pool. Extra buffers are dropped on release.
pub const DEFAULT_MAX_IDLE: usize = 64;

/// A buffer that can be emptied for reuse without releasing its capacity.
pub trait Recycle {
    fn recycle(&mut self);
}

impl<T> Recycle for Vec<T> {
    fn recycle(&mut self) {
        self.clear();
    }
}

impl Recycle for String {
    fn recycle(&mut self) {
        self.clear();
    }
}

/// Bounded free list of buffers.
pub struct BufferPool<T: Recycle> {
    free: Mutex<Vec<T>>,
    make: fn() -> T,
    max_idle: usize,
}

impl<T: Recycle> BufferPool<T> {
    pub fn new(make: fn() -> T) -> Self {
        Self::with_max_idle(make, DEFAULT_MAX_IDLE)
    }

    pub fn with_max_idle(make: fn() -> T, max_idle: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            make,
            max_idle,
        }
    }

    /// Take an empty buffer; it returns to the pool when the guard drops.
    pub fn get(&self) -> Pooled<'_, T> {
        let buf = self
            .free
            .try_lock()
            .and_then(|mut free| free.pop())
            .unwrap_or_else(self.make);
        Pooled {
            pool: self,
            buf: Some(buf),
        }
    }

    /// Number of idle buffers.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    fn put(&self, mut buf: T) {
        buf.recycle();
        if let Some(mut free) = self.free.try_lock() {
            if free.len() < self.max_idle {
                free.push(buf);
            }
        }
    }
}

/// Guard over a pooled buffer.
pub struct Pooled<'a, T: Recycle> {
    pool: &'a BufferPool<T>,
    buf: Option<T>,
}

impl<T: Recycle> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.buf {
            Some(b) => b,
            None => unreachable!("pooled buffer released before drop"),
        }
    }
}

impl<T: Recycle> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.buf {
            Some(b) => b,
            None => unreachable!("pooled buffer released before drop"),
        }
    }
}

impl<T: Recycle> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.put(buf);
        }
    }
}
