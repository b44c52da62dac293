//! Per-type producers of pooled values.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam::queue::SegQueue;

use crate::codec::{Decoder, ObjectDecode, ObjectEncode};
use crate::error::Result;
use crate::pool::handle::{PooledMut, Slot};

/// A value type that can live in a [`Producer`] pool.
///
/// Implementors supply their reset logic plus field-level encode/decode
/// through the codec traits; the pool lifecycle is generic over this bound,
/// so a missing serializer is a compile error rather than a runtime fault.
pub trait Poolable: ObjectEncode + ObjectDecode + Send + Sync + 'static {
    /// Clear every domain field back to its zero state.
    ///
    /// Runs right before the instance re-enters the free list. Nested pooled
    /// handles must be dropped here so their own pools get them back.
    fn reset(&mut self);
}

/// Reference-counted pool of reusable `T` instances.
///
/// Cheap to clone; clones share the same pool. Safe for concurrent
/// acquire/release from any number of threads: the free list is a lock-free
/// queue and never blocks.
pub struct Producer<T: Poolable> {
    inner: Arc<Inner<T>>,
}

struct Inner<T: Poolable> {
    free: SegQueue<Arc<Slot<T>>>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    returns: AtomicUsize,
}

impl<T: Poolable> Producer<T> {
    /// Create a producer around the given factory.
    ///
    /// The factory runs once immediately and the probe instance is reset and
    /// released into the free list, so a factory that cannot build a valid
    /// instance fails here, at startup, rather than at first use under load.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let producer = Self {
            inner: Arc::new(Inner {
                free: SegQueue::new(),
                factory: Box::new(factory),
                hits: AtomicUsize::new(0),
                misses: AtomicUsize::new(0),
                returns: AtomicUsize::new(0),
            }),
        };

        // Factory probe; dropping it exercises reset and seeds the pool.
        drop(producer.acquire());

        tracing::debug!(
            value_type = %std::any::type_name::<T>(),
            "pooled value producer created"
        );

        producer
    }

    /// Take an instance from the pool, building a fresh one on a miss.
    ///
    /// The returned handle is exclusive (reference count 1) and returns the
    /// instance to the pool when the last handle derived from it drops.
    pub fn acquire(&self) -> PooledMut<T> {
        let slot = match self.inner.free.pop() {
            Some(slot) => {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                slot
            }
            None => {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(
                    value_type = %std::any::type_name::<T>(),
                    "pool miss, building fresh instance"
                );
                Arc::new(Slot::new((self.inner.factory)()))
            }
        };

        slot.init_refs();
        PooledMut::new(slot, self.clone())
    }

    /// Acquire an instance and decode it from JSON bytes.
    ///
    /// On decode failure the instance is reclaimed before the error returns,
    /// so no half-initialized value ever escapes or leaks from the pool.
    pub fn acquire_from_json(&self, data: &[u8]) -> Result<PooledMut<T>> {
        let mut value = self.acquire();
        let mut dec = Decoder::new(data);
        value.decode(&mut dec)?;
        Ok(value)
    }

    /// Return a slot to the free list. Only reachable through the handle
    /// lifecycle, after the reference count hit zero and reset ran.
    pub(crate) fn reclaim(&self, slot: Arc<Slot<T>>) {
        self.inner.returns.fetch_add(1, Ordering::Relaxed);
        self.inner.free.push(slot);
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            size: self.inner.free.len(),
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            returns: self.inner.returns.load(Ordering::Relaxed),
        }
    }
}

impl<T: Poolable> Clone for Producer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Pool counters for monitoring and leak checks.
#[derive(Debug, Clone, Copy)]
pub struct PoolStats {
    /// Instances currently sitting in the free list.
    pub size: usize,
    /// Acquisitions served from the free list.
    pub hits: usize,
    /// Acquisitions that built a fresh instance.
    pub misses: usize,
    /// Instances returned to the free list.
    pub returns: usize,
}

impl PoolStats {
    /// Fraction of acquisitions served without building a fresh instance.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
