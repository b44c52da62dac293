//! Lock-free scratch-buffer pool backing the codec's encoders.

use bytes::BytesMut;
use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Default capacity for pooled scratch buffers.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// Maximum buffers retained in the pool.
const MAX_POOL_SIZE: usize = 128;

/// Buffers that grew past this are not worth keeping around.
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

static SCRATCH_POOL: OnceLock<BufferPool> = OnceLock::new();

/// The process-wide scratch-buffer pool used by [`crate::codec::Encoder`].
pub fn scratch_pool() -> &'static BufferPool {
    SCRATCH_POOL.get_or_init(BufferPool::new)
}

/// Lock-free pool of reusable `BytesMut` scratch buffers.
pub struct BufferPool {
    free: ArrayQueue<BytesMut>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    returns: AtomicUsize,
    drops: AtomicUsize,
}

impl BufferPool {
    /// Create an empty buffer pool.
    pub fn new() -> Self {
        Self {
            free: ArrayQueue::new(MAX_POOL_SIZE),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            returns: AtomicUsize::new(0),
            drops: AtomicUsize::new(0),
        }
    }

    /// Take a default-sized buffer from the pool, or allocate one.
    #[inline]
    pub fn get(&self) -> BytesMut {
        self.get_with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Take a buffer with at least `min_capacity` bytes of room.
    pub fn get_with_capacity(&self, min_capacity: usize) -> BytesMut {
        match self.free.pop() {
            Some(mut buf) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                if buf.capacity() < min_capacity {
                    buf.reserve(min_capacity - buf.capacity());
                }
                buf
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                BytesMut::with_capacity(min_capacity)
            }
        }
    }

    /// Return a buffer to the pool. Cleared first; dropped instead of pooled
    /// when it is oversized or the pool is full.
    pub fn put(&self, mut buf: BytesMut) {
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            self.drops.fetch_add(1, Ordering::Relaxed);
            return;
        }

        buf.clear();

        if self.free.push(buf).is_ok() {
            self.returns.fetch_add(1, Ordering::Relaxed);
        } else {
            self.drops.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> BufferStats {
        BufferStats {
            size: self.free.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Buffer pool counters for monitoring.
#[derive(Debug, Clone, Copy)]
pub struct BufferStats {
    /// Buffers currently sitting in the pool.
    pub size: usize,
    /// Buffers served from the pool.
    pub hits: usize,
    /// Buffers allocated fresh on a pool miss.
    pub misses: usize,
    /// Buffers returned to the pool.
    pub returns: usize,
    /// Buffers discarded (oversized or pool full).
    pub drops: usize,
}
