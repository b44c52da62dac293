//! Lock-free object pools with reference-counted handles.
//!
//! One [`Producer`] per concrete value type hands out instances that cycle
//! between "in use" and "pooled" without ever being freed, so hot simulation
//! paths run allocation-free once the pools are warm.

mod buffer;
mod handle;
mod producer;

pub use buffer::{scratch_pool, BufferPool, BufferStats, DEFAULT_BUFFER_CAPACITY};
pub use handle::{Pooled, PooledMut};
pub use producer::{PoolStats, Poolable, Producer};
