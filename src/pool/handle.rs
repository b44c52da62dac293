//! Reference-counted handles for pooled values.
//!
//! Acquiring yields an exclusive [`PooledMut`]; converting it with
//! [`PooledMut::share`] yields the read-only [`Pooled`], whose `Clone`
//! aliases the same instance. Dropping the last handle of either kind resets
//! the value and returns its slot to the owning producer, so release cannot
//! be forgotten or doubled.

use std::cell::UnsafeCell;
use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::codec::{Encoder, ObjectEncode};
use crate::pool::{Poolable, Producer};

/// One reusable instance plus its reference count.
///
/// The count is the only state shared between concurrent holders; the value
/// itself is reachable mutably only through a unique [`PooledMut`] or during
/// the reset that runs after the count hits zero.
pub(crate) struct Slot<T> {
    refs: AtomicUsize,
    value: UnsafeCell<T>,
}

// Shared handles hand out &T across threads and the last drop on any thread
// runs reset, so both bounds are required.
unsafe impl<T: Send + Sync> Send for Slot<T> {}
unsafe impl<T: Send + Sync> Sync for Slot<T> {}

impl<T> Slot<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            refs: AtomicUsize::new(0),
            value: UnsafeCell::new(value),
        }
    }

    /// Marks the slot as freshly acquired. Called only by the producer, on a
    /// slot no handle currently points at.
    pub(crate) fn init_refs(&self) {
        self.refs.store(1, Ordering::Release);
    }
}

/// Drops one ownership unit; the handle that drives the count to zero resets
/// the value and hands the slot back to the producer.
fn release<T: Poolable>(slot: &Arc<Slot<T>>, producer: &Producer<T>) {
    if slot.refs.fetch_sub(1, Ordering::AcqRel) == 1 {
        // SAFETY: the count just hit zero, so no other handle exists and the
        // producer will not hand the slot out again until we reclaim it.
        unsafe { (*slot.value.get()).reset() };
        producer.reclaim(Arc::clone(slot));
    }
}

/// Exclusively held pooled value, fresh from [`Producer::acquire`].
///
/// Grants mutable access. Not cloneable: to hand the value to multiple
/// holders, convert it into the read-only [`Pooled`] with
/// [`PooledMut::share`].
pub struct PooledMut<T: Poolable> {
    slot: Arc<Slot<T>>,
    producer: Producer<T>,
}

impl<T: Poolable> PooledMut<T> {
    pub(crate) fn new(slot: Arc<Slot<T>>, producer: Producer<T>) -> Self {
        Self { slot, producer }
    }

    /// Convert into a shared, read-only handle without touching the
    /// reference count.
    pub fn share(self) -> Pooled<T> {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so ownership of both fields moves
        // out exactly once and the count stays balanced.
        unsafe {
            Pooled {
                slot: ptr::read(&this.slot),
                producer: ptr::read(&this.producer),
            }
        }
    }
}

impl<T: Poolable> Deref for PooledMut<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: this handle is unique while it exists, so no mutable alias
        // can be live.
        unsafe { &*self.slot.value.get() }
    }
}

impl<T: Poolable> DerefMut for PooledMut<T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: this handle is unique while it exists and is borrowed
        // mutably here, so this is the only access.
        unsafe { &mut *self.slot.value.get() }
    }
}

impl<T: Poolable> Drop for PooledMut<T> {
    fn drop(&mut self) {
        release(&self.slot, &self.producer);
    }
}

impl<T: Poolable + fmt::Debug> fmt::Debug for PooledMut<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// Shared, read-only handle to a pooled value.
///
/// `Clone` increments the reference count and returns a handle to the *same*
/// instance; it never copies the value. The instance returns to its pool when
/// the last handle drops.
pub struct Pooled<T: Poolable> {
    slot: Arc<Slot<T>>,
    producer: Producer<T>,
}

impl<T: Poolable> Pooled<T> {
    /// True when both handles alias the same underlying instance.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.slot, &b.slot)
    }

    /// Current number of ownership units. Racy under concurrent clones and
    /// drops; meaningful mostly in tests.
    pub fn ref_count(this: &Self) -> usize {
        this.slot.refs.load(Ordering::Acquire)
    }
}

impl<T: Poolable> Clone for Pooled<T> {
    fn clone(&self) -> Self {
        self.slot.refs.fetch_add(1, Ordering::Relaxed);
        Self {
            slot: Arc::clone(&self.slot),
            producer: self.producer.clone(),
        }
    }
}

impl<T: Poolable> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: shared handles only ever produce shared references; the
        // value is not mutated until the count reaches zero.
        unsafe { &*self.slot.value.get() }
    }
}

impl<T: Poolable> Drop for Pooled<T> {
    fn drop(&mut self) {
        release(&self.slot, &self.producer);
    }
}

impl<T: Poolable + fmt::Debug> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

// Shared handles encode like the value they point at, so nested pooled
// fields plug straight into the codec.
impl<T: Poolable> ObjectEncode for Pooled<T> {
    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn encode_fields(&self, enc: &mut Encoder) {
        (**self).encode_fields(enc);
    }

    fn encode(&self, enc: &mut Encoder) {
        (**self).encode(enc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Decoder, FieldKey, ObjectDecode};
    use crate::error::{Error, Result};

    /// A playing card; rank 0 means "no card".
    #[derive(Debug, Default)]
    struct Card {
        rank: u8,
        suit: u8,
    }

    impl ObjectEncode for Card {
        fn is_empty(&self) -> bool {
            self.rank == 0 && self.suit == 0
        }

        fn encode_fields(&self, enc: &mut Encoder) {
            enc.u64_field_opt("rank", u64::from(self.rank));
            enc.u64_field_opt("suit", u64::from(self.suit));
        }
    }

    impl ObjectDecode for Card {
        fn decode_field(&mut self, dec: &mut Decoder<'_>, key: FieldKey<'_>) -> Result<()> {
            match key.as_bytes() {
                b"rank" => self.rank = dec.u8()?,
                b"suit" => self.suit = dec.u8()?,
                _ => return Err(Error::UnknownField(key.to_string())),
            }
            Ok(())
        }
    }

    impl Poolable for Card {
        fn reset(&mut self) {
            self.rank = 0;
            self.suit = 0;
        }
    }

    fn card_producer() -> Producer<Card> {
        Producer::new(Card::default)
    }

    #[test]
    fn acquire_clone_release_reclaims_exactly_once() {
        let producer = card_producer();
        let baseline = producer.stats().returns;

        let mut card = producer.acquire();
        card.rank = 12;
        card.suit = 3;

        let a = card.share();
        let b = a.clone();
        let c = a.clone();
        assert_eq!(Pooled::ref_count(&a), 3);

        drop(a);
        drop(b);
        assert_eq!(producer.stats().returns, baseline, "reclaimed too early");

        drop(c);
        assert_eq!(producer.stats().returns, baseline + 1);
    }

    #[test]
    fn clone_aliases_the_same_instance() {
        let producer = card_producer();

        let mut card = producer.acquire();
        card.rank = 7;
        let a = card.share();
        let b = a.clone();

        assert!(Pooled::ptr_eq(&a, &b));
        assert_eq!(a.rank, 7);
        assert_eq!(b.rank, 7);
    }

    #[test]
    fn reacquired_slot_is_reset_to_the_zero_card() {
        let producer = card_producer();

        let mut card = producer.acquire();
        card.rank = 13;
        card.suit = 2;
        let shared = card.share();
        let other = shared.clone();
        let third = shared.clone();
        drop(shared);
        drop(other);
        drop(third);

        // The freed slot is the next one handed out, reset to zero state.
        let card = producer.acquire();
        assert_eq!(card.rank, 0);
        assert_eq!(card.suit, 0);
        assert!(card.is_empty());
    }

    #[test]
    fn exclusive_handle_round_trips_through_the_pool() {
        let producer = card_producer();
        let before = producer.stats();

        {
            let mut card = producer.acquire();
            card.rank = 1;
        }

        let after = producer.stats();
        assert_eq!(after.returns, before.returns + 1);
        assert_eq!(after.size, before.size);
    }

    #[test]
    fn shared_handles_released_across_threads() {
        let producer = card_producer();
        let baseline = producer.stats().returns;

        let mut card = producer.acquire();
        card.rank = 9;
        let shared = card.share();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let h = shared.clone();
                std::thread::spawn(move || {
                    assert_eq!(h.rank, 9);
                })
            })
            .collect();
        drop(shared);
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(producer.stats().returns, baseline + 1);
    }

    #[test]
    fn concurrent_acquire_release_keeps_the_pool_consistent() {
        let producer = card_producer();
        let threads = 8;
        let cycles = 2_000;

        std::thread::scope(|s| {
            for _ in 0..threads {
                let producer = producer.clone();
                s.spawn(move || {
                    for i in 0..cycles {
                        let mut card = producer.acquire();
                        assert_eq!(card.rank, 0, "stale value leaked across reuse");
                        card.rank = (i % 13 + 1) as u8;
                        if i % 3 == 0 {
                            let shared = card.share();
                            let clone = shared.clone();
                            drop(shared);
                            drop(clone);
                        }
                    }
                });
            }
        });

        let stats = producer.stats();
        assert_eq!(stats.hits + stats.misses, stats.returns);
        assert_eq!(stats.size, stats.returns - stats.hits);
    }
}
