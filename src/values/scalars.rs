//! Poolable vectors of primitive values.

use std::fmt;

use crate::codec::{ArrayEncode, Decoder, Encoder, FieldKey, ObjectDecode, ObjectEncode};
use crate::error::{Error, Result};
use crate::pool::{Poolable, Producer};

/// A primitive element type a [`ScalarList`] can hold.
pub trait Scalar: Copy + Default + Send + Sync + 'static {
    /// Write one value.
    fn encode_value(self, enc: &mut Encoder);

    /// Read one value.
    fn decode_value(dec: &mut Decoder<'_>) -> Result<Self>;
}

macro_rules! int_scalar {
    ($ty:ty, $write:ident, $read:ident) => {
        impl Scalar for $ty {
            fn encode_value(self, enc: &mut Encoder) {
                enc.$write(self as _);
            }

            fn decode_value(dec: &mut Decoder<'_>) -> Result<Self> {
                dec.$read()
            }
        }
    };
}

int_scalar!(i64, i64, i64);
int_scalar!(i32, i64, i32);
int_scalar!(u64, u64, u64);
int_scalar!(u32, u64, u32);
int_scalar!(u16, u64, u16);
int_scalar!(u8, u64, u8);

impl Scalar for f64 {
    fn encode_value(self, enc: &mut Encoder) {
        enc.f64(self);
    }

    fn decode_value(dec: &mut Decoder<'_>) -> Result<Self> {
        dec.f64()
    }
}

impl Scalar for bool {
    fn encode_value(self, enc: &mut Encoder) {
        enc.bool(self);
    }

    fn decode_value(dec: &mut Decoder<'_>) -> Result<Self> {
        dec.bool()
    }
}

/// A pooled vector of primitives, encoded as a JSON array.
///
/// Reel strips, dice rolls, payline indices and similar hot-path lists reuse
/// one allocation across rounds instead of reallocating per round.
pub struct ScalarList<S: Scalar> {
    min_cap: usize,
    max_cap: usize,
    full_clear: bool,
    items: Vec<S>,
}

impl<S: Scalar> ScalarList<S> {
    /// Create a producer of pooled scalar vectors.
    ///
    /// `min_cap` is the capacity vectors start with and shrink back to; a
    /// vector that grew past `max_cap` gives its excess memory back on reset.
    /// With `full_clear`, reset zeroes the live elements before clearing
    /// them, so the last round's values do not survive in reclaimed memory.
    pub fn producer(min_cap: usize, max_cap: usize, full_clear: bool) -> Producer<ScalarList<S>> {
        Producer::new(move || ScalarList {
            min_cap,
            max_cap,
            full_clear,
            items: Vec::with_capacity(min_cap),
        })
    }

    /// Append one value.
    pub fn push(&mut self, v: S) {
        self.items.push(v);
    }

    /// Append a slice of values.
    pub fn append(&mut self, vs: &[S]) {
        self.items.extend_from_slice(vs);
    }

    /// Overwrite the contents with the given values.
    pub fn replace(&mut self, vs: &[S]) {
        self.items.clear();
        self.items.extend_from_slice(vs);
    }

    /// The values.
    pub fn items(&self) -> &[S] {
        &self.items
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<S: Scalar + fmt::Debug> fmt::Debug for ScalarList<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.items, f)
    }
}

impl<S: Scalar> ObjectEncode for ScalarList<S> {
    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // Scalar lists frame themselves as arrays; there are no object fields.
    fn encode_fields(&self, _enc: &mut Encoder) {}

    fn encode(&self, enc: &mut Encoder) {
        enc.array(self);
    }
}

impl<S: Scalar> ArrayEncode for ScalarList<S> {
    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn encode_values(&self, enc: &mut Encoder) {
        for &v in &self.items {
            v.encode_value(enc);
        }
    }
}

impl<S: Scalar> ObjectDecode for ScalarList<S> {
    fn decode_field(&mut self, _dec: &mut Decoder<'_>, key: FieldKey<'_>) -> Result<()> {
        Err(Error::UnknownField(key.to_string()))
    }

    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        self.items.clear();
        let items = &mut self.items;
        dec.array(|d| {
            items.push(S::decode_value(d)?);
            Ok(())
        })
    }
}

impl<S: Scalar> Poolable for ScalarList<S> {
    fn reset(&mut self) {
        if self.full_clear {
            for v in self.items.iter_mut() {
                *v = S::default();
            }
        }
        self.items.clear();
        if self.max_cap > self.min_cap && self.items.capacity() > self.max_cap {
            self.items = Vec::with_capacity(self.min_cap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_reel_positions() {
        let producer: Producer<ScalarList<u16>> = ScalarList::producer(8, 256, false);

        let mut reels = producer.acquire();
        reels.append(&[12, 0, 31, 7]);

        let mut enc = Encoder::new();
        (*reels).encode(&mut enc);
        assert_eq!(enc.as_bytes(), b"[12,0,31,7]");

        let decoded = producer.acquire_from_json(enc.as_bytes()).unwrap();
        assert_eq!(decoded.items(), &[12, 0, 31, 7]);
    }

    #[test]
    fn round_trips_floats_and_bools() {
        let floats: Producer<ScalarList<f64>> = ScalarList::producer(4, 64, false);
        let decoded = floats.acquire_from_json(b"[0.5,96.25,-1.0]").unwrap();
        assert_eq!(decoded.items(), &[0.5, 96.25, -1.0]);

        let bools: Producer<ScalarList<bool>> = ScalarList::producer(4, 64, false);
        let decoded = bools.acquire_from_json(b"[true,false,true]").unwrap();
        assert_eq!(decoded.items(), &[true, false, true]);
    }

    #[test]
    fn rejects_out_of_range_elements() {
        let producer: Producer<ScalarList<u8>> = ScalarList::producer(4, 64, false);
        let err = producer.acquire_from_json(b"[1,2,300]").unwrap_err();
        assert!(matches!(err, Error::Range("u8")));
    }

    #[test]
    fn reuse_never_shows_previous_contents() {
        let producer: Producer<ScalarList<u64>> = ScalarList::producer(4, 64, true);

        {
            let mut list = producer.acquire();
            list.append(&[1, 2, 3]);
        }

        let list = producer.acquire();
        assert_eq!(list.len(), 0);
        assert!(list.items().is_empty());
    }

    #[test]
    fn debug_formats_as_the_underlying_vector() {
        let producer: Producer<ScalarList<u8>> = ScalarList::producer(4, 64, false);
        let mut list = producer.acquire();
        list.append(&[1, 2, 3]);
        assert_eq!(format!("{:?}", *list), "[1, 2, 3]");
    }

    #[test]
    fn reset_gives_back_excess_capacity() {
        let producer: Producer<ScalarList<u64>> = ScalarList::producer(4, 16, false);

        {
            let mut list = producer.acquire();
            for i in 0..100 {
                list.push(i);
            }
        }

        let list = producer.acquire();
        assert!(list.items.capacity() <= 16);
    }

    #[test]
    fn empty_list_elided_by_opt_field() {
        let producer: Producer<ScalarList<u8>> = ScalarList::producer(4, 64, false);
        let list = producer.acquire();

        let mut enc = Encoder::new();
        enc.start_object();
        enc.array_field_opt("rolls", &*list);
        enc.end_object();
        assert_eq!(enc.as_bytes(), b"{}");
    }
}
