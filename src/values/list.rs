//! Poolable lists of nested pooled values.

use std::fmt;

use crate::codec::{ArrayEncode, Decoder, Encoder, FieldKey, ObjectDecode, ObjectEncode};
use crate::error::{Error, Result};
use crate::pool::{Poolable, Pooled, Producer};

/// A pooled value holding a list of pooled values.
///
/// Encodes as a JSON array of objects. Decoding acquires each item from the
/// item producer; reset drops every handle, which chains release into the
/// nested pool exactly once per item.
pub struct PooledList<T: Poolable> {
    min_cap: usize,
    max_cap: usize,
    item_producer: Producer<T>,
    items: Vec<Pooled<T>>,
}

impl<T: Poolable> PooledList<T> {
    /// Create a producer of pooled lists whose items come from
    /// `item_producer`.
    ///
    /// `min_cap` is the capacity lists start with and shrink back to;
    /// a list that grew past `max_cap` gives its excess memory back on reset.
    pub fn producer(
        min_cap: usize,
        max_cap: usize,
        item_producer: Producer<T>,
    ) -> Producer<PooledList<T>> {
        Producer::new(move || PooledList {
            min_cap,
            max_cap,
            item_producer: item_producer.clone(),
            items: Vec::with_capacity(min_cap),
        })
    }

    /// The producer the list's items come from.
    pub fn item_producer(&self) -> &Producer<T> {
        &self.item_producer
    }

    /// Append a shared handle to the list.
    pub fn push(&mut self, item: Pooled<T>) {
        self.items.push(item);
    }

    /// The list's items.
    pub fn items(&self) -> &[Pooled<T>] {
        &self.items
    }

    /// Number of items in the list.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T: Poolable + fmt::Debug> fmt::Debug for PooledList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.items.iter().map(|item| &**item))
            .finish()
    }
}

impl<T: Poolable> ObjectEncode for PooledList<T> {
    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // Lists frame themselves as arrays; there are no object fields.
    fn encode_fields(&self, _enc: &mut Encoder) {}

    fn encode(&self, enc: &mut Encoder) {
        enc.array(self);
    }
}

impl<T: Poolable> ArrayEncode for PooledList<T> {
    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn encode_values(&self, enc: &mut Encoder) {
        for item in &self.items {
            (**item).encode(enc);
        }
    }
}

impl<T: Poolable> ObjectDecode for PooledList<T> {
    fn decode_field(&mut self, _dec: &mut Decoder<'_>, key: FieldKey<'_>) -> Result<()> {
        Err(Error::UnknownField(key.to_string()))
    }

    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        self.reset();
        let producer = self.item_producer.clone();
        let items = &mut self.items;
        dec.array(|d| {
            let mut item = producer.acquire();
            item.decode(d)?;
            items.push(item.share());
            Ok(())
        })
    }
}

impl<T: Poolable> Poolable for PooledList<T> {
    fn reset(&mut self) {
        // Dropping the handles releases every nested value to its pool.
        self.items.clear();
        if self.max_cap > self.min_cap && self.items.capacity() > self.max_cap {
            self.items = Vec::with_capacity(self.min_cap);
        }
    }
}
