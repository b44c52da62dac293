//! Pooled, reference-counted values for high-throughput game simulation.
//!
//! Every hot-path value in the simulation pipeline (cards, dice, spin
//! results, round state) lives in a per-type [`Producer`] pool. Acquiring
//! yields an exclusive, mutable handle; sharing converts it into a read-only
//! handle whose clones alias the same instance. When the last handle drops,
//! the value resets to its zero state and its slot returns to the pool, so
//! sustained simulation load allocates nothing.
//!
//! Values serialize through the handwritten JSON codec in [`codec`]: object
//! framing is generic, per-field logic lives on the concrete types, and a
//! producer can rehydrate any value straight from bytes with
//! [`Producer::acquire_from_json`].
//!
//! ```
//! use spinpool::{
//!     Decoder, Encoder, Error, FieldKey, ObjectDecode, ObjectEncode, Poolable, Producer, Result,
//! };
//!
//! #[derive(Default)]
//! struct Card {
//!     rank: u8,
//!     suit: u8,
//! }
//!
//! impl ObjectEncode for Card {
//!     fn is_empty(&self) -> bool {
//!         self.rank == 0 && self.suit == 0
//!     }
//!
//!     fn encode_fields(&self, enc: &mut Encoder) {
//!         enc.u64_field_opt("rank", u64::from(self.rank));
//!         enc.u64_field_opt("suit", u64::from(self.suit));
//!     }
//! }
//!
//! impl ObjectDecode for Card {
//!     fn decode_field(&mut self, dec: &mut Decoder<'_>, key: FieldKey<'_>) -> Result<()> {
//!         match key.as_bytes() {
//!             b"rank" => self.rank = dec.u8()?,
//!             b"suit" => self.suit = dec.u8()?,
//!             _ => return Err(Error::UnknownField(key.to_string())),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! impl Poolable for Card {
//!     fn reset(&mut self) {
//!         self.rank = 0;
//!         self.suit = 0;
//!     }
//! }
//!
//! let cards = Producer::new(Card::default);
//!
//! let mut card = cards.acquire();
//! card.rank = 12;
//! card.suit = 3;
//!
//! // Hand the same instance to several holders.
//! let shared = card.share();
//! let for_metrics = shared.clone();
//! assert_eq!(for_metrics.rank, 12);
//! drop(shared);
//! drop(for_metrics); // last drop: reset, back to the pool
//!
//! let card = cards.acquire_from_json(br#"{"rank":5,"suit":1}"#).unwrap();
//! assert_eq!(card.rank, 5);
//! ```

pub mod codec;
pub mod error;
pub mod pool;
pub mod values;

pub use codec::{ArrayEncode, Decoder, Encoder, FieldKey, ObjectDecode, ObjectEncode};
pub use error::{Error, Result};
pub use pool::{PoolStats, Poolable, Pooled, PooledMut, Producer};
pub use values::{PooledList, Scalar, ScalarList};
