//! Handwritten JSON codec for pooled values.
//!
//! Object framing is generic; per-field encode/decode logic lives on the
//! concrete types through [`ObjectEncode`] and [`ObjectDecode`], so pools can
//! rehydrate any value type from bytes without knowing its shape.

mod decode;
mod encode;

pub use decode::{Decoder, FieldKey, ObjectDecode};
pub use encode::{ArrayEncode, Encoder, ObjectEncode};
