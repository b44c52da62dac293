//! Ready-made pooled value types: lists of nested pooled values and vectors
//! of primitives.

mod list;
mod scalars;

pub use list::PooledList;
pub use scalars::{Scalar, ScalarList};
