use std::fmt;

/// Unified error type for pool and codec operations.
///
/// Every variant is recoverable: decode errors surface to the caller that
/// requested the acquisition, and the partially-initialized instance has
/// already been reclaimed by the time the error is returned.
#[derive(Debug)]
pub enum Error {
    /// Malformed input (missing delimiter, bad literal, invalid number)
    Decode(String),

    /// Numeric value does not fit the requested target type
    Range(&'static str),

    /// Strict decoder encountered a field key it does not recognize
    UnknownField(String),

    /// Input ended before the value was complete
    UnexpectedEof,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(msg) => write!(f, "decode error: {}", msg),
            Error::Range(ty) => write!(f, "value out of range for {}", ty),
            Error::UnknownField(key) => write!(f, "unknown field: {}", key),
            Error::UnexpectedEof => write!(f, "unexpected end of input"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias for pool and codec operations
pub type Result<T> = std::result::Result<T, Error>;
