use std::fmt;

use crate::error::{Error, Result};

/// A raw field key handed to [`ObjectDecode::decode_field`].
///
/// Keys stay as borrowed bytes so per-type dispatch can match on byte
/// literals without allocating; the wrapper keeps the raw comparisons in
/// one place.
#[derive(Clone, Copy)]
pub struct FieldKey<'a>(&'a [u8]);

impl<'a> FieldKey<'a> {
    /// The raw key bytes, for `match key.as_bytes() { b"rank" => ... }`.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    /// The key as UTF-8, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.0).ok()
    }
}

impl PartialEq<str> for FieldKey<'_> {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for FieldKey<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for FieldKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.0))
    }
}

impl fmt::Debug for FieldKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldKey({:?})", String::from_utf8_lossy(self.0))
    }
}

/// Values that decode from a JSON object.
///
/// `decode_field` is called once per key encountered in the input. Unknown
/// keys are a per-type policy: permissive types call
/// [`Decoder::skip_value`], strict types return [`Error::UnknownField`].
pub trait ObjectDecode {
    /// Decode the value for one field key.
    fn decode_field(&mut self, dec: &mut Decoder<'_>, key: FieldKey<'_>) -> Result<()>;

    /// Decode the whole value. Reads a JSON object by default; reimplement
    /// for values that frame themselves differently.
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()>
    where
        Self: Sized,
    {
        dec.object(self)
    }
}

/// Handwritten JSON decoder over a borrowed input buffer.
///
/// Unescaped strings and field keys are handed out as slices of the input;
/// only escape sequences take a scratch-buffer detour. Not for use from
/// multiple threads at once.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
    scratch: Vec<u8>,
}

impl<'a> Decoder<'a> {
    /// Create a decoder over the given input.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            scratch: Vec::new(),
        }
    }

    /// Decode an object, dispatching each field to `o.decode_field`.
    pub fn object<O: ObjectDecode + ?Sized>(&mut self, o: &mut O) -> Result<()> {
        match self.next_token() {
            Some(b'{') => {}
            Some(_) => return Err(Error::Decode("start delimiter '{' missing".to_string())),
            None => return Err(Error::UnexpectedEof),
        }

        let mut first = true;
        loop {
            let b = self
                .next_token()
                .ok_or_else(|| Error::Decode("end delimiter '}' missing".to_string()))?;
            if b == b'}' {
                return Ok(());
            }

            if first {
                self.pos -= 1; // push back
                first = false;
            } else if b != b',' {
                return Err(Error::Decode("field separator ',' missing".to_string()));
            }

            let (start, end, escaped) = self.read_string()?;
            match self.next_token() {
                Some(b':') => {}
                _ => return Err(Error::Decode("key delimiter ':' missing".to_string())),
            }

            if escaped {
                // Escaped keys are rare; unescape into a detached buffer so
                // the decoder stays borrowable for the field value.
                let buf = self.buf;
                let key = unescape_owned(&buf[start..end]);
                o.decode_field(self, FieldKey(&key))?;
            } else {
                let buf = self.buf;
                o.decode_field(self, FieldKey(&buf[start..end]))?;
            }
        }
    }

    /// Decode an array, calling `f` once per value.
    pub fn array<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&mut Decoder<'a>) -> Result<()>,
    {
        match self.next_token() {
            Some(b'[') => {}
            Some(_) => return Err(Error::Decode("start delimiter '[' missing".to_string())),
            None => return Err(Error::UnexpectedEof),
        }

        let mut first = true;
        loop {
            let b = self
                .next_token()
                .ok_or_else(|| Error::Decode("end delimiter ']' missing".to_string()))?;
            if b == b']' {
                return Ok(());
            }

            if first {
                self.pos -= 1; // push back
                first = false;
            } else if b != b',' {
                return Err(Error::Decode("value separator ',' missing".to_string()));
            }

            f(self)?;
        }
    }

    /// Decode a string value. Unescaped inputs come back as a slice of the
    /// input buffer; escaped inputs are unescaped into the scratch buffer.
    pub fn str(&mut self) -> Result<&str> {
        let (start, end, escaped) = self.read_string()?;
        let buf = self.buf;
        let raw = &buf[start..end];
        let bytes = if escaped {
            self.scratch.clear();
            unescape_into(raw, &mut self.scratch);
            &self.scratch[..]
        } else {
            raw
        };
        std::str::from_utf8(bytes).map_err(|e| Error::Decode(format!("invalid utf8: {}", e)))
    }

    /// Decode a boolean from a `true`/`false` literal.
    pub fn bool(&mut self) -> Result<bool> {
        let (start, end) = self.read_value()?;
        match &self.buf[start..end] {
            b"true" => Ok(true),
            b"false" => Ok(false),
            _ => Err(Error::Decode("invalid boolean value".to_string())),
        }
    }

    /// Decode a boolean encoded as 0 or 1.
    pub fn int_bool(&mut self) -> Result<bool> {
        let (start, end) = self.read_value()?;
        match &self.buf[start..end] {
            b"1" => Ok(true),
            b"0" => Ok(false),
            _ => Err(Error::Decode("invalid boolean value".to_string())),
        }
    }

    /// Decode a signed 64-bit integer.
    pub fn i64(&mut self) -> Result<i64> {
        let (start, end) = self.read_value()?;

        // single digit fast path
        if end - start == 1 && self.buf[start].is_ascii_digit() {
            return Ok(i64::from(self.buf[start] - b'0'));
        }

        let s = std::str::from_utf8(&self.buf[start..end])
            .map_err(|e| Error::Decode(format!("invalid utf8: {}", e)))?;
        s.parse()
            .map_err(|_| Error::Decode(format!("invalid integer: {}", s)))
    }

    /// Decode an unsigned 64-bit integer.
    pub fn u64(&mut self) -> Result<u64> {
        let (start, end) = self.read_value()?;

        if end - start == 1 && self.buf[start].is_ascii_digit() {
            return Ok(u64::from(self.buf[start] - b'0'));
        }

        let s = std::str::from_utf8(&self.buf[start..end])
            .map_err(|e| Error::Decode(format!("invalid utf8: {}", e)))?;
        s.parse()
            .map_err(|_| Error::Decode(format!("invalid unsigned integer: {}", s)))
    }

    /// Decode a signed 32-bit integer, rejecting out-of-range input.
    pub fn i32(&mut self) -> Result<i32> {
        let v = self.i64()?;
        i32::try_from(v).map_err(|_| Error::Range("i32"))
    }

    /// Decode an unsigned 32-bit integer, rejecting out-of-range input.
    pub fn u32(&mut self) -> Result<u32> {
        let v = self.u64()?;
        u32::try_from(v).map_err(|_| Error::Range("u32"))
    }

    /// Decode an unsigned 16-bit integer, rejecting out-of-range input.
    pub fn u16(&mut self) -> Result<u16> {
        let v = self.u64()?;
        u16::try_from(v).map_err(|_| Error::Range("u16"))
    }

    /// Decode an unsigned 8-bit integer, rejecting out-of-range input.
    pub fn u8(&mut self) -> Result<u8> {
        let v = self.u64()?;
        u8::try_from(v).map_err(|_| Error::Range("u8"))
    }

    /// Decode a 64-bit floating point value.
    pub fn f64(&mut self) -> Result<f64> {
        let (start, end) = self.read_value()?;
        let s = std::str::from_utf8(&self.buf[start..end])
            .map_err(|e| Error::Decode(format!("invalid utf8: {}", e)))?;
        s.parse()
            .map_err(|_| Error::Decode(format!("invalid float: {}", s)))
    }

    /// Skip one well-formed value of any kind. Lets permissive decoders
    /// ignore unknown fields.
    pub fn skip_value(&mut self) -> Result<()> {
        let b = self.next_token().ok_or(Error::UnexpectedEof)?;
        match b {
            b'"' => {
                self.pos -= 1;
                self.read_string()?;
                Ok(())
            }
            b'{' | b'[' => self.skip_nested(),
            _ => {
                self.pos -= 1;
                self.read_value()?;
                Ok(())
            }
        }
    }

    // Skips to the end of an object or array whose opener was just consumed.
    fn skip_nested(&mut self) -> Result<()> {
        let mut depth = 1usize;
        while depth > 0 {
            let b = *self.buf.get(self.pos).ok_or(Error::UnexpectedEof)?;
            self.pos += 1;
            match b {
                b'"' => {
                    self.pos -= 1;
                    self.read_string()?;
                }
                b'{' | b'[' => depth += 1,
                b'}' | b']' => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    // Reads a quoted string, returning its content range and whether it
    // contains escape sequences.
    fn read_string(&mut self) -> Result<(usize, usize, bool)> {
        match self.next_token() {
            Some(b'"') => {}
            Some(_) => return Err(Error::Decode("string delimiter '\"' missing".to_string())),
            None => return Err(Error::UnexpectedEof),
        }

        let start = self.pos;
        let mut escaped = false;

        while self.pos < self.buf.len() {
            let b = self.buf[self.pos];
            self.pos += 1;

            if b == b'"' {
                return Ok((start, self.pos - 1, escaped));
            }
            if b == b'\\' {
                self.pos += 1;
                escaped = true;
            }
        }

        Err(Error::UnexpectedEof)
    }

    // Reads an unquoted value (number or literal) up to the next delimiter.
    fn read_value(&mut self) -> Result<(usize, usize)> {
        if self.next_token().is_none() {
            return Err(Error::UnexpectedEof);
        }
        self.pos -= 1;
        let start = self.pos;

        while self.pos < self.buf.len() {
            match self.buf[self.pos] {
                b',' | b'}' | b']' | b' ' | b'\n' | b'\r' | b'\t' => break,
                _ => self.pos += 1,
            }
        }

        if self.pos > start {
            Ok((start, self.pos))
        } else {
            Err(Error::Decode("missing value".to_string()))
        }
    }

    // Skips whitespace and consumes the next byte.
    fn next_token(&mut self) -> Option<u8> {
        while self.pos < self.buf.len() {
            let b = self.buf[self.pos];
            self.pos += 1;
            if !matches!(b, b' ' | b'\n' | b'\r' | b'\t') {
                return Some(b);
            }
        }
        None
    }
}

// \uXXXX escapes pass through uninterpreted; unknown escapes keep the
// escaped character.
fn unescape_into(data: &[u8], out: &mut Vec<u8>) {
    let mut escape = false;
    for &b in data {
        if escape {
            out.push(match b {
                b'b' => 0x08,
                b'f' => 0x0c,
                b'n' => b'\n',
                b'r' => b'\r',
                b't' => b'\t',
                _ => b,
            });
            escape = false;
        } else if b == b'\\' {
            escape = true;
        } else {
            out.push(b);
        }
    }
}

fn unescape_owned(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    unescape_into(data, &mut out);
    out
}
