use bytes::{BufMut, BytesMut};

use crate::pool::scratch_pool;

/// Values that encode as a JSON object.
///
/// `encode_fields` writes the fields without the surrounding `{}` delimiters,
/// so the same implementation serves both standalone and nested encoding.
pub trait ObjectEncode {
    /// True when the value is logically empty and may be elided by the
    /// `_opt` writers. Defaults to false: always serialized.
    fn is_empty(&self) -> bool {
        false
    }

    /// Write the value's fields, without the surrounding object delimiters.
    fn encode_fields(&self, enc: &mut Encoder);

    /// Write the whole value. Encodes as a JSON object by default;
    /// reimplement for values that frame themselves differently
    /// (lists encode as JSON arrays).
    fn encode(&self, enc: &mut Encoder)
    where
        Self: Sized,
    {
        enc.object(self);
    }
}

/// Values that encode as a JSON array.
pub trait ArrayEncode {
    /// True when the array is empty and may be elided by the `_opt` writers.
    fn is_empty(&self) -> bool;

    /// Write the array's values, without the surrounding `[]` delimiters.
    fn encode_values(&self, enc: &mut Encoder);
}

/// Handwritten JSON encoder backed by a pooled scratch buffer.
///
/// Every value writer appends a trailing comma; the object and array
/// terminators truncate it, and [`Encoder::as_bytes`] strips the final one.
/// The encoder does no validity checking, so mismatched start/end calls
/// produce invalid output. Not for use from multiple threads at once.
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    /// Create an encoder with a default-sized scratch buffer.
    pub fn new() -> Self {
        Self {
            buf: scratch_pool().get(),
        }
    }

    /// Create an encoder whose scratch buffer holds at least `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: scratch_pool().get_with_capacity(capacity),
        }
    }

    /// The encoded output, with the top-level trailing comma stripped.
    pub fn as_bytes(&self) -> &[u8] {
        match self.buf.last() {
            Some(b',') => &self.buf[..self.buf.len() - 1],
            _ => &self.buf,
        }
    }

    /// Discard everything written so far, keeping the buffer.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write an object.
    pub fn object<O: ObjectEncode + ?Sized>(&mut self, o: &O) {
        self.start_object();
        o.encode_fields(self);
        self.end_object();
    }

    /// Write an object unless it is empty.
    pub fn object_opt<O: ObjectEncode + ?Sized>(&mut self, o: &O) {
        if o.is_empty() {
            return;
        }
        self.object(o);
    }

    /// Write a field key and an object.
    pub fn object_field<O: ObjectEncode + ?Sized>(&mut self, key: &str, o: &O) {
        self.key(key);
        self.object(o);
    }

    /// Write a field key and an object unless the object is empty.
    pub fn object_field_opt<O: ObjectEncode + ?Sized>(&mut self, key: &str, o: &O) {
        if o.is_empty() {
            return;
        }
        self.object_field(key, o);
    }

    /// Write an object start delimiter.
    pub fn start_object(&mut self) {
        self.buf.put_u8(b'{');
    }

    /// Write an object end delimiter, truncating a trailing field comma.
    pub fn end_object(&mut self) {
        self.trim_comma();
        self.buf.put_slice(b"},");
    }

    /// Write an array.
    pub fn array<A: ArrayEncode + ?Sized>(&mut self, a: &A) {
        self.start_array();
        a.encode_values(self);
        self.end_array();
    }

    /// Write an array unless it is empty.
    pub fn array_opt<A: ArrayEncode + ?Sized>(&mut self, a: &A) {
        if a.is_empty() {
            return;
        }
        self.array(a);
    }

    /// Write a field key and an array.
    pub fn array_field<A: ArrayEncode + ?Sized>(&mut self, key: &str, a: &A) {
        self.key(key);
        self.array(a);
    }

    /// Write a field key and an array unless the array is empty.
    pub fn array_field_opt<A: ArrayEncode + ?Sized>(&mut self, key: &str, a: &A) {
        if a.is_empty() {
            return;
        }
        self.array_field(key, a);
    }

    /// Write an array start delimiter.
    pub fn start_array(&mut self) {
        self.buf.put_u8(b'[');
    }

    /// Write an array end delimiter, truncating a trailing value comma.
    pub fn end_array(&mut self) {
        self.trim_comma();
        self.buf.put_slice(b"],");
    }

    /// Write a field key. The key itself is not escaped.
    pub fn key(&mut self, key: &str) {
        self.buf.put_u8(b'"');
        self.buf.put_slice(key.as_bytes());
        self.buf.put_slice(b"\":");
    }

    /// Write a field key and an escaped string.
    pub fn string_field(&mut self, key: &str, s: &str) {
        self.key(key);
        self.string(s);
    }

    /// Write a field key and an escaped string unless the string is empty.
    pub fn string_field_opt(&mut self, key: &str, s: &str) {
        if s.is_empty() {
            return;
        }
        self.string_field(key, s);
    }

    /// Write a field key and a string without escaping it.
    pub fn raw_string_field(&mut self, key: &str, s: &str) {
        self.key(key);
        self.raw_string(s);
    }

    /// Write a field key and a non-escaped string unless the string is empty.
    pub fn raw_string_field_opt(&mut self, key: &str, s: &str) {
        if s.is_empty() {
            return;
        }
        self.raw_string_field(key, s);
    }

    /// Write a field key and a boolean value.
    pub fn bool_field(&mut self, key: &str, v: bool) {
        self.key(key);
        self.bool(v);
    }

    /// Write a field key and a boolean value only when it is true.
    pub fn bool_field_opt(&mut self, key: &str, v: bool) {
        if !v {
            return;
        }
        self.bool_field(key, v);
    }

    /// Write a field key and a boolean value as 0 or 1.
    pub fn int_bool_field(&mut self, key: &str, v: bool) {
        self.key(key);
        self.int_bool(v);
    }

    /// Write a field key and a 0/1 boolean only when it is true.
    pub fn int_bool_field_opt(&mut self, key: &str, v: bool) {
        if !v {
            return;
        }
        self.int_bool_field(key, v);
    }

    /// Write a field key and a signed integer value.
    pub fn i64_field(&mut self, key: &str, v: i64) {
        self.key(key);
        self.i64(v);
    }

    /// Write a field key and a signed integer value unless it is zero.
    pub fn i64_field_opt(&mut self, key: &str, v: i64) {
        if v == 0 {
            return;
        }
        self.i64_field(key, v);
    }

    /// Write a field key and an unsigned integer value.
    pub fn u64_field(&mut self, key: &str, v: u64) {
        self.key(key);
        self.u64(v);
    }

    /// Write a field key and an unsigned integer value unless it is zero.
    pub fn u64_field_opt(&mut self, key: &str, v: u64) {
        if v == 0 {
            return;
        }
        self.u64_field(key, v);
    }

    /// Write a field key and a floating point value.
    pub fn f64_field(&mut self, key: &str, v: f64) {
        self.key(key);
        self.f64(v);
    }

    /// Write a field key and a floating point value unless it is zero.
    pub fn f64_field_opt(&mut self, key: &str, v: f64) {
        if v == 0.0 {
            return;
        }
        self.f64_field(key, v);
    }

    /// Write an escaped string value.
    pub fn string(&mut self, s: &str) {
        self.buf.put_u8(b'"');
        for &b in s.as_bytes() {
            match b {
                b'\\' | b'"' => {
                    self.buf.put_u8(b'\\');
                    self.buf.put_u8(b);
                }
                b'\n' => self.buf.put_slice(b"\\n"),
                b'\r' => self.buf.put_slice(b"\\r"),
                b'\t' => self.buf.put_slice(b"\\t"),
                _ => self.buf.put_u8(b),
            }
        }
        self.buf.put_slice(b"\",");
    }

    /// Write a string value without escaping. The caller guarantees the
    /// string contains no characters that need escaping.
    pub fn raw_string(&mut self, s: &str) {
        self.buf.put_u8(b'"');
        self.buf.put_slice(s.as_bytes());
        self.buf.put_slice(b"\",");
    }

    /// Write a boolean value.
    pub fn bool(&mut self, v: bool) {
        if v {
            self.buf.put_slice(b"true,");
        } else {
            self.buf.put_slice(b"false,");
        }
    }

    /// Write a boolean value as 0 or 1.
    pub fn int_bool(&mut self, v: bool) {
        if v {
            self.buf.put_slice(b"1,");
        } else {
            self.buf.put_slice(b"0,");
        }
    }

    /// Write a signed integer value.
    pub fn i64(&mut self, v: i64) {
        let mut itoa_buf = itoa::Buffer::new();
        self.buf.put_slice(itoa_buf.format(v).as_bytes());
        self.buf.put_u8(b',');
    }

    /// Write an unsigned integer value.
    pub fn u64(&mut self, v: u64) {
        let mut itoa_buf = itoa::Buffer::new();
        self.buf.put_slice(itoa_buf.format(v).as_bytes());
        self.buf.put_u8(b',');
    }

    /// Write a floating point value in shortest round-trippable form.
    ///
    /// The value must be finite: `NaN` and infinities render as bare
    /// `NaN`/`inf` tokens, which are not valid JSON.
    pub fn f64(&mut self, v: f64) {
        let mut ryu_buf = ryu::Buffer::new();
        self.buf.put_slice(ryu_buf.format(v).as_bytes());
        self.buf.put_u8(b',');
    }

    /// Append raw bytes as-is.
    pub fn raw(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    fn trim_comma(&mut self) {
        if self.buf.last() == Some(&b',') {
            self.buf.truncate(self.buf.len() - 1);
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Encoder {
    fn drop(&mut self) {
        scratch_pool().put(std::mem::take(&mut self.buf));
    }
}
