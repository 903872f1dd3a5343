//! Endian-aware value reconstruction.
//!
//! Pure functions that turn the raw bytes of one field into a typed [`Value`] and back. No
//! I/O happens here; callers hand in exactly the bytes a field occupies.
//!
//! # Key Components
//!
//! - [`crate::codec::Endian`] - Byte order, including the host's native order
//! - [`crate::codec::Value`] - A decoded value (signed, unsigned, float or bytes)
//! - [`crate::codec::decode`] / [`crate::codec::encode`] - Conversion for one field unit
//! - [`crate::codec::decode_pascal`] / [`crate::codec::decode_bcd`] - String and BCD forms
//! - [`crate::codec::io`] - Offset-tracking primitive access
//!
//! # Decoding Rules
//!
//! - 24-bit values take bit 23 as the sign and are sign-extended into 32 bits.
//! - 64-bit values are assembled from two 32-bit halves in the requested order. For the signed
//!   code, a high half with its top bit set yields the two's-complement value.
//! - Floats are bit reinterpretations, never numeric conversions.
//!
//! # Examples
//!
//! ```rust
//! use fontwalk::codec::{decode, Endian, Value};
//! use fontwalk::format::TypeCode;
//!
//! let value = decode(&[0xFF, 0xFF, 0xFE], TypeCode::Int24, Endian::Big)?;
//! assert_eq!(value, Value::Int(-2));
//! # Ok::<(), fontwalk::Error>(())
//! ```

pub mod io;

use crate::{format::TypeCode, Result};
use io::{read_at, read_i24_at, read_u24_at, write_at, write_u24_at};

/// Byte order of multi-byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    /// Most significant byte first (font files, network order)
    #[default]
    Big,
    /// Least significant byte first
    Little,
}

impl Endian {
    /// The byte order of the host this crate was compiled for.
    pub const NATIVE: Endian = if cfg!(target_endian = "big") {
        Endian::Big
    } else {
        Endian::Little
    };

    /// Returns the host's native byte order.
    pub fn native() -> Endian {
        Self::NATIVE
    }

    /// True for [`Endian::Big`].
    pub fn is_big(self) -> bool {
        self == Endian::Big
    }

    /// Maps a format endianness character to a byte order.
    ///
    /// `<` is little-endian, `>` and `!` are big-endian, `@` and `=` select the native order.
    pub fn from_code(c: char) -> Option<Endian> {
        match c {
            '<' => Some(Endian::Little),
            '>' | '!' => Some(Endian::Big),
            '@' | '=' => Some(Endian::NATIVE),
            _ => None,
        }
    }

    /// The explicit format character selecting this byte order.
    pub fn as_code(self) -> char {
        match self {
            Endian::Big => '>',
            Endian::Little => '<',
        }
    }
}

/// A single decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Result of a signed integer code
    Int(i64),
    /// Result of an unsigned integer code
    UInt(u64),
    /// Result of a floating point code
    Float(f64),
    /// Result of `c`, `s` and `p`
    Bytes(Vec<u8>),
}

impl Value {
    /// Integer value as `i64`, if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Integer value as `u64`, if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(v) => u64::try_from(*v).ok(),
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Float value, or an integer widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            Value::Bytes(_) => None,
        }
    }

    /// Byte content of a string value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Int(v) => Some(i128::from(*v)),
            Value::UInt(v) => Some(i128::from(*v)),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($variant:ident: $($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from!(UInt: u8, u16, u32, u64);
value_from!(Int: i8, i16, i32, i64);
value_from!(Float: f32, f64);

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Bytes(v.as_bytes().to_vec())
    }
}

/// Decodes one unit of a numeric or `c` code from `raw`.
///
/// `raw` must hold exactly [`TypeCode::unit_size`] bytes. String codes take their whole field;
/// use [`decode_pascal`] for `p` and the raw bytes for `s`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for a length mismatch or for `x`, `p` and `s`.
pub fn decode(raw: &[u8], code: TypeCode, endian: Endian) -> Result<Value> {
    if raw.len() != code.unit_size() {
        return Err(malformed_error!(
            "'{}' needs {} bytes, got {}",
            code.as_char(),
            code.unit_size(),
            raw.len()
        ));
    }

    let mut offset = 0;
    Ok(match code {
        TypeCode::UInt8 => Value::UInt(u64::from(raw[0])),
        TypeCode::Int8 => Value::Int(i64::from(raw[0] as i8)),
        TypeCode::Char => Value::Bytes(vec![raw[0]]),
        TypeCode::UInt16 => Value::UInt(read_at::<u16>(raw, &mut offset, endian)?.into()),
        TypeCode::Int16 => Value::Int(read_at::<i16>(raw, &mut offset, endian)?.into()),
        TypeCode::UInt24 => Value::UInt(read_u24_at(raw, &mut offset, endian)?.into()),
        TypeCode::Int24 => Value::Int(read_i24_at(raw, &mut offset, endian)?.into()),
        TypeCode::UInt32 => Value::UInt(read_at::<u32>(raw, &mut offset, endian)?.into()),
        TypeCode::Int32 => Value::Int(read_at::<i32>(raw, &mut offset, endian)?.into()),
        TypeCode::Float32 => Value::Float(read_at::<f32>(raw, &mut offset, endian)?.into()),
        TypeCode::Float64 => Value::Float(read_at::<f64>(raw, &mut offset, endian)?),
        TypeCode::UInt64 | TypeCode::Int64 => {
            let (high, low) = split_halves(raw, endian)?;
            let combined = (u64::from(high) << 32) | u64::from(low);
            if code == TypeCode::Int64 {
                // Reinterpreting is the subtraction of 2^64 when the high bit is set.
                Value::Int(combined as i64)
            } else {
                Value::UInt(combined)
            }
        }
        TypeCode::Pascal | TypeCode::Bytes | TypeCode::Pad => {
            return Err(malformed_error!(
                "'{}' is not a single-unit value code",
                code.as_char()
            ))
        }
    })
}

fn split_halves(raw: &[u8], endian: Endian) -> Result<(u32, u32)> {
    let mut offset = 0;
    let first: u32 = read_at(raw, &mut offset, endian)?;
    let second: u32 = read_at(raw, &mut offset, endian)?;
    Ok(match endian {
        Endian::Big => (first, second),
        Endian::Little => (second, first),
    })
}

/// Decodes a Pascal string field.
///
/// The first byte is the declared length; the data follows. A declared length longer than the
/// `field.len() - 1` bytes available is truncated to what fits.
pub fn decode_pascal(field: &[u8]) -> Vec<u8> {
    match field.split_first() {
        Some((&len, data)) => data[..usize::from(len).min(data.len())].to_vec(),
        None => Vec::new(),
    }
}

/// Decodes the first `nybbles` packed BCD digits of `raw`, high nybble first.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if a nybble is not a decimal digit, if `raw` holds fewer
/// than `nybbles` nybbles, or if the value does not fit in 64 bits.
pub fn decode_bcd(raw: &[u8], nybbles: usize) -> Result<u64> {
    if nybbles > raw.len() * 2 {
        return Err(malformed_error!(
            "{} nybbles requested from {} bytes",
            nybbles,
            raw.len()
        ));
    }

    let mut value = 0u64;
    for index in 0..nybbles {
        let byte = raw[index / 2];
        let digit = if index % 2 == 0 { byte >> 4 } else { byte & 0x0F };
        if digit > 9 {
            return Err(malformed_error!("Nybble {:#x} is not a BCD digit", digit));
        }

        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(digit)))
            .ok_or_else(|| malformed_error!("BCD value of {} digits overflows", nybbles))?;
    }
    Ok(value)
}

/// Appends one unit of a numeric or `c` code to `out`.
///
/// Integer codes check that the value lies in the code's range. Float codes accept any number.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the value is of the wrong kind or out of range, or
/// if `code` is a string or padding code.
pub fn encode(value: &Value, code: TypeCode, endian: Endian, out: &mut Vec<u8>) -> Result<()> {
    let mut buffer = [0u8; 8];
    let slot = &mut buffer[..code.unit_size()];
    let mut offset = 0;

    match code {
        TypeCode::Char => match value.as_bytes() {
            Some([byte]) => slot[0] = *byte,
            _ => return Err(malformed_error!("'c' needs a single byte")),
        },
        TypeCode::Float32 => write_at(slot, &mut offset, float_of(value, code)? as f32, endian)?,
        TypeCode::Float64 => write_at(slot, &mut offset, float_of(value, code)?, endian)?,
        TypeCode::UInt8 => slot[0] = ranged(value, code, 0, u8::MAX.into())? as u8,
        TypeCode::Int8 => slot[0] = ranged(value, code, i8::MIN.into(), i8::MAX.into())? as u8,
        TypeCode::UInt16 => {
            let v = ranged(value, code, 0, u16::MAX.into())? as u16;
            write_at(slot, &mut offset, v, endian)?;
        }
        TypeCode::Int16 => {
            let v = ranged(value, code, i16::MIN.into(), i16::MAX.into())? as i16;
            write_at(slot, &mut offset, v, endian)?;
        }
        TypeCode::UInt24 => {
            let v = ranged(value, code, 0, (1 << 24) - 1)? as u32;
            write_u24_at(slot, &mut offset, v, endian)?;
        }
        TypeCode::Int24 => {
            let v = ranged(value, code, -(1 << 23), (1 << 23) - 1)? as i32;
            write_u24_at(slot, &mut offset, v as u32, endian)?;
        }
        TypeCode::UInt32 => {
            let v = ranged(value, code, 0, u32::MAX.into())? as u32;
            write_at(slot, &mut offset, v, endian)?;
        }
        TypeCode::Int32 => {
            let v = ranged(value, code, i32::MIN.into(), i32::MAX.into())? as i32;
            write_at(slot, &mut offset, v, endian)?;
        }
        TypeCode::UInt64 => {
            let v = ranged(value, code, 0, u64::MAX.into())? as u64;
            write_at(slot, &mut offset, v, endian)?;
        }
        TypeCode::Int64 => {
            let v = ranged(value, code, i64::MIN.into(), i64::MAX.into())? as i64;
            write_at(slot, &mut offset, v, endian)?;
        }
        TypeCode::Pascal | TypeCode::Bytes | TypeCode::Pad => {
            return Err(malformed_error!(
                "'{}' is not a single-unit value code",
                code.as_char()
            ));
        }
    }

    out.extend_from_slice(slot);
    Ok(())
}

fn ranged(value: &Value, code: TypeCode, min: i128, max: i128) -> Result<i128> {
    let Some(v) = value.as_i128() else {
        return Err(malformed_error!(
            "'{}' needs an integer, got {:?}",
            code.as_char(),
            value
        ));
    };
    if v < min || v > max {
        return Err(malformed_error!(
            "{} is out of range for '{}'",
            v,
            code.as_char()
        ));
    }
    Ok(v)
}

fn float_of(value: &Value, code: TypeCode) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| malformed_error!("'{}' needs a number, got {:?}", code.as_char(), value))
}
