//! The struct-style format mini-language.
//!
//! A format string is a run of tokens, each an optional decimal repeat count followed by one
//! code character. Value codes consume bytes; the endianness codes `<`, `>`, `!`, `@` and `=`
//! are zero-width and switch the byte order for every token after them.
//!
//! # Key Components
//!
//! - [`crate::format::Format`] - A compiled format: its fields, byte size and item count
//! - [`crate::format::Field`] - One token with its resolved byte order
//! - [`crate::format::TypeCode`] - The closed set of value codes
//! - [`crate::format::calcsize`] - Byte size of a format string, without any I/O
//! - [`crate::format::pack`] - The inverse of decoding
//!
//! # Sizes and Items
//!
//! | Codes | Bytes per unit | Items |
//! |-------|----------------|-------|
//! | `B b c` | 1 | count |
//! | `p s` | 1 | 1 |
//! | `x` | 1 | 0 |
//! | `H h` | 2 | count |
//! | `T t` | 3 | count |
//! | `I i L l f` | 4 | count |
//! | `Q q d` | 8 | count |
//!
//! Characters outside the grammar are skipped together with any repeat count in front of them,
//! unless the parser is told to reject them (see [`crate::UnknownCodes`]).
//!
//! # Examples
//!
//! ```rust
//! use fontwalk::format::Format;
//!
//! let format = Format::parse("2H3x1s")?;
//! assert_eq!(format.byte_size(), 8);
//! assert_eq!(format.item_count(), 3);
//! # Ok::<(), fontwalk::Error>(())
//! ```

mod code;

pub use code::TypeCode;

use crate::{
    codec::{decode, decode_pascal, encode, Endian, Value},
    config::UnknownCodes,
    Result,
};

/// One token of a compiled format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Repeat count (1 when omitted)
    pub count: usize,
    /// The value code
    pub code: TypeCode,
    /// Byte order in effect at this token
    pub endian: Endian,
}

impl Field {
    /// Bytes this field occupies.
    pub fn byte_size(&self) -> usize {
        self.count * self.code.unit_size()
    }

    /// Logical items this field produces.
    pub fn item_count(&self) -> usize {
        self.code.items(self.count)
    }
}

/// A compiled format string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    fields: Vec<Field>,
    byte_size: usize,
    item_count: usize,
}

impl Format {
    /// Compiles `format` with big-endian as the starting byte order, skipping unknown codes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the byte size overflows.
    pub fn parse(format: &str) -> Result<Format> {
        Self::parse_with(format, Endian::Big, UnknownCodes::Ignore)
    }

    /// Compiles `format` starting in byte order `endian`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the byte size overflows or if `unknown` is
    /// [`UnknownCodes::Reject`] and the string contains a character outside the grammar.
    pub fn parse_with(format: &str, endian: Endian, unknown: UnknownCodes) -> Result<Format> {
        let mut fields = Vec::new();
        let mut byte_size = 0usize;
        let mut item_count = 0usize;
        let mut active = endian;
        let mut repeat: Option<usize> = None;

        for c in format.chars() {
            if let Some(digit) = c.to_digit(10) {
                let next = repeat
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|r| r.checked_add(digit as usize))
                    .ok_or_else(|| malformed_error!("Repeat count overflows in {:?}", format))?;
                repeat = Some(next);
                continue;
            }

            let count = repeat.take().unwrap_or(1);

            if let Some(order) = Endian::from_code(c) {
                active = order;
                continue;
            }

            let Some(code) = TypeCode::from_char(c) else {
                if unknown == UnknownCodes::Reject {
                    return Err(malformed_error!("Unknown format code {:?} in {:?}", c, format));
                }
                log::debug!("skipping unknown format code {:?}", c);
                continue;
            };

            let field = Field {
                count,
                code,
                endian: active,
            };
            byte_size = count
                .checked_mul(code.unit_size())
                .and_then(|size| size.checked_add(byte_size))
                .ok_or_else(|| malformed_error!("Byte size overflows in {:?}", format))?;
            item_count += field.item_count();
            fields.push(field);
        }

        if byte_size.checked_mul(8).is_none() {
            return Err(malformed_error!("Bit size overflows in {:?}", format));
        }

        Ok(Format {
            fields,
            byte_size,
            item_count,
        })
    }

    /// The compiled fields, endianness tokens excluded.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Total bytes one repetition occupies.
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    /// Total bits one repetition occupies. Parsing guarantees this fits in a `usize`.
    pub fn bit_size(&self) -> usize {
        self.byte_size * 8
    }

    /// Number of values one repetition produces.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// True if the format occupies no bytes.
    pub fn is_empty(&self) -> bool {
        self.byte_size == 0
    }

    /// Decodes one repetition from `raw`, which must be exactly [`Format::byte_size`] long.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `raw` has the wrong length.
    pub fn decode(&self, raw: &[u8]) -> Result<Vec<Value>> {
        if raw.len() != self.byte_size {
            return Err(malformed_error!(
                "Format needs {} bytes, got {}",
                self.byte_size,
                raw.len()
            ));
        }

        let mut values = Vec::with_capacity(self.item_count);
        let mut offset = 0;
        for field in &self.fields {
            let bytes = &raw[offset..offset + field.byte_size()];
            match field.code {
                TypeCode::Pad => {}
                TypeCode::Bytes => values.push(Value::Bytes(bytes.to_vec())),
                TypeCode::Pascal => values.push(Value::Bytes(decode_pascal(bytes))),
                code => {
                    for unit in bytes.chunks_exact(code.unit_size()) {
                        values.push(decode(unit, code, field.endian)?);
                    }
                }
            }
            offset += field.byte_size();
        }
        Ok(values)
    }

    /// Encodes `values` into one repetition of this format.
    ///
    /// `s` fields are truncated or zero-padded to their count. `p` fields store at most
    /// `count - 1` data bytes and a length byte of at most 255. `x` fields are zero-filled.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the number of values differs from
    /// [`Format::item_count`] or a value does not fit its code.
    pub fn encode(&self, values: &[Value]) -> Result<Vec<u8>> {
        if values.len() != self.item_count {
            return Err(malformed_error!(
                "Format takes {} values, got {}",
                self.item_count,
                values.len()
            ));
        }

        let mut out = Vec::with_capacity(self.byte_size);
        let mut values = values.iter();
        for field in &self.fields {
            match field.code {
                TypeCode::Pad => out.resize(out.len() + field.count, 0),
                TypeCode::Bytes | TypeCode::Pascal => {
                    let Some(data) = values.next().and_then(Value::as_bytes) else {
                        return Err(malformed_error!(
                            "'{}' needs a byte string",
                            field.code.as_char()
                        ));
                    };
                    let start = out.len();
                    if field.code == TypeCode::Pascal && field.count > 0 {
                        let len = data.len().min(field.count - 1).min(255);
                        out.push(len as u8);
                        out.extend_from_slice(&data[..len]);
                    } else if field.code == TypeCode::Bytes {
                        out.extend_from_slice(&data[..data.len().min(field.count)]);
                    }
                    out.resize(start + field.count, 0);
                }
                code => {
                    for value in values.by_ref().take(field.count) {
                        encode(value, code, field.endian, &mut out)?;
                    }
                }
            }
        }
        Ok(out)
    }
}

impl std::str::FromStr for Format {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Format> {
        Format::parse(s)
    }
}

/// Byte size of `format` without decoding anything.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the byte size overflows.
pub fn calcsize(format: &str) -> Result<usize> {
    Format::parse(format).map(|f| f.byte_size())
}

/// Encodes `values` according to `format`, starting big-endian.
///
/// # Errors
/// See [`Format::encode`].
///
/// # Examples
///
/// ```rust
/// use fontwalk::{format::pack, Value};
///
/// let bytes = pack("<H3p2x", &[Value::from(1u16), Value::from("ab")])?;
/// assert_eq!(bytes, [0x01, 0x00, 0x02, b'a', b'b', 0, 0]);
/// # Ok::<(), fontwalk::Error>(())
/// ```
pub fn pack(format: &str, values: &[Value]) -> Result<Vec<u8>> {
    Format::parse(format)?.encode(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn sizes_and_items() {
        let format = Format::parse("2H3x1s").unwrap();
        assert_eq!(format.byte_size(), 8);
        assert_eq!(format.item_count(), 3);
        assert_eq!(format.fields().len(), 3);

        assert_eq!(calcsize("").unwrap(), 0);
        assert_eq!(Format::parse("").unwrap().item_count(), 0);
        assert!(Format::parse("").unwrap().is_empty());

        let format = Format::parse("12p4c").unwrap();
        assert_eq!(format.byte_size(), 16);
        assert_eq!(format.item_count(), 5);

        assert_eq!(calcsize("TtQqdf").unwrap(), 3 + 3 + 8 + 8 + 8 + 4);
        assert_eq!(calcsize("0H").unwrap(), 0);
    }

    #[test]
    fn endian_tokens_are_zero_width() {
        let format = Format::parse(">H<H!H").unwrap();
        assert_eq!(format.byte_size(), 6);
        assert_eq!(format.item_count(), 3);
        let orders: Vec<_> = format.fields().iter().map(|f| f.endian).collect();
        assert_eq!(orders, [Endian::Big, Endian::Little, Endian::Big]);

        let format = Format::parse_with("H", Endian::Little, UnknownCodes::Ignore).unwrap();
        assert_eq!(format.fields()[0].endian, Endian::Little);

        // A repeat count in front of an endian code is consumed and dropped.
        let format = Format::parse("3<H").unwrap();
        assert_eq!(format.byte_size(), 2);
    }

    #[test]
    fn unknown_codes() {
        let format = Format::parse("H 4P?B").unwrap();
        assert_eq!(format.byte_size(), 3);
        assert_eq!(format.item_count(), 2);

        assert!(matches!(
            Format::parse_with("HP", Endian::Big, UnknownCodes::Reject),
            Err(Error::Malformed { .. })
        ));
        assert!(Format::parse_with("2H3x1s", Endian::Big, UnknownCodes::Reject).is_ok());
    }

    #[test]
    fn overflow_is_malformed() {
        assert!(matches!(
            Format::parse("99999999999999999999999H"),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            calcsize(&format!("{}Q", usize::MAX / 4)),
            Err(Error::Malformed { .. })
        ));

        // The byte size fits but the bit size does not.
        let bytes = usize::MAX / 4;
        assert!(matches!(
            Format::parse(&format!("{bytes}B")),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            Format::parse(&format!("{}B4x", usize::MAX / 8 - 3)),
            Err(Error::Malformed { .. })
        ));
        let largest = Format::parse(&format!("{}B", usize::MAX / 8)).unwrap();
        assert_eq!(largest.bit_size(), usize::MAX / 8 * 8);
    }

    #[test]
    fn decode_mixed() {
        let format: Format = "Hh2x3s2cp".parse().unwrap();
        let raw = [
            0x00, 0x2A, 0xFF, 0xFE, 0xAA, 0xBB, b'a', b'b', b'c', b'X', b'Y', 0x00,
        ];
        let values = format.decode(&raw).unwrap();
        assert_eq!(
            values,
            vec![
                Value::UInt(42),
                Value::Int(-2),
                Value::Bytes(b"abc".to_vec()),
                Value::Bytes(b"X".to_vec()),
                Value::Bytes(b"Y".to_vec()),
                Value::Bytes(Vec::new()),
            ]
        );
        assert!(format.decode(&raw[..11]).is_err());
    }

    #[test]
    fn pack_strings() {
        assert_eq!(pack("4s", &["ab".into()]).unwrap(), b"ab\0\0");
        assert_eq!(pack("2s", &["abcd".into()]).unwrap(), b"ab");
        assert_eq!(pack("4p", &["abcdef".into()]).unwrap(), [3, b'a', b'b', b'c']);
        assert_eq!(pack("0p", &["ab".into()]).unwrap(), Vec::<u8>::new());

        let long = vec![b'z'; 300];
        let packed = pack("300p", &[Value::Bytes(long)]).unwrap();
        assert_eq!(packed.len(), 300);
        assert_eq!(packed[0], 255);
        assert_eq!(packed[255], b'z');
        assert_eq!(packed[256], 0);
    }

    #[test]
    fn pack_numbers() {
        let packed = pack(
            "BbHhTtIiQq",
            &[
                255u8.into(),
                (-1i8).into(),
                0x1234u16.into(),
                (-2i16).into(),
                0xABCDEFu32.into(),
                (-1i32).into(),
                1u32.into(),
                (-1i32).into(),
                u64::MAX.into(),
                (-1i64).into(),
            ],
        )
        .unwrap();
        assert_eq!(packed.len(), calcsize("BbHhTtIiQq").unwrap());
        let back = Format::parse("BbHhTtIiQq").unwrap().decode(&packed).unwrap();
        assert_eq!(back[2], Value::UInt(0x1234));
        assert_eq!(back[5], Value::Int(-1));
        assert_eq!(back[9], Value::Int(-1));

        assert_eq!(pack("<H", &[1u16.into()]).unwrap(), [1, 0]);
        assert_eq!(pack("x2c", &["a".into(), "b".into()]).unwrap(), [0, b'a', b'b']);
    }

    #[test]
    fn pack_argument_mismatch() {
        assert!(matches!(
            pack("2H", &[1u16.into()]),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            pack("H", &[1u16.into(), 2u16.into()]),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(pack("s", &[1u8.into()]), Err(Error::Malformed { .. })));
        assert!(matches!(pack("B", &[256u16.into()]), Err(Error::Malformed { .. })));
    }
}
