use crate::{
    codec::{
        decode_bcd,
        io::{read_at, read_i24_at, read_u24_at, Primitive},
        Value,
    },
    file::extract_bits,
    format::Format,
    walker::{Anchor, Unpacked, Walker},
    Error, Result,
};

impl Walker {
    /// Compiles `format` with this cursor's byte order and unknown-code policy.
    ///
    /// # Errors
    /// See [`Format::parse_with`].
    pub fn compile(&self, format: &str) -> Result<Format> {
        Format::parse_with(format, self.config.endian, self.config.unknown_codes)
    }

    /// Decodes one repetition of `format` at the current position.
    ///
    /// With `coerce` a single resulting value is returned bare. Without `advance` the position
    /// is left where it was (peek).
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the format extends past the limit, leaving the
    /// position unchanged, or [`crate::Error::Malformed`] if the format cannot be compiled.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fontwalk::{Unpacked, Value, Walker};
    ///
    /// let mut walker = Walker::from_bytes(vec![0x00, 0x01, 0xFF, 0xFE]);
    /// assert_eq!(walker.read("H", true, false)?, Unpacked::Value(Value::UInt(1)));
    /// assert_eq!(walker.bit_offset(false), 0);
    /// assert_eq!(
    ///     walker.read("Hh", true, true)?,
    ///     Unpacked::Tuple(vec![Value::UInt(1), Value::Int(-2)])
    /// );
    /// # Ok::<(), fontwalk::Error>(())
    /// ```
    pub fn read(&mut self, format: &str, coerce: bool, advance: bool) -> Result<Unpacked> {
        let format = self.compile(format)?;
        self.read_format(&format, coerce, advance)
    }

    /// Decodes one repetition of a compiled format. See [`Walker::read`].
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the format extends past the limit.
    pub fn read_format(&mut self, format: &Format, coerce: bool, advance: bool) -> Result<Unpacked> {
        let values = self.decode_next(format, advance)?;
        Ok(Unpacked::from_values(values, coerce))
    }

    /// Decodes `count` consecutive repetitions of `format`.
    ///
    /// Each repetition is a tuple, or a bare value when the format yields exactly one item. With
    /// `coerce_final` and a count of one, the single repetition is returned on its own instead
    /// of wrapped in [`Unpacked::Groups`].
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the repetitions extend past the limit; this is
    /// checked before anything is read.
    pub fn read_group(&mut self, format: &str, count: usize, coerce_final: bool) -> Result<Unpacked> {
        let format = self.compile(format)?;
        let total = format.bit_size().checked_mul(count);
        self.check_available(total.unwrap_or(usize::MAX))?;

        let mut groups = Vec::with_capacity(count);
        for _ in 0..count {
            let values = self.decode_next(&format, true)?;
            groups.push(Unpacked::from_values(values, true));
        }

        if count == 1 && coerce_final {
            if let Some(only) = groups.pop() {
                return Ok(only);
            }
        }
        Ok(Unpacked::Groups(groups))
    }

    /// Repeats `format` over everything left before the limit.
    ///
    /// With `strict` the remaining bits must be a whole number of repetitions. Otherwise the
    /// trailing partial repetition is left unread.
    ///
    /// # Errors
    /// Returns [`crate::Error::LeftoverBits`] under `strict` when the remainder does not divide
    /// evenly, and [`crate::Error::Malformed`] if the format occupies no bits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fontwalk::{Value, Walker};
    ///
    /// let mut walker = Walker::from_bytes((0u8..10).collect::<Vec<_>>());
    /// walker.skip(2);
    /// let rest = walker.read_rest("BB", true, true)?;
    /// assert_eq!(rest.len(), 4);
    /// assert_eq!(rest.into_values().pop(), Some(Value::UInt(9)));
    /// # Ok::<(), fontwalk::Error>(())
    /// ```
    pub fn read_rest(&mut self, format: &str, coerce: bool, strict: bool) -> Result<Unpacked> {
        let format = self.compile(format)?;
        let group = format.bit_size();
        if group == 0 {
            return Err(malformed_error!("Cannot repeat a format that occupies no bits"));
        }

        let remaining = self.bit_length();
        if strict && remaining % group != 0 {
            return Err(Error::LeftoverBits { remaining, group });
        }

        let count = remaining / group;
        let mut groups = Vec::with_capacity(count);
        for _ in 0..count {
            let values = self.decode_next(&format, true)?;
            groups.push(Unpacked::from_values(values, coerce));
        }
        Ok(Unpacked::Groups(groups))
    }

    /// Lazily decodes up to `count` repetitions of a compiled format.
    ///
    /// The iterator stops after the first error.
    pub fn group_iter<'a>(&'a mut self, format: &'a Format, count: usize) -> GroupIter<'a> {
        GroupIter {
            walker: self,
            format,
            remaining: count,
        }
    }

    /// Reads `bit_count` bits, left-justified into `ceil(bit_count / 8)` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the bits extend past the limit.
    pub fn read_bits(&mut self, bit_count: usize) -> Result<Vec<u8>> {
        let bits = self.peek_at(self.current, bit_count)?;
        self.current += bit_count;
        Ok(bits)
    }

    /// Like [`Walker::read_bits`] without moving.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the bits extend past the limit.
    pub fn peek_bits(&mut self, bit_count: usize) -> Result<Vec<u8>> {
        let bits = self.peek_at(self.current, bit_count)?;
        self.resource.invalidate(&mut self.client);
        Ok(bits)
    }

    /// Reads `count` unsigned or two's-complement integers of `bits_per_item` bits each.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] unless `bits_per_item` is 1 to 64, and
    /// [`crate::Error::OutOfBounds`] if the items extend past the limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fontwalk::{Value, Walker};
    ///
    /// let mut walker = Walker::from_bytes(vec![0xF5]);
    /// let values = walker.read_bits_group(2, 4, true)?;
    /// assert_eq!(values, [Value::Int(-1), Value::Int(-1), Value::Int(1), Value::Int(1)]);
    /// # Ok::<(), fontwalk::Error>(())
    /// ```
    pub fn read_bits_group(
        &mut self,
        bits_per_item: u32,
        count: usize,
        signed: bool,
    ) -> Result<Vec<Value>> {
        if !(1..=64).contains(&bits_per_item) {
            return Err(malformed_error!(
                "Items must be 1 to 64 bits wide, got {}",
                bits_per_item
            ));
        }

        let width = bits_per_item as usize;
        let total = width
            .checked_mul(count)
            .ok_or_else(|| out_of_bounds_error!(self.current, usize::MAX, self.limit))?;
        let raw = self.read_bits(total)?;

        let mut values = Vec::with_capacity(count);
        let mut bit = 0;
        for _ in 0..count {
            let mut value = 0u64;
            for _ in 0..width {
                let set = (raw[bit / 8] >> (7 - bit % 8)) & 1;
                value = (value << 1) | u64::from(set);
                bit += 1;
            }

            values.push(if !signed {
                Value::UInt(value)
            } else if width < 64 && (value >> (width - 1)) & 1 == 1 {
                Value::Int((i128::from(value) - (1i128 << width)) as i64)
            } else {
                Value::Int(value as i64)
            });
        }
        Ok(values)
    }

    /// Reads `count` packed BCD numbers of `nybbles` digits each.
    ///
    /// With `coerce` and a count of one the number is returned bare.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the digits extend past the limit and
    /// [`crate::Error::Malformed`] if a nybble is not a decimal digit. The position is unchanged
    /// on error.
    pub fn read_bcd(&mut self, count: usize, nybbles: usize, coerce: bool) -> Result<Unpacked> {
        let item_bits = nybbles.saturating_mul(4);
        let total = item_bits.checked_mul(count).unwrap_or(usize::MAX);
        let raw = self.peek_at(self.current, total)?;

        let mut values = Vec::with_capacity(count);
        for index in 0..count {
            let start = index * item_bits;
            let digits = extract_bits(&raw[start / 8..], (start % 8) as u8, item_bits)
                .and_then(|bytes| decode_bcd(&bytes, nybbles));
            match digits {
                Ok(value) => values.push(Value::UInt(value)),
                Err(error) => {
                    self.resource.invalidate(&mut self.client);
                    return Err(error);
                }
            }
        }

        self.current += total;
        Ok(Unpacked::from_values(values, coerce && count == 1))
    }

    /// Reads a length byte followed by that many data bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the length byte or the data extend past the
    /// limit. The position is unchanged on error.
    pub fn pascal_string(&mut self) -> Result<Vec<u8>> {
        let length = self.peek_at(self.current, 8)?[0];
        let total = 8 + usize::from(length) * 8;
        let raw = match self.peek_at(self.current, total) {
            Ok(raw) => raw,
            Err(error) => {
                self.resource.invalidate(&mut self.client);
                return Err(error);
            }
        };

        self.current += total;
        Ok(raw[1..].to_vec())
    }

    /// Reads `len` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the bytes extend past the limit.
    pub fn chunk(&mut self, len: usize) -> Result<Vec<u8>> {
        self.read_bits(len.checked_mul(8).unwrap_or(usize::MAX))
    }

    /// Reads everything up to the limit.
    ///
    /// If the cursor is mid-byte the final byte is zero-padded.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if a file backend fails to read.
    pub fn rest(&mut self) -> Result<Vec<u8>> {
        self.read_bits(self.bit_length())
    }

    /// Returns up to `len` bytes at a byte offset from `anchor`, without moving.
    ///
    /// [`Anchor::Current`] measures from the start of the current byte. The result is cut short
    /// at the limit.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOffset`] if the start is negative or past the limit.
    pub fn piece(&mut self, len: usize, offset: isize, anchor: Anchor) -> Result<Vec<u8>> {
        let base = self.byte_anchor_base(anchor);
        let start = base as i128 + offset as i128 * 8;
        if start < 0 || start > self.limit as i128 {
            return Err(Error::InvalidOffset {
                target: start,
                limit: self.limit,
            });
        }

        let start = start as usize;
        let len = len.min((self.limit - start) / 8);
        let bits = self.peek_at(start, len * 8)?;
        self.resource.invalidate(&mut self.client);
        Ok(bits)
    }

    /// Returns `bit_count` bits at a bit offset from `anchor`, without moving.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the bits extend past the limit or start before
    /// the beginning of the resource.
    pub fn bit_piece(&mut self, bit_count: usize, offset: isize, anchor: Anchor) -> Result<Vec<u8>> {
        let start = self.anchor_base(anchor) as i128 + offset as i128;
        if start < 0 || start > self.limit as i128 {
            let offset = start.clamp(0, self.limit as i128) as usize;
            return Err(out_of_bounds_error!(offset, bit_count, self.limit));
        }

        let bits = self.peek_at(start as usize, bit_count)?;
        self.resource.invalidate(&mut self.client);
        Ok(bits)
    }

    /// Returns everything from `offset` bytes past the origin to the end of the whole resource.
    ///
    /// This deliberately ignores the cursor's limit: a branch limited to one table can still see
    /// the bytes that follow it. Use [`Walker::rest`] to stay inside the window. The position
    /// does not move.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the start is at or past the end of the resource.
    pub fn absolute_remainder(&mut self, offset: usize) -> Result<Vec<u8>> {
        let size = self.resource.bit_len();
        let start = offset
            .checked_mul(8)
            .and_then(|bits| bits.checked_add(self.origin))
            .filter(|start| *start < size)
            .ok_or_else(|| out_of_bounds_error!(self.origin, offset.saturating_mul(8), size))?;

        let bits = self.resource.read_bits(&mut self.client, start, size - start)?;
        self.resource.invalidate(&mut self.client);
        Ok(bits)
    }

    /// Reads an unsigned byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the limit.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_primitive()
    }

    /// Reads a signed byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the limit.
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_primitive()
    }

    /// Reads an unsigned 16-bit value in the cursor's byte order.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the limit.
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_primitive()
    }

    /// Reads a signed 16-bit value in the cursor's byte order.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the limit.
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_primitive()
    }

    /// Reads an unsigned 24-bit value in the cursor's byte order.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the limit.
    pub fn read_u24(&mut self) -> Result<u32> {
        let raw = self.read_bits(24)?;
        read_u24_at(&raw, &mut 0, self.config.endian)
    }

    /// Reads a signed 24-bit value in the cursor's byte order.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the limit.
    pub fn read_i24(&mut self) -> Result<i32> {
        let raw = self.read_bits(24)?;
        read_i24_at(&raw, &mut 0, self.config.endian)
    }

    /// Reads an unsigned 32-bit value in the cursor's byte order.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the limit.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_primitive()
    }

    /// Reads a signed 32-bit value in the cursor's byte order.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the limit.
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_primitive()
    }

    /// Reads an unsigned 64-bit value in the cursor's byte order.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the limit.
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_primitive()
    }

    /// Reads a signed 64-bit value in the cursor's byte order.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the limit.
    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_primitive()
    }

    /// Reads an IEEE-754 single in the cursor's byte order.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the limit.
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_primitive()
    }

    /// Reads an IEEE-754 double in the cursor's byte order.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the limit.
    pub fn read_f64(&mut self) -> Result<f64> {
        self.read_primitive()
    }

    fn read_primitive<T: Primitive>(&mut self) -> Result<T> {
        let raw = self.read_bits(std::mem::size_of::<T>() * 8)?;
        read_at(&raw, &mut 0, self.config.endian)
    }

    fn check_available(&self, bit_count: usize) -> Result<()> {
        match self.current.checked_add(bit_count) {
            Some(end) if end <= self.limit => Ok(()),
            _ => Err(out_of_bounds_error!(self.current, bit_count, self.limit)),
        }
    }

    /// Extracts bits at an absolute position inside the window without moving.
    fn peek_at(&mut self, start: usize, bit_count: usize) -> Result<Vec<u8>> {
        match start.checked_add(bit_count) {
            Some(end) if end <= self.limit => {}
            _ => return Err(out_of_bounds_error!(start, bit_count, self.limit)),
        }
        self.resource.read_bits(&mut self.client, start, bit_count)
    }

    /// Decodes one repetition at the current position, advancing only on success.
    fn decode_next(&mut self, format: &Format, advance: bool) -> Result<Vec<Value>> {
        let bit_count = format.bit_size();
        let raw = self.peek_at(self.current, bit_count)?;

        match format.decode(&raw) {
            Ok(values) if advance => {
                self.current += bit_count;
                Ok(values)
            }
            result => {
                self.resource.invalidate(&mut self.client);
                result
            }
        }
    }
}

/// Iterator returned by [`Walker::group_iter`].
pub struct GroupIter<'a> {
    walker: &'a mut Walker,
    format: &'a Format,
    remaining: usize,
}

impl Iterator for GroupIter<'_> {
    type Item = Result<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let result = self.walker.decode_next(self.format, true);
        self.remaining = if result.is_ok() { self.remaining - 1 } else { 0 };
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::WalkerConfig, Error, ErrorKind};

    #[test]
    fn read_and_peek() {
        let mut walker = Walker::from_bytes(vec![0x00, 0x01, 0x00, 0x02]);
        assert_eq!(
            walker.read("H", true, false).unwrap(),
            Unpacked::Value(Value::UInt(1))
        );
        assert_eq!(walker.bit_offset(false), 0);
        assert_eq!(
            walker.read("H", false, true).unwrap(),
            Unpacked::Tuple(vec![Value::UInt(1)])
        );
        assert_eq!(walker.read_u16().unwrap(), 2);
        assert!(walker.at_end());
    }

    #[test]
    fn read_past_limit_leaves_position() {
        let mut walker = Walker::from_bytes(vec![0x00, 0x01, 0x02]);
        walker.skip_bits(4);
        assert!(matches!(
            walker.read("H", true, true),
            Err(Error::OutOfBounds { .. })
        ));
        assert_eq!(walker.bit_offset(false), 4);
        assert!(walker.read_u32().is_err());
        assert_eq!(walker.bit_offset(false), 4);
    }

    #[test]
    fn empty_format() {
        let mut walker = Walker::from_bytes(Vec::new());
        assert_eq!(walker.read("", true, true).unwrap(), Unpacked::Tuple(Vec::new()));
        assert!(matches!(
            walker.read_rest("", true, false),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn endian_from_config_and_override() {
        let data = vec![0x01, 0x00, 0x01, 0x00];
        let mut walker = Walker::from_bytes_with(
            data.clone(),
            WalkerConfig::default().with_endian(crate::Endian::Little),
        );
        assert_eq!(walker.read_u16().unwrap(), 1);
        assert_eq!(walker.read(">H", true, true).unwrap().into_value(), Some(Value::UInt(256)));

        let mut walker = Walker::from_bytes(data);
        assert_eq!(walker.read("<H", true, true).unwrap().into_value(), Some(Value::UInt(1)));
    }

    #[test]
    fn strict_codes_from_config() {
        let mut walker = Walker::from_bytes_with(vec![0; 4], WalkerConfig::strict());
        assert!(matches!(
            walker.read("HP", true, true),
            Err(Error::Malformed { .. })
        ));
        let mut walker = Walker::from_bytes(vec![0; 4]);
        assert!(walker.read("HP", true, true).is_ok());
    }

    #[test]
    fn group() {
        let mut walker = Walker::from_bytes((65u8..80).collect::<Vec<_>>());
        let values = walker.read_group("B", 6, false).unwrap();
        assert_eq!(values.len(), 6);
        assert_eq!(
            values.into_values(),
            (65u64..71).map(Value::UInt).collect::<Vec<_>>()
        );

        let pairs = walker.read_group("BB", 2, false).unwrap();
        assert_eq!(
            pairs,
            Unpacked::Groups(vec![
                Unpacked::Tuple(vec![Value::UInt(71), Value::UInt(72)]),
                Unpacked::Tuple(vec![Value::UInt(73), Value::UInt(74)]),
            ])
        );

        let only = walker.read_group("H", 1, true).unwrap();
        assert_eq!(only, Unpacked::Value(Value::UInt(0x4B4C)));
        let wrapped = walker.read_group("H", 1, false).unwrap();
        assert_eq!(wrapped, Unpacked::Groups(vec![Unpacked::Value(Value::UInt(0x4D4E))]));

        assert!(walker.read_group("B", 2, false).is_err());
        assert_eq!(walker.offset(false), 14);
    }

    #[test]
    fn oversized_formats() {
        let mut walker = Walker::from_bytes(vec![0; 4]);
        let too_wide = format!("{}B", usize::MAX / 4);
        let result = walker.read(&too_wide, true, true);
        assert!(matches!(result, Err(Error::Malformed { .. })));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Malformed);
        assert!(walker.read_group(&too_wide, 2, true).is_err());
        assert!(walker.read_rest(&too_wide, true, false).is_err());
        assert_eq!(walker.bit_offset(false), 0);

        let widest = format!("{}B", usize::MAX / 8);
        assert!(matches!(
            walker.read(&widest, true, true),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(matches!(
            walker.read_group(&widest, 3, true),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(walker.read_rest(&widest, true, false).unwrap().is_empty());
        assert_eq!(walker.read_u32().unwrap(), 0);
    }

    #[test]
    fn rest_strict_and_lenient() {
        let mut walker = Walker::from_bytes((0u8..10).collect::<Vec<_>>());
        walker.read("H", true, true).unwrap();
        let rest = walker.read_rest("BB", true, true).unwrap();
        assert_eq!(rest.len(), 4);
        assert!(walker.at_end());

        walker.reset();
        walker.skip(1);
        assert!(matches!(
            walker.read_rest("BB", true, true),
            Err(Error::LeftoverBits {
                remaining: 72,
                group: 16
            })
        ));
        assert_eq!(walker.offset(false), 1);
        let rest = walker.read_rest("BB", true, false).unwrap();
        assert_eq!(rest.len(), 4);
        assert_eq!(walker.offset(false), 9);
        assert!(walker.still_going());

        walker.reset();
        let rest = walker.read_rest("B", true, true).unwrap();
        assert_eq!(rest.clone().into_values().len(), 10);
        assert!(matches!(rest, Unpacked::Groups(ref g) if matches!(g[0], Unpacked::Value(_))));

        walker.reset();
        let rest = walker.read_rest("B", false, true).unwrap();
        assert!(matches!(rest, Unpacked::Groups(ref g) if matches!(g[0], Unpacked::Tuple(_))));
    }

    #[test]
    fn group_iter_stops_on_error() {
        let mut walker = Walker::from_bytes(vec![0, 1, 0, 2, 0]);
        let format = walker.compile("H").unwrap();
        let results: Vec<_> = walker.group_iter(&format, 5).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[2].is_err());
        assert_eq!(walker.offset(false), 4);
    }

    #[test]
    fn bits() {
        let mut walker = Walker::from_bytes(vec![0xFE, 0xFF, 0xB4, 0xE6, 0x99]);
        assert_eq!(walker.read_bits(19).unwrap(), [0xFE, 0xFF, 0xA0]);
        assert_eq!(walker.read_bits(7).unwrap(), [0xA6]);
        assert_eq!(walker.peek_bits(4).unwrap(), [0x90]);
        assert_eq!(walker.read_bits(4).unwrap(), [0x90]);
        assert_eq!(walker.bit_offset(false), 30);
        assert_eq!(walker.phase(), 6);
        assert_eq!(walker.bit_length(), 10);
        assert!(walker.read_bits(11).is_err());
        assert_eq!(walker.bit_offset(false), 30);
    }

    #[test]
    fn bits_group() {
        let mut walker = Walker::from_bytes(vec![0xF5, 0xB3, 0x9E, 0x01, 0x28, 0x44]);
        let unsigned: Vec<_> = walker
            .read_bits_group(2, 8, false)
            .unwrap()
            .into_iter()
            .map(|v| v.as_u64().unwrap())
            .collect();
        assert_eq!(unsigned, [3, 3, 1, 1, 2, 3, 0, 3]);

        walker.reset();
        let signed: Vec<_> = walker
            .read_bits_group(2, 8, true)
            .unwrap()
            .into_iter()
            .map(|v| v.as_i64().unwrap())
            .collect();
        assert_eq!(signed, [-1, -1, 1, 1, -2, -1, 0, -1]);

        walker.reset();
        let sixes: Vec<_> = walker
            .read_bits_group(6, 8, false)
            .unwrap()
            .into_iter()
            .map(|v| v.as_u64().unwrap())
            .collect();
        assert_eq!(sixes, [61, 27, 14, 30, 0, 18, 33, 4]);
        assert!(matches!(
            walker.read_bits_group(6, 8, false),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(matches!(
            walker.read_bits_group(65, 1, false),
            Err(Error::Malformed { .. })
        ));

        let mut walker = Walker::from_bytes(vec![0xFF; 8]);
        assert_eq!(walker.read_bits_group(64, 1, true).unwrap(), [Value::Int(-1)]);
    }

    #[test]
    fn bcd() {
        let mut walker = Walker::from_bytes(vec![0x12, 0x34, 0x56, 0x78, 0x90]);
        assert_eq!(
            walker.read_bcd(2, 1, true).unwrap(),
            Unpacked::Tuple(vec![Value::UInt(1), Value::UInt(2)])
        );
        assert_eq!(
            walker.read_bcd(2, 2, true).unwrap().into_values(),
            [Value::UInt(34), Value::UInt(56)]
        );
        assert_eq!(walker.read_bcd(1, 2, true).unwrap(), Unpacked::Value(Value::UInt(78)));
        walker.skip(-1);
        assert_eq!(
            walker.read_bcd(1, 2, false).unwrap(),
            Unpacked::Tuple(vec![Value::UInt(78)])
        );

        let mut walker = Walker::from_bytes(vec![0x1A]);
        assert!(walker.read_bcd(1, 2, true).is_err());
        assert_eq!(walker.bit_offset(false), 0);
    }

    #[test]
    fn pascal_strings() {
        let mut walker = Walker::from_bytes(vec![3, b'A', b'B', b'C', 5, b'a', b'b', b'c', b'd', b'e', 4, b'x']);
        assert_eq!(walker.pascal_string().unwrap(), b"ABC");
        assert_eq!(walker.pascal_string().unwrap(), b"abcde");
        assert!(matches!(walker.pascal_string(), Err(Error::OutOfBounds { .. })));
        assert_eq!(walker.offset(false), 10);
    }

    #[test]
    fn chunk_and_rest() {
        let mut walker = Walker::from_bytes(b"ABCDE".to_vec());
        assert_eq!(walker.chunk(1).unwrap(), b"A");
        assert_eq!(walker.chunk(3).unwrap(), b"BCD");
        assert!(walker.chunk(2).is_err());
        assert_eq!(walker.rest().unwrap(), b"E");
        assert_eq!(walker.rest().unwrap(), b"");
    }

    #[test]
    fn rest_mid_byte() {
        let data: Vec<u8> = (0..=255).collect();
        let resource: std::rc::Rc<dyn crate::file::Backend> =
            std::rc::Rc::new(crate::file::Memory::new(data));
        let mut walker = Walker::with_window(resource, 242 * 8, None, WalkerConfig::default());
        walker.read_bits(85).unwrap();
        assert_eq!(walker.rest().unwrap(), [159, 191, 223, 224]);
    }

    #[test]
    fn pieces() {
        let mut walker = Walker::from_bytes(b"ABCDEFGHIJKLMN".to_vec());
        assert_eq!(walker.piece(3, 0, Anchor::Current).unwrap(), b"ABC");
        assert_eq!(walker.piece(3, 7, Anchor::Current).unwrap(), b"HIJ");
        walker.read_group("B", 6, false).unwrap();
        assert_eq!(walker.piece(3, 0, Anchor::Current).unwrap(), b"GHI");
        assert_eq!(walker.piece(3, 0, Anchor::Origin).unwrap(), b"ABC");
        assert_eq!(walker.piece(3, 1, Anchor::Origin).unwrap(), b"BCD");
        assert_eq!(walker.piece(10, 0, Anchor::Current).unwrap(), b"GHIJKLMN");
        assert!(walker.piece(1, 20, Anchor::Origin).is_err());
        assert_eq!(walker.offset(false), 6);

        walker.reset();
        assert_eq!(walker.bit_piece(19, 0, Anchor::Current).unwrap(), b"AB@");
        assert_eq!(walker.bit_piece(24, 56, Anchor::Current).unwrap(), b"HIJ");
        assert!(walker.bit_piece(8, 108, Anchor::Current).is_err());
        assert_eq!(walker.bit_offset(false), 0);
    }

    #[test]
    fn absolute_remainder_escapes_limit() {
        let parent = Walker::from_bytes(b"ABCDEFG".to_vec());
        let mut child = parent.branch(1, Anchor::Origin, Some(2)).unwrap();
        assert_eq!(child.rest().unwrap(), b"B");
        child.reset();
        assert_eq!(child.absolute_remainder(3).unwrap(), b"EFG");
        assert_eq!(child.absolute_remainder(0).unwrap(), b"BCDEFG");
        assert_eq!(child.bit_offset(true), 0);
        assert!(matches!(
            child.absolute_remainder(6),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn typed_reads() {
        let mut walker = Walker::from_bytes(vec![
            0xFF, 0xFF, 0xFE, 0x80, 0x00, 0x00, 0x3F, 0x80, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
            0xFF, 0xFF, 0xFF, 0xFF,
        ]);
        assert_eq!(walker.read_i8().unwrap(), -1);
        assert_eq!(walker.read_i16().unwrap(), -2);
        walker.skip(-2);
        assert_eq!(walker.read_u16().unwrap(), 0xFFFE);
        assert_eq!(walker.read_i24().unwrap(), -8_388_608);
        assert_eq!(walker.read_f32().unwrap(), 1.0);
        assert_eq!(walker.read_i64().unwrap(), -1);
        assert!(walker.at_end());
        assert!(walker.read_u8().is_err());
    }
}
