//! The closed set of type codes understood by the format mini-language.

use strum::{EnumCount, EnumIter};

/// A recognised value type code.
///
/// Each variant maps to one character of the format grammar. `I` and `L` both map to
/// [`TypeCode::UInt32`], `i` and `l` both map to [`TypeCode::Int32`]; [`TypeCode::as_char`]
/// returns the `I` / `i` spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum TypeCode {
    /// `B` - unsigned 8-bit
    UInt8,
    /// `b` - signed 8-bit
    Int8,
    /// `H` - unsigned 16-bit
    UInt16,
    /// `h` - signed 16-bit
    Int16,
    /// `T` - unsigned 24-bit tribyte
    UInt24,
    /// `t` - signed 24-bit tribyte
    Int24,
    /// `I` or `L` - unsigned 32-bit
    UInt32,
    /// `i` or `l` - signed 32-bit
    Int32,
    /// `f` - IEEE-754 single precision
    Float32,
    /// `Q` - unsigned 64-bit
    UInt64,
    /// `q` - signed 64-bit
    Int64,
    /// `d` - IEEE-754 double precision
    Float64,
    /// `c` - a single raw byte, one item per repetition
    Char,
    /// `p` - length-prefixed string occupying `count` bytes, one item
    Pascal,
    /// `s` - raw byte string of `count` bytes, one item
    Bytes,
    /// `x` - padding, no item
    Pad,
}

impl TypeCode {
    /// Maps a format character to its type code, or `None` for anything outside the set.
    ///
    /// Endianness characters are not type codes; see [`crate::codec::Endian::from_code`].
    pub fn from_char(c: char) -> Option<TypeCode> {
        Some(match c {
            'B' => TypeCode::UInt8,
            'b' => TypeCode::Int8,
            'H' => TypeCode::UInt16,
            'h' => TypeCode::Int16,
            'T' => TypeCode::UInt24,
            't' => TypeCode::Int24,
            'I' | 'L' => TypeCode::UInt32,
            'i' | 'l' => TypeCode::Int32,
            'f' => TypeCode::Float32,
            'Q' => TypeCode::UInt64,
            'q' => TypeCode::Int64,
            'd' => TypeCode::Float64,
            'c' => TypeCode::Char,
            'p' => TypeCode::Pascal,
            's' => TypeCode::Bytes,
            'x' => TypeCode::Pad,
            _ => return None,
        })
    }

    /// The canonical format character for this code.
    pub fn as_char(self) -> char {
        match self {
            TypeCode::UInt8 => 'B',
            TypeCode::Int8 => 'b',
            TypeCode::UInt16 => 'H',
            TypeCode::Int16 => 'h',
            TypeCode::UInt24 => 'T',
            TypeCode::Int24 => 't',
            TypeCode::UInt32 => 'I',
            TypeCode::Int32 => 'i',
            TypeCode::Float32 => 'f',
            TypeCode::UInt64 => 'Q',
            TypeCode::Int64 => 'q',
            TypeCode::Float64 => 'd',
            TypeCode::Char => 'c',
            TypeCode::Pascal => 'p',
            TypeCode::Bytes => 's',
            TypeCode::Pad => 'x',
        }
    }

    /// Bytes consumed by one unit of repeat count.
    pub fn unit_size(self) -> usize {
        match self {
            TypeCode::UInt8
            | TypeCode::Int8
            | TypeCode::Char
            | TypeCode::Pascal
            | TypeCode::Bytes
            | TypeCode::Pad => 1,
            TypeCode::UInt16 | TypeCode::Int16 => 2,
            TypeCode::UInt24 | TypeCode::Int24 => 3,
            TypeCode::UInt32 | TypeCode::Int32 | TypeCode::Float32 => 4,
            TypeCode::UInt64 | TypeCode::Int64 | TypeCode::Float64 => 8,
        }
    }

    /// Number of logical items a field with this code and repeat count produces.
    pub fn items(self, count: usize) -> usize {
        match self {
            TypeCode::Pascal | TypeCode::Bytes => 1,
            TypeCode::Pad => 0,
            _ => count,
        }
    }

    /// True for the two's-complement integer codes.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            TypeCode::Int8 | TypeCode::Int16 | TypeCode::Int24 | TypeCode::Int32 | TypeCode::Int64
        )
    }

    /// True for codes whose whole repeat count forms a single byte-string value.
    pub fn is_string(self) -> bool {
        matches!(self, TypeCode::Pascal | TypeCode::Bytes)
    }
}
