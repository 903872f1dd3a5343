//! Endian-aware primitive reading and writing over byte slices.
//!
//! The building blocks under [`crate::codec`]: bounds-checked reads and writes of fixed-width
//! primitives at a running offset, with the byte order chosen per call.
//!
//! # Key Components
//!
//! - [`crate::codec::io::Primitive`] - Trait tying a numeric type to its byte array form
//! - [`crate::codec::io::read_at`] / [`crate::codec::io::write_at`] - Offset-tracking access
//! - [`crate::codec::io::read_u24_at`] / [`crate::codec::io::write_u24_at`] - Tribyte access
//!
//! The byte reordering relies on the standard `from_be_bytes` / `from_le_bytes` family, so the
//! native order of the host never has to be probed at runtime.
//!
//! # Examples
//!
//! ```rust
//! use fontwalk::codec::{io::read_at, Endian};
//!
//! let data = [0x00, 0x01, 0x02, 0x00];
//! let mut offset = 0;
//! let first: u16 = read_at(&data, &mut offset, Endian::Big)?;
//! let second: u16 = read_at(&data, &mut offset, Endian::Little)?;
//! assert_eq!((first, second), (1, 2));
//! assert_eq!(offset, 4);
//! # Ok::<(), fontwalk::Error>(())
//! ```

use crate::{codec::Endian, Result};

/// Trait for fixed-width primitives that can be read from and written to raw bytes.
///
/// Each implementation names the byte array it converts from (e.g. `[u8; 4]` for `u32`).
pub trait Primitive: Sized + Copy {
    /// Byte array representation of this type
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte array in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    /// Read T from a byte array in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte array in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
    /// Write T to a byte array in big-endian
    fn to_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_primitive {
    ($($ty:ty => $len:literal),* $(,)?) => {
        $(
            impl Primitive for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_primitive!(
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
    f32 => 4,
    f64 => 8,
);

/// Reads a `T` at `offset` in the given byte order and advances the offset past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_at<T: Primitive>(data: &[u8], offset: &mut usize, endian: Endian) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!(*offset * 8, type_len * 8, data.len() * 8));
    };
    if end > data.len() {
        return Err(out_of_bounds_error!(*offset * 8, type_len * 8, data.len() * 8));
    }

    let Ok(read) = T::Bytes::try_from(&data[*offset..end]) else {
        return Err(out_of_bounds_error!(*offset * 8, type_len * 8, data.len() * 8));
    };

    *offset = end;

    Ok(match endian {
        Endian::Big => T::from_be_bytes(read),
        Endian::Little => T::from_le_bytes(read),
    })
}

/// Writes `value` at `offset` in the given byte order and advances the offset past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit in the remaining space.
pub fn write_at<T: Primitive>(
    data: &mut [u8],
    offset: &mut usize,
    value: T,
    endian: Endian,
) -> Result<()> {
    let bytes = match endian {
        Endian::Big => value.to_be_bytes(),
        Endian::Little => value.to_le_bytes(),
    };
    let bytes = bytes.as_ref();

    let Some(end) = offset.checked_add(bytes.len()) else {
        return Err(out_of_bounds_error!(*offset * 8, bytes.len() * 8, data.len() * 8));
    };
    if end > data.len() {
        return Err(out_of_bounds_error!(*offset * 8, bytes.len() * 8, data.len() * 8));
    }

    data[*offset..end].copy_from_slice(bytes);
    *offset = end;
    Ok(())
}

/// Reads an unsigned 24-bit value at `offset`, advancing by three bytes.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than three bytes remain.
pub fn read_u24_at(data: &[u8], offset: &mut usize, endian: Endian) -> Result<u32> {
    let Some(raw) = offset
        .checked_add(3)
        .and_then(|end| data.get(*offset..end))
    else {
        return Err(out_of_bounds_error!(*offset * 8, 24, data.len() * 8));
    };

    let value = match endian {
        Endian::Big => u32::from_be_bytes([0, raw[0], raw[1], raw[2]]),
        Endian::Little => u32::from_le_bytes([raw[0], raw[1], raw[2], 0]),
    };

    *offset += 3;
    Ok(value)
}

/// Reads a signed 24-bit value at `offset`, advancing by three bytes.
///
/// Bit 23 is replicated into the top byte of the 32-bit result.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than three bytes remain.
pub fn read_i24_at(data: &[u8], offset: &mut usize, endian: Endian) -> Result<i32> {
    let value = read_u24_at(data, offset, endian)?;
    Ok(((value << 8) as i32) >> 8)
}

/// Writes the low 24 bits of `value` at `offset`, advancing by three bytes.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than three bytes remain.
pub fn write_u24_at(data: &mut [u8], offset: &mut usize, value: u32, endian: Endian) -> Result<()> {
    let len = data.len();
    let Some(slot) = offset
        .checked_add(3)
        .and_then(|end| data.get_mut(*offset..end))
    else {
        return Err(out_of_bounds_error!(*offset * 8, 24, len * 8));
    };

    let be = value.to_be_bytes();
    match endian {
        Endian::Big => slot.copy_from_slice(&be[1..]),
        Endian::Little => slot.copy_from_slice(&[be[3], be[2], be[1]]),
    }

    *offset += 3;
    Ok(())
}
