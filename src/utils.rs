//! Small helpers over raw table bytes.

/// OpenType table checksum: the sum of the data as big-endian `u32` words, modulo 2^32.
///
/// A trailing partial word is padded with zeros.
///
/// # Examples
///
/// ```rust
/// use fontwalk::utils::checksum;
///
/// assert_eq!(checksum(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02]), 3);
/// assert_eq!(checksum(&[0x01]), 0x0100_0000);
/// ```
#[must_use]
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

/// Expands bytes into bits, most significant bit first.
#[must_use]
pub fn explode(data: &[u8]) -> Vec<bool> {
    data.iter()
        .flat_map(|byte| (0..8).rev().map(move |bit| (byte >> bit) & 1 == 1))
        .collect()
}

/// Packs bits back into bytes, most significant bit first.
///
/// A final partial byte is left-justified and zero-filled, matching what the cursor returns
/// for a read that is not a whole number of bytes.
#[must_use]
pub fn implode(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (index, set)| byte | (u8::from(*set) << (7 - index)))
        })
        .collect()
}
