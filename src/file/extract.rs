//! Bit-precise byte extraction.
//!
//! Turns the raw bytes spanning a bit range into a left-justified buffer holding exactly those
//! bits. Every backend fetches the span and hands it here, so the shift-and-mask logic exists
//! once.

use crate::Result;

/// `HIGH_MASKS[k]` keeps the top `8 - k` bits of a byte.
const HIGH_MASKS: [u8; 8] = [0xFF, 0xFE, 0xFC, 0xF8, 0xF0, 0xE0, 0xC0, 0x80];

/// Number of raw bytes that hold `bit_count` bits starting `phase` bits into the first byte.
///
/// An empty read needs no bytes whatever the phase.
pub fn span_len(phase: u8, bit_count: usize) -> usize {
    if bit_count == 0 {
        return 0;
    }
    (usize::from(phase & 7) + bit_count).div_ceil(8)
}

/// Extracts `bit_count` bits from `raw`, starting `phase` bits into `raw[0]`.
///
/// The result holds exactly `ceil(bit_count / 8)` bytes. The first extracted bit is the most
/// significant bit of the first output byte; bits past `bit_count` in the final byte are zero.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `raw` is shorter than [`span_len`].
///
/// # Examples
///
/// ```rust
/// use fontwalk::file::extract_bits;
///
/// // Twelve bits starting at bit 4 of 0xAB 0xCD 0xEF.
/// let bits = extract_bits(&[0xAB, 0xCD, 0xEF], 4, 12)?;
/// assert_eq!(bits, [0xBC, 0xD0]);
/// # Ok::<(), fontwalk::Error>(())
/// ```
pub fn extract_bits(raw: &[u8], phase: u8, bit_count: usize) -> Result<Vec<u8>> {
    let phase = u32::from(phase & 7);
    let span = span_len(phase as u8, bit_count);
    if raw.len() < span {
        return Err(out_of_bounds_error!(
            phase as usize,
            bit_count,
            raw.len() * 8
        ));
    }

    let whole = bit_count / 8;
    let rem = bit_count % 8;
    let mut out = Vec::with_capacity(bit_count.div_ceil(8));

    if phase == 0 {
        out.extend_from_slice(&raw[..whole]);
        if rem > 0 {
            out.push(raw[whole] & HIGH_MASKS[8 - rem]);
        }
        return Ok(out);
    }

    let counter_phase = 8 - phase;
    for i in 0..whole {
        out.push((raw[i] << phase) | (raw[i + 1] >> counter_phase));
    }

    if rem > 0 {
        let from = raw[whole] << phase;
        let last = if rem <= counter_phase as usize {
            from & HIGH_MASKS[8 - rem]
        } else {
            let spill = rem - counter_phase as usize;
            from | ((raw[whole + 1] & HIGH_MASKS[8 - spill]) >> counter_phase)
        };
        out.push(last);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn bit_at(data: &[u8], index: usize) -> bool {
        data[index / 8] & (0x80 >> (index % 8)) != 0
    }

    fn reference(data: &[u8], start: usize, count: usize) -> Vec<u8> {
        let mut out = vec![0u8; count.div_ceil(8)];
        for i in 0..count {
            if bit_at(data, start + i) {
                out[i / 8] |= 0x80 >> (i % 8);
            }
        }
        out
    }

    #[test]
    fn small_cases_match_reference() {
        let data = [0xA5, 0x3C, 0xFF, 0x01, 0x80, 0x7E];
        for phase in 0..8u8 {
            for bit_count in 1..=16 {
                let span = span_len(phase, bit_count);
                let got = extract_bits(&data[..span], phase, bit_count).unwrap();
                assert_eq!(
                    got,
                    reference(&data, phase as usize, bit_count),
                    "phase {} bits {}",
                    phase,
                    bit_count
                );
                assert_eq!(got.len(), bit_count.div_ceil(8));
            }
        }
    }

    #[test]
    fn aligned_copy() {
        assert_eq!(extract_bits(&[0x12, 0x34], 0, 16).unwrap(), [0x12, 0x34]);
        assert_eq!(extract_bits(&[0xFF, 0xFF], 0, 9).unwrap(), [0xFF, 0x80]);
        assert_eq!(extract_bits(&[0xFF], 0, 0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn final_byte_fits_or_spills() {
        // 3 bits at phase 2 stay inside the first byte.
        assert_eq!(extract_bits(&[0b0011_1000], 2, 3).unwrap(), [0b1110_0000]);
        // 5 bits at phase 6 spill into the next byte.
        assert_eq!(
            extract_bits(&[0b0000_0011, 0b1110_0000], 6, 5).unwrap(),
            [0b1111_1000]
        );
    }

    #[test]
    fn short_span_is_rejected() {
        assert!(matches!(
            extract_bits(&[0xFF], 4, 8),
            Err(Error::OutOfBounds { .. })
        ));
        assert_eq!(span_len(4, 8), 2);
        assert_eq!(span_len(0, 0), 0);
        assert_eq!(span_len(7, 1), 1);
        assert_eq!(span_len(7, 2), 2);
    }
}
