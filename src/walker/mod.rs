//! Bit-precise cursors over a shared backing resource.
//!
//! A [`Walker`] is a window onto a [`crate::file::Backend`] with its own origin, position and
//! limit. Positions are tracked in bits; byte-oriented calls are thin wrappers that multiply by
//! eight, so a cursor can sit in the middle of a byte (its *phase*) and keep reading from there.
//!
//! # Architecture
//!
//! - **Window** - `origin <= position <= limit <= resource size`, all in bits
//! - **Reads** - fetch raw bytes from the backend, cut out the bits, decode per format
//! - **Branches** - new cursors over the same `Rc` resource with their own window
//!
//! # Key Components
//!
//! - [`crate::walker::Walker`] - The cursor
//! - [`crate::walker::Anchor`] - What an offset is measured from
//! - [`crate::walker::Unpacked`] - Shape of format-driven results
//! - [`crate::walker::GroupIter`] - Lazy repetition of one format
//!
//! # Failure Semantics
//!
//! Reads, seeks and alignment that would leave the window fail before anything moves: the
//! position after an error is the position before the call. [`Walker::skip`] is the exception
//! and clamps to the window instead of failing. [`Walker::read_group`] checks the whole run up
//! front, but a decode failure part-way through a group leaves the cursor after the last
//! repetition that succeeded.
//!
//! # Examples
//!
//! ```rust
//! use fontwalk::{Anchor, Walker, Value};
//!
//! // A 'name' table header: format, count, string offset.
//! let mut walker = Walker::from_bytes(vec![0x00, 0x00, 0x00, 0x02, 0x00, 0x1E]);
//! let header = walker.read("3H", false, true)?;
//! assert_eq!(header.into_values()[1], Value::UInt(2));
//! assert!(walker.at_end());
//!
//! let mut strings = walker.branch(4, Anchor::Origin, None)?;
//! assert_eq!(strings.read_u16()?, 0x1E);
//! # Ok::<(), fontwalk::Error>(())
//! ```

mod read;
mod unpacked;

pub use read::GroupIter;
pub use unpacked::Unpacked;

use std::{fmt, path::Path, rc::Rc};

use crate::{
    codec::Endian,
    config::WalkerConfig,
    file::{Backend, Client, Exclusive, Memory, Physical, Shared},
    Error, Result,
};

/// Reference point for an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Anchor {
    /// The cursor's own origin
    #[default]
    Origin,
    /// The cursor's current position
    Current,
    /// The start of the whole resource
    Absolute,
}

/// A cursor over a shared backing resource.
///
/// Dropping a walker releases its share of the resource; the resource itself is closed when the
/// last walker over it is dropped. Walkers are neither `Send` nor `Sync`.
pub struct Walker {
    resource: Rc<dyn Backend>,
    client: Client,
    origin: usize,
    current: usize,
    limit: usize,
    config: WalkerConfig,
}

impl Walker {
    /// Creates a cursor over the whole of `resource`.
    pub fn new(resource: Rc<dyn Backend>, config: WalkerConfig) -> Walker {
        Self::with_window(resource, 0, None, config)
    }

    /// Creates a cursor over `resource` starting at bit `start`.
    ///
    /// `limit` is the exclusive bit limit; `None` means the end of the resource. The limit is
    /// clamped to the resource size and the start is clamped to the limit.
    pub fn with_window(
        resource: Rc<dyn Backend>,
        start: usize,
        limit: Option<usize>,
        config: WalkerConfig,
    ) -> Walker {
        let size = resource.bit_len();
        let limit = limit.map_or(size, |limit| limit.min(size));
        let start = start.min(limit);

        let mut client = resource.client();
        client.set_read_ahead(config.read_ahead);

        Walker {
            resource,
            client,
            origin: start,
            current: start,
            limit,
            config,
        }
    }

    /// Creates a big-endian cursor over an owned buffer.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Walker {
        Self::from_bytes_with(data, WalkerConfig::default())
    }

    /// Creates a cursor over an owned buffer with the given configuration.
    pub fn from_bytes_with(data: impl Into<Vec<u8>>, config: WalkerConfig) -> Walker {
        Self::new(Rc::new(Memory::new(data.into())), config)
    }

    /// Creates a cursor over a memory-mapped file.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// [`crate::Error::Error`] if it cannot be mapped.
    pub fn from_mapped_file(path: impl AsRef<Path>, config: WalkerConfig) -> Result<Walker> {
        Ok(Self::new(Rc::new(Physical::new(path)?), config))
    }

    /// Creates a cursor over a file that is positioned before every read.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened.
    pub fn open_exclusive(path: impl AsRef<Path>, config: WalkerConfig) -> Result<Walker> {
        Ok(Self::new(Rc::new(Exclusive::open(path)?), config))
    }

    /// Creates a cursor over a file whose handle is shared with every branch.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened.
    pub fn open_shared(path: impl AsRef<Path>, config: WalkerConfig) -> Result<Walker> {
        Ok(Self::new(Rc::new(Shared::open(path)?), config))
    }

    /// Current position in bits, absolute or relative to the origin.
    pub fn bit_offset(&self, relative: bool) -> usize {
        if relative {
            self.current.saturating_sub(self.origin)
        } else {
            self.current
        }
    }

    /// Current position in whole bytes, absolute or relative to the origin.
    ///
    /// The sub-byte part is dropped; see [`Walker::phase`].
    pub fn offset(&self, relative: bool) -> usize {
        self.bit_offset(relative) / 8
    }

    /// Bit position within the current byte (0 to 7).
    pub fn phase(&self) -> u8 {
        (self.current & 7) as u8
    }

    /// Absolute bit position of the origin.
    pub fn bit_origin(&self) -> usize {
        self.origin
    }

    /// Absolute exclusive bit limit.
    pub fn bit_limit(&self) -> usize {
        self.limit
    }

    /// Bits between the current position and the limit.
    pub fn bit_length(&self) -> usize {
        self.limit.saturating_sub(self.current)
    }

    /// Whole bytes between the current position (or the origin) and the limit.
    ///
    /// Phase is ignored: a cursor three bits into a byte counts that byte as available.
    pub fn length(&self, from_start: bool) -> usize {
        let from = if from_start { self.origin } else { self.current };
        (self.limit / 8).saturating_sub(from / 8)
    }

    /// True once the position has reached the limit.
    pub fn at_end(&self) -> bool {
        self.current >= self.limit
    }

    /// True while there is data left before the limit.
    pub fn still_going(&self) -> bool {
        !self.at_end()
    }

    /// Byte order used for fields without an explicit override.
    pub fn endian(&self) -> Endian {
        self.config.endian
    }

    /// The configuration this cursor was created with.
    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Size of the whole backing resource in bytes.
    pub fn resource_len(&self) -> usize {
        self.resource.len()
    }

    /// Size of the whole backing resource in bits.
    pub fn resource_bit_len(&self) -> usize {
        self.resource.bit_len()
    }

    /// Number of live cursors sharing the backing resource, this one included.
    pub fn owner_count(&self) -> usize {
        Rc::strong_count(&self.resource)
    }

    /// The backing resource.
    pub fn resource(&self) -> &Rc<dyn Backend> {
        &self.resource
    }

    /// Moves back to the origin.
    pub fn reset(&mut self) {
        self.move_to(self.origin);
    }

    /// Moves to a byte offset measured from `anchor`.
    ///
    /// [`Anchor::Current`] measures from the start of the current byte, so a byte seek never
    /// keeps the phase it started in. Unless `allow_exceed` is set, the target must lie in
    /// `[origin, limit)`. Positions before the origin are rejected even though they may be
    /// inside the resource: a cursor never looks behind its own window.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOffset`] if the target is outside the window (or negative
    /// when `allow_exceed` is set). The position is unchanged.
    pub fn seek(&mut self, offset: isize, anchor: Anchor, allow_exceed: bool) -> Result<()> {
        let target = self.byte_anchor_base(anchor) as i128 + offset as i128 * 8;
        self.seek_to(target, allow_exceed)
    }

    /// Moves to a bit offset measured from `anchor`. See [`Walker::seek`].
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOffset`] if the target is outside the window.
    pub fn bit_seek(&mut self, offset: impl Into<i128>, anchor: Anchor, allow_exceed: bool) -> Result<()> {
        let target = self.anchor_base(anchor) as i128 + offset.into();
        self.seek_to(target, allow_exceed)
    }

    /// Moves forwards or backwards by whole bytes from the start of the current byte, stopping
    /// at the origin or the limit. The phase is cleared; see [`Walker::skip_with`] to keep it.
    pub fn skip(&mut self, bytes: isize) {
        self.skip_with(bytes, true);
    }

    /// Moves by whole bytes, keeping the phase unless `reset_phase` is set.
    ///
    /// ```rust
    /// use fontwalk::Walker;
    ///
    /// let mut walker = Walker::from_bytes(vec![0u8; 16]);
    /// walker.skip(5);
    /// walker.read_bits(3)?;
    /// walker.skip_with(2, false);
    /// assert_eq!((walker.offset(false), walker.phase()), (7, 3));
    /// walker.skip(1);
    /// assert_eq!((walker.offset(false), walker.phase()), (8, 0));
    /// # Ok::<(), fontwalk::Error>(())
    /// ```
    pub fn skip_with(&mut self, bytes: isize, reset_phase: bool) {
        let bits = bytes.saturating_mul(8);
        if reset_phase {
            let from = (self.current & !7) as i128;
            self.clamp_to(from + bits as i128);
        } else {
            self.skip_bits(bits);
        }
    }

    /// Moves forwards or backwards by bits, stopping at the origin or the limit.
    pub fn skip_bits(&mut self, bits: isize) {
        self.clamp_to(self.current as i128 + bits as i128);
    }

    /// Advances to the next multiple of `multiple` bytes.
    ///
    /// With `absolute` the multiple is measured from the start of the resource, otherwise from
    /// the origin.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a zero multiple and
    /// [`crate::Error::InvalidOffset`] if the aligned position is past the limit. The position is
    /// unchanged on error.
    pub fn align(&mut self, multiple: usize, absolute: bool) -> Result<()> {
        self.bit_align(multiple.saturating_mul(8), absolute)
    }

    /// Advances to the next multiple of `multiple` bits. See [`Walker::align`].
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a zero multiple and
    /// [`crate::Error::InvalidOffset`] if the aligned position is past the limit.
    pub fn bit_align(&mut self, multiple: usize, absolute: bool) -> Result<()> {
        if multiple == 0 {
            return Err(malformed_error!("Alignment multiple must be positive"));
        }

        let adjust = if absolute { 0 } else { self.origin };
        let relative = self.current.saturating_sub(adjust) as u128;
        let aligned = relative.div_ceil(multiple as u128) * multiple as u128 + adjust as u128;
        if aligned > self.limit as u128 {
            return Err(Error::InvalidOffset {
                target: aligned as i128,
                limit: self.limit,
            });
        }

        if aligned as usize != self.current {
            self.move_to(aligned as usize);
        }
        Ok(())
    }

    /// Creates a new cursor over the same resource, at a byte offset measured from `anchor`.
    ///
    /// `new_limit` is a byte count whose meaning depends on the anchor:
    ///
    /// - `None` keeps this cursor's limit.
    /// - [`Anchor::Current`]: a length from the new start, capped at this cursor's limit.
    /// - [`Anchor::Origin`]: an offset from this cursor's origin, capped at this cursor's limit.
    /// - [`Anchor::Absolute`]: an absolute position capped at the resource size; zero means the
    ///   whole resource.
    ///
    /// The start is clamped to the new limit. The branch inherits this cursor's configuration.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOffset`] if the start resolves to a negative position.
    pub fn branch(&self, offset: isize, anchor: Anchor, new_limit: Option<usize>) -> Result<Walker> {
        self.bit_branch(
            offset as i128 * 8,
            anchor,
            new_limit.map(|limit| limit.saturating_mul(8)),
        )
    }

    /// Creates a new cursor over the same resource, with offset and limit in bits. See
    /// [`Walker::branch`].
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOffset`] if the start resolves to a negative position.
    pub fn bit_branch(
        &self,
        offset: impl Into<i128>,
        anchor: Anchor,
        new_limit: Option<usize>,
    ) -> Result<Walker> {
        let start = self.anchor_base(anchor) as i128 + offset.into();
        if start < 0 || start > usize::MAX as i128 {
            return Err(Error::InvalidOffset {
                target: start,
                limit: self.limit,
            });
        }
        let start = start as usize;

        let size = self.resource.bit_len();
        let limit = match (new_limit, anchor) {
            (None, _) => self.limit,
            (Some(0), Anchor::Absolute) => size,
            (Some(limit), Anchor::Absolute) => limit.min(size),
            (Some(length), Anchor::Current) => start.saturating_add(length).min(self.limit),
            (Some(length), Anchor::Origin) => self.origin.saturating_add(length).min(self.limit),
        };

        let child = Walker::with_window(self.resource.clone(), start, Some(limit), self.config);
        log::debug!(
            "{} branch at bit {} limit {} ({} owners)",
            self.resource.name(),
            child.origin,
            child.limit,
            child.owner_count()
        );
        Ok(child)
    }

    fn anchor_base(&self, anchor: Anchor) -> usize {
        match anchor {
            Anchor::Origin => self.origin,
            Anchor::Current => self.current,
            Anchor::Absolute => 0,
        }
    }

    /// Like [`Walker::anchor_base`], with the current position rounded down to its byte.
    fn byte_anchor_base(&self, anchor: Anchor) -> usize {
        match anchor {
            Anchor::Current => self.current & !7,
            other => self.anchor_base(other),
        }
    }

    fn seek_to(&mut self, target: i128, allow_exceed: bool) -> Result<()> {
        let in_window = target >= self.origin as i128 && target < self.limit as i128;
        let reachable = target >= 0 && target <= usize::MAX as i128;
        if !(in_window || (allow_exceed && reachable)) {
            return Err(Error::InvalidOffset {
                target,
                limit: self.limit,
            });
        }

        self.move_to(target as usize);
        Ok(())
    }

    fn clamp_to(&mut self, target: i128) {
        let target = target.clamp(self.origin as i128, self.limit.max(self.origin) as i128);
        self.move_to(target as usize);
    }

    /// Position change that does not go through a read.
    fn move_to(&mut self, target: usize) {
        self.current = target;
        self.resource.invalidate(&mut self.client);
    }
}

impl Drop for Walker {
    fn drop(&mut self) {
        self.resource.release(&self.client);
    }
}

impl fmt::Debug for Walker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Walker")
            .field("resource", &self.resource.name())
            .field("origin", &self.origin)
            .field("current", &self.current)
            .field("limit", &self.limit)
            .field("endian", &self.config.endian)
            .finish()
    }
}
