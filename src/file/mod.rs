//! Backing resources for cursors.
//!
//! A cursor never touches storage directly. It asks a [`Backend`] for the raw bytes spanning a
//! bit range and lets [`extract_bits`] cut the requested bits out of them. The backends differ
//! only in how they produce those bytes.
//!
//! # Key Components
//!
//! ## Core Types
//! - [`crate::file::Backend`] - Trait implemented by every storage strategy
//! - [`crate::file::Client`] - Per-cursor state a backend may keep (identity, read-ahead byte)
//! - [`crate::file::extract_bits`] - The shared shift-and-mask extractor
//!
//! ## Backend Implementations
//! - [`crate::file::Memory`] - Owned in-memory buffer
//! - [`crate::file::Physical`] - Memory-mapped file, read as a buffer
//! - [`crate::file::Exclusive`] - File handle that seeks before every read
//! - [`crate::file::Shared`] - File handle shared by many cursors, with read-ahead
//!
//! # Ownership
//!
//! Cursors hold their backend through an `Rc`, so the resource lives exactly as long as the
//! longest-lived cursor branched from it and is closed when the last one drops. Backends are
//! not `Sync` and `Rc` is neither `Send` nor `Sync`: all cursors over one resource stay on the
//! thread that created it. [`Shared`] keeps a single file position for all of its cursors and
//! relies on that single-threaded access.
//!
//! # Examples
//!
//! ```rust
//! use fontwalk::file::{Backend, Memory};
//!
//! let memory = Memory::new(vec![0xAB, 0xCD, 0xEF]);
//! let mut client = memory.client();
//! let bits = memory.read_bits(&mut client, 4, 12)?;
//! assert_eq!(bits, [0xBC, 0xD0]);
//! # Ok::<(), fontwalk::Error>(())
//! ```

mod exclusive;
mod extract;
mod memory;
mod physical;
mod shared;

pub use exclusive::Exclusive;
pub use extract::{extract_bits, span_len};
pub use memory::Memory;
pub use physical::Physical;
pub use shared::Shared;

use std::borrow::Cow;

use crate::Result;

/// Per-cursor state held on behalf of a backend.
///
/// Each cursor owns one `Client`. Backends that share a file position between cursors use the
/// id to tell them apart and may stash the last byte they read for the cursor.
#[derive(Debug, Clone)]
pub struct Client {
    id: u64,
    read_ahead: bool,
    byte_in_process: Option<(usize, u8)>,
}

impl Client {
    /// Creates client state with the given id and read-ahead enabled.
    pub fn new(id: u64) -> Client {
        Client {
            id,
            read_ahead: true,
            byte_in_process: None,
        }
    }

    /// The id the backend assigned to this client.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the backend may keep a read-ahead byte for this client.
    pub fn read_ahead(&self) -> bool {
        self.read_ahead
    }

    /// Enables or disables the read-ahead byte, dropping any byte already kept.
    pub fn set_read_ahead(&mut self, enabled: bool) {
        self.read_ahead = enabled;
        self.byte_in_process = None;
    }

    /// The kept byte as `(byte index, value)`, if any.
    pub fn byte_in_process(&self) -> Option<(usize, u8)> {
        self.byte_in_process
    }

    /// Takes the kept byte if it is the byte at `index`. Any other kept byte is dropped.
    pub fn take_byte(&mut self, index: usize) -> Option<u8> {
        match self.byte_in_process.take() {
            Some((kept, value)) if kept == index => Some(value),
            _ => None,
        }
    }

    /// Keeps `value` as the byte at `index`, if read-ahead is enabled.
    pub fn keep_byte(&mut self, index: usize, value: u8) {
        if self.read_ahead {
            self.byte_in_process = Some((index, value));
        }
    }

    /// Drops the kept byte.
    pub fn forget(&mut self) {
        self.byte_in_process = None;
    }
}

/// Storage strategy behind a cursor.
///
/// Implementations only have to produce raw bytes; bit extraction and all window checks live
/// in the cursor.
pub trait Backend {
    /// Short name of the strategy, used in log output.
    fn name(&self) -> &'static str;

    /// Total size of the resource in bytes.
    fn len(&self) -> usize;

    /// Returns `true` if the resource holds no data.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total size of the resource in bits.
    fn bit_len(&self) -> usize {
        self.len().saturating_mul(8)
    }

    /// Creates the state for a new cursor over this resource.
    fn client(&self) -> Client {
        Client::new(0)
    }

    /// Returns `len` bytes starting at byte `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the resource, or
    /// [`crate::Error::FileError`] if the underlying read fails.
    fn fetch(&self, client: &mut Client, offset: usize, len: usize) -> Result<Cow<'_, [u8]>>;

    /// Called whenever a cursor's position changes without a read.
    ///
    /// The next fetch for `client` must not rely on any state left by its previous fetch.
    fn invalidate(&self, client: &mut Client) {
        client.forget();
    }

    /// Called when a cursor is dropped.
    fn release(&self, _client: &Client) {}

    /// Reads `bit_count` bits starting at absolute bit `bit_offset`, left-justified into
    /// `ceil(bit_count / 8)` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the bits extend past the resource, or
    /// [`crate::Error::FileError`] if the underlying read fails.
    fn read_bits(&self, client: &mut Client, bit_offset: usize, bit_count: usize) -> Result<Vec<u8>> {
        let Some(end) = bit_offset.checked_add(bit_count) else {
            return Err(out_of_bounds_error!(bit_offset, bit_count, self.bit_len()));
        };
        if end > self.bit_len() {
            return Err(out_of_bounds_error!(bit_offset, bit_count, self.bit_len()));
        }

        let phase = (bit_offset & 7) as u8;
        let span = span_len(phase, bit_count);
        let raw = self.fetch(client, bit_offset >> 3, span)?;
        extract_bits(&raw, phase, bit_count)
    }
}

/// Bounds check shared by the backends, in bytes.
fn check_range(offset: usize, len: usize, size: usize) -> Result<usize> {
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(end),
        _ => Err(out_of_bounds_error!(
            offset.saturating_mul(8),
            len.saturating_mul(8),
            size.saturating_mul(8)
        )),
    }
}
