// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # fontwalk
//!
//! Bit-precise cursors for walking font tables and other packed binary structures.
//!
//! A [`Walker`] is a window onto a backing resource with its own origin, position and limit,
//! all tracked in bits. Reads are driven by a compact format string (`"2H3x1s"`), by typed
//! helpers, or by raw bit counts; any read can start in the middle of a byte. Walkers branch
//! into child walkers over the same resource, each with its own window, and the resource is
//! closed when the last of them is dropped.
//!
//! ## Features
//!
//! - **Bit-level positioning** - seek, skip, align and read at any bit offset
//! - **Format mini-language** - struct-style codes with repeat counts and per-field byte order
//! - **Three backends** - owned buffers (or memory-mapped files), exclusive file handles, and
//!   shared file handles with a one-byte read-ahead
//! - **Atomic failures** - a read that would cross the limit fails without moving the cursor
//!
//! ## Quick Start
//!
//! ```rust
//! use fontwalk::prelude::*;
//!
//! // Offset subtable header of a TrueType font: sfnt version, table count, search fields.
//! let data = vec![
//!     0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x20, 0x00, 0x01, 0x00, 0x00,
//! ];
//! let mut walker = Walker::from_bytes(data);
//! let version = walker.read_u32()?;
//! let tables = walker.read("H", true, true)?;
//!
//! assert_eq!(version, 0x0001_0000);
//! assert_eq!(tables.into_value(), Some(Value::UInt(2)));
//! assert_eq!(walker.length(false), 6);
//! # Ok::<(), fontwalk::Error>(())
//! ```
//!
//! ### Files
//!
//! ```rust,no_run
//! use fontwalk::{Walker, WalkerConfig};
//!
//! let walker = Walker::open_shared("font.ttf", WalkerConfig::default())?;
//! let mut head = walker.branch(0x10C, fontwalk::Anchor::Absolute, None)?;
//! let checksum_adjustment = head.read_u32()?;
//! # Ok::<(), fontwalk::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`codec`] - Byte order and value reconstruction
//! - [`format`] - The format mini-language
//! - [`file`] - Backing resources and the bit extractor
//! - [`walker`] - The cursor itself
//! - [`config`] - Cursor configuration
//! - [`utils`] - Checksums and bit expansion
//! - [`prelude`] - Convenient re-exports
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], with [`Error`] covering range violations, malformed
//! arguments and I/O failures. [`Error::kind`] groups them into broad categories.

#[macro_use]
pub(crate) mod error;

/// Byte order handling and conversion between raw bytes and values.
pub mod codec;

/// Configuration for cursors.
pub mod config;

/// Backing resources and bit extraction.
pub mod file;

/// The format mini-language.
///
/// # Examples
///
/// ```rust
/// use fontwalk::format::Format;
///
/// let format = Format::parse("2H3x1s")?;
/// assert_eq!(format.byte_size(), 8);
/// assert_eq!(format.item_count(), 3);
/// # Ok::<(), fontwalk::Error>(())
/// ```
pub mod format;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use fontwalk::prelude::*;
///
/// let mut walker = Walker::from_bytes(vec![0x12, 0x34]);
/// assert_eq!(walker.read_u16()?, 0x1234);
/// # Ok::<(), fontwalk::Error>(())
/// ```
pub mod prelude;

/// Helpers over raw table bytes.
pub mod utils;

/// Bit-precise cursors.
pub mod walker;

/// `fontwalk` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `fontwalk` Error type
///
/// See [`Error`] for the full list of variants and [`ErrorKind`] for their categories.
pub use error::{Error, ErrorKind};

/// Cursor configuration.
pub use config::{UnknownCodes, WalkerConfig};

/// Byte order and decoded values.
pub use codec::{Endian, Value};

/// The format mini-language and its one-shot helpers.
pub use format::{calcsize, pack, Format, TypeCode};

/// The cursor and its result shapes.
pub use walker::{Anchor, GroupIter, Unpacked, Walker};

/// The storage abstraction behind every cursor.
pub use file::Backend;
