//! # fontwalk Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the
//! fontwalk library. Import it to get quick access to cursors, formats and decoded values.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all fontwalk operations
pub use crate::Error;

/// Broad category of an error
pub use crate::ErrorKind;

/// The result type used throughout fontwalk
pub use crate::Result;

/// Cursor configuration and its unknown-code policy
pub use crate::{UnknownCodes, WalkerConfig};

// ================================================================================================
// Cursors
// ================================================================================================

/// The cursor, its offset anchors and its result shapes
pub use crate::walker::{Anchor, GroupIter, Unpacked, Walker};

// ================================================================================================
// Values and Formats
// ================================================================================================

/// Byte order and decoded values
pub use crate::codec::{Endian, Value};

/// Compiled formats and their type codes
pub use crate::format::{calcsize, pack, Format, TypeCode};

// ================================================================================================
// Backends
// ================================================================================================

/// Storage strategies behind a cursor
pub use crate::file::{Backend, Exclusive, Memory, Physical, Shared};
