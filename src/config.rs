//! Walker configuration
//!
//! Options that every cursor carries and hands down to its branches: the default byte order,
//! how the format parser treats codes it does not recognise, and whether the shared-file
//! backend keeps a read-ahead byte per cursor.

use crate::codec::Endian;

/// How the format parser treats characters outside the recognised code set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownCodes {
    /// Skip the character and any repeat count in front of it (historical behaviour)
    #[default]
    Ignore,
    /// Fail with [`crate::Error::Malformed`]
    Reject,
}

/// Configuration for cursors created over a resource
///
/// Branches inherit the configuration of the cursor they were created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Byte order used until a format string overrides it (default: big-endian)
    pub endian: Endian,

    /// Treatment of unrecognised format codes (default: ignored)
    pub unknown_codes: UnknownCodes,

    /// Keep the trailing byte of each shared-file read so that a read resuming mid-byte
    /// does not seek backwards (default: true). Has no effect on other backends.
    pub read_ahead: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            endian: Endian::Big,
            unknown_codes: UnknownCodes::Ignore,
            read_ahead: true,
        }
    }
}

impl WalkerConfig {
    /// Creates the configuration matching historical behaviour
    ///
    /// Big-endian, unknown format codes skipped, read-ahead enabled. Same as [`Default`].
    #[must_use]
    pub fn legacy() -> Self {
        Self::default()
    }

    /// Creates a configuration that rejects unrecognised format codes
    #[must_use]
    pub fn strict() -> Self {
        Self {
            unknown_codes: UnknownCodes::Reject,
            ..Self::default()
        }
    }

    /// Returns a copy using the given byte order
    #[must_use]
    pub fn with_endian(self, endian: Endian) -> Self {
        Self { endian, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert_eq!(WalkerConfig::legacy(), WalkerConfig::default());
        assert_eq!(WalkerConfig::default().unknown_codes, UnknownCodes::Ignore);
        assert_eq!(WalkerConfig::strict().unknown_codes, UnknownCodes::Reject);
        assert!(WalkerConfig::strict().read_ahead);

        let little = WalkerConfig::strict().with_endian(Endian::Little);
        assert_eq!(little.endian, Endian::Little);
        assert_eq!(little.unknown_codes, UnknownCodes::Reject);
    }
}
