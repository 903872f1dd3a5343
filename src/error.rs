use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    ($offset:expr, $requested:expr, $limit:expr) => {
        crate::Error::OutOfBounds {
            offset: $offset,
            requested: $requested,
            limit: $limit,
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure is a synchronous return value. Nothing is retried internally and no operation
/// hands back a plausible-looking value after something went wrong.
///
/// # Error Categories
///
/// ## Range Errors
/// - [`Error::OutOfBounds`] - A read would cross the cursor limit or the end of the resource
/// - [`Error::InvalidOffset`] - A seek, branch or alignment resolved outside the permitted window
/// - [`Error::LeftoverBits`] - A strict remainder read found a partial repetition
///
/// ## Malformed Input
/// - [`Error::Malformed`] - Bad arguments, rejected format codes, pack mismatches
///
/// ## I/O and Resource Errors
/// - [`Error::FileError`] - Open, seek and read failures from the file backends
/// - [`Error::Error`] - Resource acquisition failures such as a failed mapping
///
/// Use [`Error::kind`] to branch on the category without matching every variant.
///
/// # Examples
///
/// ```rust
/// use fontwalk::{ErrorKind, Walker};
///
/// let mut walker = Walker::from_bytes(vec![0x00, 0x01]);
/// match walker.read_u32() {
///     Ok(value) => println!("value: {}", value),
///     Err(e) if e.kind() == ErrorKind::Range => println!("table too short: {}", e),
///     Err(e) => println!("other failure: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A read would extend past the cursor's limit or the end of the backing resource.
    ///
    /// All positions are expressed in bits.
    ///
    /// # Fields
    ///
    /// * `offset` - The bit position where the read would start
    /// * `requested` - The number of bits requested
    /// * `limit` - The exclusive bit limit that would have been crossed
    #[error("Out of bound read: {requested} bits at bit {offset} crosses limit {limit}")]
    OutOfBounds {
        /// Starting bit position of the rejected read
        offset: usize,
        /// Number of bits the read asked for
        requested: usize,
        /// Exclusive upper bound that would have been crossed
        limit: usize,
    },

    /// A positioning request resolved outside the cursor's window.
    ///
    /// Raised by seeks, branches and alignment. The cursor position is left unchanged.
    #[error("Offset {target} is outside the window ending at {limit}")]
    InvalidOffset {
        /// The resolved bit position (may be negative before resolution)
        target: i128,
        /// The exclusive bit limit of the window
        limit: usize,
    },

    /// A strict remainder read found bits that do not form a whole repetition.
    #[error("Leftover bits: {remaining} remaining bits are not a multiple of {group}")]
    LeftoverBits {
        /// Bits remaining before the limit
        remaining: usize,
        /// Bit size of one repetition of the format
        group: usize,
    },

    /// The input or the arguments could not be interpreted.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// File I/O error.
    ///
    /// Wraps standard I/O errors from opening, seeking or reading a file resource.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for resource failures.
    #[error("{0}")]
    Error(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Reads, seeks or alignment outside the permitted window
    Range,
    /// Failures reported by the operating system
    Io,
    /// Format strings, arguments or values that cannot be interpreted
    Malformed,
    /// Resources that could not be acquired
    Resource,
}

impl Error {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::OutOfBounds { .. } | Error::InvalidOffset { .. } | Error::LeftoverBits { .. } => {
                ErrorKind::Range
            }
            Error::Malformed { .. } => ErrorKind::Malformed,
            Error::FileError(_) => ErrorKind::Io,
            Error::Error(_) => ErrorKind::Resource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(out_of_bounds_error!(0, 8, 4).kind(), ErrorKind::Range);
        assert_eq!(
            Error::InvalidOffset {
                target: -8,
                limit: 64
            }
            .kind(),
            ErrorKind::Range
        );
        assert_eq!(
            Error::LeftoverBits {
                remaining: 12,
                group: 8
            }
            .kind(),
            ErrorKind::Range
        );
        assert_eq!(malformed_error!("bad code").kind(), ErrorKind::Malformed);
        assert_eq!(
            Error::from(std::io::Error::from(std::io::ErrorKind::NotFound)).kind(),
            ErrorKind::Io
        );
        assert_eq!(Error::Error("mmap".into()).kind(), ErrorKind::Resource);
    }

    #[test]
    fn malformed_carries_location() {
        let err = malformed_error!("code {} rejected", 'P');
        match err {
            Error::Malformed {
                message,
                file,
                line,
            } => {
                assert_eq!(message, "code P rejected");
                assert!(file.ends_with("error.rs"));
                assert!(line > 0);
            }
            _ => panic!("Expected Malformed"),
        }
    }

    #[test]
    fn display() {
        let err = out_of_bounds_error!(12, 16, 24);
        assert_eq!(
            err.to_string(),
            "Out of bound read: 16 bits at bit 12 crosses limit 24"
        );
    }
}
