//! Memory-mapped file resource.
//!
//! [`crate::file::Physical`] maps a font file into the address space and serves reads straight
//! out of the mapping, the same way [`crate::file::Memory`] serves them out of a buffer. Pages
//! are loaded on demand, so large font collections can be walked without reading them whole.

use std::{borrow::Cow, fs, path::Path};

use memmap2::Mmap;

use super::{check_range, Backend, Client};
use crate::{
    Error::{Error, FileError},
    Result,
};

/// A resource that reads from a read-only memory mapping of a file.
#[derive(Debug)]
pub struct Physical {
    /// Memory-mapped file data
    data: Mmap,
}

impl Physical {
    /// Maps the file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// [`crate::Error::Error`] if memory mapping fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = match fs::File::open(path.as_ref()) {
            Ok(file) => file,
            Err(error) => return Err(FileError(error)),
        };

        let physical = Self::from_std_file(file)?;
        log::debug!(
            "mapped {} ({} bytes)",
            path.as_ref().display(),
            physical.data.len()
        );
        Ok(physical)
    }

    /// Maps an already opened file.
    ///
    /// # Errors
    /// Returns [`crate::Error::Error`] if memory mapping fails.
    #[allow(clippy::needless_pass_by_value)]
    pub fn from_std_file(file: fs::File) -> Result<Physical> {
        // The mapping stays valid after `file` is closed.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|error| Error(error.to_string()))?;

        Ok(Physical { data: mmap })
    }

    /// The whole mapped file.
    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }
}

impl Backend for Physical {
    fn name(&self) -> &'static str {
        "mapped"
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn fetch(&self, _client: &mut Client, offset: usize, len: usize) -> Result<Cow<'_, [u8]>> {
        let end = check_range(offset, len, self.data.len())?;
        Ok(Cow::Borrowed(&self.data[offset..end]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn physical() {
        let temp_path = std::env::temp_dir().join("fontwalk_physical_test.bin");
        std::fs::write(&temp_path, [0x00, 0x01, 0x00, 0x00, 0x00, 0x0C]).unwrap();

        let physical = Physical::new(&temp_path).unwrap();
        let mut client = physical.client();
        assert_eq!(physical.len(), 6);
        assert_eq!(physical.data()[1], 0x01);
        assert_eq!(
            physical.fetch(&mut client, 4, 2).unwrap().as_ref(),
            &[0x00, 0x0C]
        );
        assert!(matches!(
            physical.fetch(&mut client, 5, 2),
            Err(crate::Error::OutOfBounds { .. })
        ));

        std::fs::remove_file(&temp_path).unwrap();
    }

    #[test]
    fn test_physical_invalid_file_path() {
        let result = Physical::new(PathBuf::from("/nonexistent/path/to/font.ttf"));
        match result.unwrap_err() {
            FileError(io_error) => {
                assert_eq!(io_error.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected FileError"),
        }
    }

    #[test]
    fn test_physical_empty_file() {
        let temp_path = std::env::temp_dir().join("fontwalk_empty_mapped.bin");
        std::fs::write(&temp_path, b"").unwrap();

        let physical = Physical::new(&temp_path).unwrap();
        let mut client = physical.client();
        assert!(physical.is_empty());
        assert!(physical.fetch(&mut client, 0, 1).is_err());
        assert!(physical.fetch(&mut client, 0, 0).unwrap().is_empty());

        std::fs::remove_file(&temp_path).unwrap();
    }
}
