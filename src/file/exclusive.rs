use std::{
    borrow::Cow,
    fs,
    io::{Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use super::{check_range, Backend, Client};
use crate::Result;

/// A file resource that positions the handle before every read.
///
/// Nothing is cached between reads, so any number of cursors can share the handle without
/// tracking who moved it last. Sub-byte phase lives entirely in the cursor's bit offset.
#[derive(Debug)]
pub struct Exclusive {
    file: fs::File,
    path: PathBuf,
    size: usize,
}

impl Exclusive {
    /// Opens the file at `path` for reading.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or its size queried.
    pub fn open(path: impl AsRef<Path>) -> Result<Exclusive> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path)?;
        let size = usize::try_from(file.metadata()?.len())
            .map_err(|_| crate::Error::Error(format!("{} is too large", path.display())))?;

        log::debug!("opened {} exclusively ({} bytes)", path.display(), size);
        Ok(Exclusive { file, path, size })
    }

    /// Path the resource was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for Exclusive {
    fn name(&self) -> &'static str {
        "exclusive"
    }

    fn len(&self) -> usize {
        self.size
    }

    fn fetch(&self, _client: &mut Client, offset: usize, len: usize) -> Result<Cow<'_, [u8]>> {
        check_range(offset, len, self.size)?;

        let mut buffer = vec![0u8; len];
        if len > 0 {
            let mut handle = &self.file;
            handle.seek(SeekFrom::Start(offset as u64))?;
            handle.read_exact(&mut buffer)?;
        }
        Ok(Cow::Owned(buffer))
    }
}

impl Drop for Exclusive {
    fn drop(&mut self) {
        log::debug!("closing {}", self.path.display());
    }
}
