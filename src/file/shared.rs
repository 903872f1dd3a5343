//! File resource shared by many cursors through one handle.
//!
//! All cursors branched from a shared-file cursor read through the same `fs::File`, so the
//! operating system file position is a single piece of state they all move. [`Shared`] remembers
//! which client last positioned the handle and where it left it; a fetch from any other client,
//! or from an unexpected position, seeks first.
//!
//! # Read-Ahead
//!
//! The last byte of every fetch is kept in the fetching client. A read that ended mid-byte
//! leaves the cursor inside that byte, and the next read starts by reusing it instead of
//! seeking back one byte. Any position change that does not come from a read must go through
//! [`crate::file::Backend::invalidate`], which drops the kept byte and forces the next fetch to
//! reposition the handle.
//!
//! # Thread Safety
//!
//! The last-client record uses `Cell` and is not synchronised. `Shared` is not `Sync`; cursors
//! that share it must be used from one thread.

use std::{
    borrow::Cow,
    cell::Cell,
    fs,
    io::{Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use super::{check_range, Backend, Client};
use crate::Result;

/// A file resource with one handle shared by every cursor over it.
#[derive(Debug)]
pub struct Shared {
    file: fs::File,
    path: PathBuf,
    size: usize,
    /// Client that last positioned the handle, `None` when the position is unknown
    last_client: Cell<Option<u64>>,
    /// Byte position of the handle after the last fetch
    position: Cell<usize>,
    next_client: Cell<u64>,
    seeks: Cell<u64>,
}

impl Shared {
    /// Opens the file at `path` for reading.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or its size queried.
    pub fn open(path: impl AsRef<Path>) -> Result<Shared> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path)?;
        let size = usize::try_from(file.metadata()?.len())
            .map_err(|_| crate::Error::Error(format!("{} is too large", path.display())))?;

        log::debug!("opened {} shared ({} bytes)", path.display(), size);
        Ok(Shared {
            file,
            path,
            size,
            last_client: Cell::new(None),
            position: Cell::new(0),
            next_client: Cell::new(1),
            seeks: Cell::new(0),
        })
    }

    /// Path the resource was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of times the handle has been repositioned.
    pub fn seek_count(&self) -> u64 {
        self.seeks.get()
    }

    /// Id of the client that last positioned the handle, if the position is known.
    pub fn last_client(&self) -> Option<u64> {
        self.last_client.get()
    }
}

impl Backend for Shared {
    fn name(&self) -> &'static str {
        "shared"
    }

    fn len(&self) -> usize {
        self.size
    }

    fn client(&self) -> Client {
        let id = self.next_client.get();
        self.next_client.set(id + 1);
        Client::new(id)
    }

    fn fetch(&self, client: &mut Client, offset: usize, len: usize) -> Result<Cow<'_, [u8]>> {
        let end = check_range(offset, len, self.size)?;
        if len == 0 {
            return Ok(Cow::Owned(Vec::new()));
        }

        let mut buffer = vec![0u8; len];
        let mut start = offset;
        if let Some(byte) = client.take_byte(offset) {
            buffer[0] = byte;
            start += 1;
        }

        if start < end {
            let mut handle = &self.file;
            if self.last_client.get() != Some(client.id()) || self.position.get() != start {
                log::trace!(
                    "client {} repositions {} to byte {} (last client {:?})",
                    client.id(),
                    self.path.display(),
                    start,
                    self.last_client.get()
                );
                self.last_client.set(None);
                handle.seek(SeekFrom::Start(start as u64))?;
                self.seeks.set(self.seeks.get() + 1);
            }

            // Unknown until the read succeeds.
            self.last_client.set(None);
            handle.read_exact(&mut buffer[start - offset..])?;
            self.position.set(end);
            self.last_client.set(Some(client.id()));
        }

        client.keep_byte(end - 1, buffer[len - 1]);
        Ok(Cow::Owned(buffer))
    }

    fn invalidate(&self, client: &mut Client) {
        client.forget();
        if self.last_client.get() == Some(client.id()) {
            self.last_client.set(None);
        }
    }

    fn release(&self, client: &Client) {
        if self.last_client.get() == Some(client.id()) {
            self.last_client.set(None);
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        log::debug!(
            "closing {} after {} seeks",
            self.path.display(),
            self.seeks.get()
        );
    }
}
