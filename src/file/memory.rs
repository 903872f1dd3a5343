use std::borrow::Cow;

use super::{check_range, Backend, Client};
use crate::Result;

/// Resource backed by an owned byte buffer
#[derive(Debug)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Create a new memory backend
    ///
    /// ## Arguments
    /// * 'data' - The data buffer to consume
    pub fn new(data: Vec<u8>) -> Memory {
        Memory { data }
    }

    /// The whole buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Backend for Memory {
    fn name(&self) -> &'static str {
        "memory"
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
    use crate::Error;

    #[test]
    fn memory() {
        let mut data = vec![0xCC_u8; 1048];
        data[10] = 0xBB;
        data[11] = 0xBB;
        data[12] = 0xBB;

        let memory = Memory::new(data);
        let mut client = memory.client();

        assert_eq!(memory.len(), 1048);
        assert_eq!(memory.bit_len(), 1048 * 8);
        assert_eq!(memory.data()[42], 0xCC);
        assert_eq!(
            memory.fetch(&mut client, 10, 3).unwrap().as_ref(),
            &[0xBB, 0xBB, 0xBB]
        );

        assert!(memory.fetch(&mut client, 0, 2048).is_err());
        assert!(matches!(
            memory.fetch(&mut client, usize::MAX, 1),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_memory_empty_buffer() {
        let memory = Memory::new(vec![]);
        let mut client = memory.client();

        assert!(memory.is_empty());
        assert!(memory.fetch(&mut client, 0, 1).is_err());
        assert!(memory.fetch(&mut client, 1, 0).is_err());
        assert!(memory.fetch(&mut client, 0, 0).unwrap().is_empty());
    }
}
