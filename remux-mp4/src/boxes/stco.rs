use crate::{Reader, Result};
use std::io::{Read, Seek};

/// Chunk offset box: absolute file offset of every chunk, fixed stride.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StcoBox {
    offsets: Vec<u32>,
}

impl StcoBox {
    pub fn parse<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self> {
        let entry_count = reader.read_u32()?;
        let entry_count = u64::from(entry_count).min(reader.remaining() / 4);

        let mut offsets = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            offsets.push(reader.read_u32()?);
        }

        Ok(Self { offsets })
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Absolute file offset of 0-based chunk `index`.
    pub fn offset(&self, index: u32) -> Option<u64> {
        self.offsets.get(index as usize).map(|&o| u64::from(o))
    }
}
