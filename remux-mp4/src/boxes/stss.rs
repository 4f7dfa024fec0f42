use crate::{Reader, Result};
use std::io::{Read, Seek};

/// Sync sample box: 1-based numbers of the samples that are random access
/// points. An absent box means every sample is one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StssBox {
    pub samples: Vec<u32>,
}

impl StssBox {
    pub fn parse<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self> {
        let entry_count = reader.read_u32()?;
        let entry_count = u64::from(entry_count).min(reader.remaining() / 4);

        let mut samples = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            samples.push(reader.read_u32()?);
        }

        Ok(Self { samples })
    }

    /// Whether 0-based sample `index` is listed as a sync sample.
    pub fn is_sync(&self, index: u32) -> bool {
        self.samples.contains(&(index + 1))
    }
}
