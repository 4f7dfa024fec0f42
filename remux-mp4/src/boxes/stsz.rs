use crate::{Reader, Result};
use std::io::{Read, Seek};

/// Sample size box. A nonzero default size means every sample shares it and
/// no per-sample array is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StszBox {
    pub default_size: u32,
    pub sample_count: u32,
    /// Per-sample sizes; empty when `default_size` is nonzero.
    pub sizes: Vec<u32>,
}

impl StszBox {
    pub fn parse<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self> {
        let default_size = reader.read_u32()?;
        let sample_count = reader.read_u32()?;

        let mut sizes = Vec::new();
        if default_size == 0 {
            let stored = u64::from(sample_count).min(reader.remaining() / 4);
            sizes.reserve(stored as usize);
            for _ in 0..stored {
                sizes.push(reader.read_u32()?);
            }
        }

        Ok(Self {
            default_size,
            sample_count,
            sizes,
        })
    }

    /// Size in bytes of sample `index`; zero when the array does not cover
    /// the index.
    pub fn size_of(&self, index: u32) -> u32 {
        if self.default_size != 0 {
            return self.default_size;
        }
        self.sizes.get(index as usize).copied().unwrap_or(0)
    }
}
