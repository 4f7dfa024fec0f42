use crate::{Reader, Result};
use std::io::{Read, Seek};

/// Sample-to-chunk box: runs of chunks holding the same number of samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StscBox {
    pub entries: Vec<StscEntry>,
}

/// One run, 1-based as on disk: every chunk from `first_chunk` up to the
/// next run's first chunk holds `samples_per_chunk` samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StscEntry {
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
    pub description_index: u32,
}

impl StscBox {
    pub fn parse<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self> {
        let entry_count = reader.read_u32()?;
        let entry_count = u64::from(entry_count).min(reader.remaining() / 12);

        let mut entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            entries.push(StscEntry {
                first_chunk: reader.read_u32()?,
                samples_per_chunk: reader.read_u32()?,
                description_index: reader.read_u32()?,
            });
        }

        Ok(Self { entries })
    }

    /// 0-based index of the chunk holding sample `index`.
    ///
    /// Walks the runs accumulating how many samples precede each one; past
    /// the described range the mapping extrapolates with the final run's
    /// samples-per-chunk. Runs claiming zero samples per chunk are treated
    /// as holding one to keep the walk moving.
    pub fn sample_to_chunk(&self, index: u32) -> u32 {
        let index = u64::from(index);
        let mut samples_before = 0u64;
        let mut chunk = 1u32;
        let mut prev_first = 1u32;
        let mut prev_spc = 1u64;

        for e in &self.entries {
            let spc = u64::from(e.samples_per_chunk.max(1));
            samples_before += u64::from(e.first_chunk.saturating_sub(prev_first)) * prev_spc;
            if index < samples_before {
                break;
            }
            chunk = e.first_chunk + ((index - samples_before) / spc) as u32;
            prev_first = e.first_chunk;
            prev_spc = spc;
        }

        chunk - 1
    }
}
