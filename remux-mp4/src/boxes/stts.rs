use crate::{Reader, Result};
use std::io::{Read, Seek};

/// Decoding time-to-sample box: runs of equally spaced samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SttsBox {
    pub entries: Vec<SttsEntry>,
}

/// One run: `sample_count` consecutive samples, `sample_delta` media ticks
/// apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SttsEntry {
    pub sample_count: u32,
    pub sample_delta: u32,
}

impl SttsBox {
    pub fn parse<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self> {
        let entry_count = reader.read_u32()?;
        // A declared count running past the payload keeps whatever fits.
        let entry_count = u64::from(entry_count).min(reader.remaining() / 8);

        let mut entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            entries.push(SttsEntry {
                sample_count: reader.read_u32()?,
                sample_delta: reader.read_u32()?,
            });
        }

        Ok(Self { entries })
    }

    /// Decode timestamp of sample `index`, in media ticks.
    ///
    /// Indexes past the described range return the accumulated duration of
    /// every run, i.e. the one-past-end timestamp.
    pub fn sample_to_time(&self, index: u32) -> u64 {
        let mut remaining = u64::from(index);
        let mut time = 0u64;

        for e in &self.entries {
            if remaining < u64::from(e.sample_count) {
                return time + remaining * u64::from(e.sample_delta);
            }
            remaining -= u64::from(e.sample_count);
            time += u64::from(e.sample_count) * u64::from(e.sample_delta);
        }

        time
    }
}
