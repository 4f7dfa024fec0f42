use crate::{Reader, Result};
use std::io::{Read, Seek};

/// Composition time-to-sample box: runs of samples sharing one offset
/// between decode order and presentation order.
///
/// The box is optional; an absent table means a zero offset for every
/// sample, which callers handle by not having a `CttsBox` at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CttsBox {
    pub entries: Vec<CttsEntry>,
}

/// One run: `sample_count` consecutive samples, each presented `offset`
/// media ticks after its decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CttsEntry {
    pub sample_count: u32,
    pub offset: i32,
}

impl CttsBox {
    pub fn parse<R: Read + Seek>(reader: &mut Reader<R>, _version: u8) -> Result<Self> {
        let entry_count = reader.read_u32()?;
        let entry_count = u64::from(entry_count).min(reader.remaining() / 8);

        let mut entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            entries.push(CttsEntry {
                sample_count: reader.read_u32()?,
                // Version 0 stores the offset unsigned, version 1 signed;
                // reading through i32 keeps the bits either way.
                offset: reader.read_i32()?,
            });
        }

        Ok(Self { entries })
    }

    /// Composition offset of sample `index`, in media ticks.
    ///
    /// Indexes past the described range keep the final run's offset.
    pub fn sample_to_offset(&self, index: u32) -> i32 {
        let index = u64::from(index);
        let mut seen = 0u64;
        let mut offset = 0i32;

        for e in &self.entries {
            offset = e.offset;
            seen += u64::from(e.sample_count);
            if index < seen {
                break;
            }
        }

        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(runs: &[(u32, i32)]) -> CttsBox {
        CttsBox {
            entries: runs
                .iter()
                .map(|&(sample_count, offset)| CttsEntry {
                    sample_count,
                    offset,
                })
                .collect(),
        }
    }

    #[test]
    fn offsets_follow_their_run() {
        let ctts = table(&[(2, 100), (3, 0), (1, -50)]);
        assert_eq!(ctts.sample_to_offset(0), 100);
        assert_eq!(ctts.sample_to_offset(1), 100);
        assert_eq!(ctts.sample_to_offset(2), 0);
        assert_eq!(ctts.sample_to_offset(4), 0);
        assert_eq!(ctts.sample_to_offset(5), -50);
    }

    #[test]
    fn indexes_past_the_table_keep_the_final_offset() {
        let ctts = table(&[(2, 100), (1, 42)]);
        assert_eq!(ctts.sample_to_offset(3), 42);
        assert_eq!(ctts.sample_to_offset(1000), 42);
    }

    #[test]
    fn empty_table_yields_zero() {
        assert_eq!(table(&[]).sample_to_offset(0), 0);
    }
}
