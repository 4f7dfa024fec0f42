use crate::{Error, Result, track::SampleTables};

/// Resolved location and timing of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// 0-based sample index.
    pub index: u32,
    /// 0-based chunk the sample lives in.
    pub chunk: u32,
    /// Absolute file offset of the sample's first byte.
    pub offset: u64,
    /// Sample length in bytes.
    pub size: u32,
    /// Decode timestamp in media ticks.
    pub decode_time: u64,
    /// Composition offset in media ticks; zero when no ctts table exists.
    pub composition_offset: i32,
}

/// Resolves samples in ascending index order.
///
/// The byte offset inside the current chunk accumulates the sizes of the
/// samples already visited and resets whenever the chunk changes, so the
/// iterator is only valid front to back; it is not a random-access lookup.
pub struct SampleIter<'a> {
    tables: &'a SampleTables<'a>,
    index: u32,
    count: u32,
    last_chunk: Option<u32>,
    chunk_pos: u64,
}

impl<'a> SampleIter<'a> {
    pub fn new(tables: &'a SampleTables<'a>) -> Self {
        Self {
            tables,
            index: 0,
            count: tables.sample_count(),
            last_chunk: None,
            chunk_pos: 0,
        }
    }
}

impl Iterator for SampleIter<'_> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let index = self.index;
        self.index += 1;

        let chunk = self.tables.stsc.sample_to_chunk(index);
        if self.last_chunk != Some(chunk) {
            self.last_chunk = Some(chunk);
            self.chunk_pos = 0;
        }

        let base = match self.tables.stco.offset(chunk) {
            Some(base) => base,
            None => {
                return Some(Err(Error::ChunkOutOfRange {
                    chunk,
                    count: self.tables.stco.len() as u32,
                }));
            }
        };

        let size = self.tables.stsz.size_of(index);
        let offset = base + self.chunk_pos;
        self.chunk_pos += u64::from(size);

        Some(Ok(Sample {
            index,
            chunk,
            offset,
            size,
            decode_time: self.tables.stts.sample_to_time(index),
            composition_offset: self
                .tables
                .ctts
                .map_or(0, |ctts| ctts.sample_to_offset(index)),
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.count - self.index) as usize;
        (left, Some(left))
    }
}

/// Converts media ticks to milliseconds, flooring. A zero time scale is
/// treated as one tick per second rather than dividing by zero.
pub fn ticks_to_millis(ticks: u64, timescale: u32) -> u64 {
    ticks * 1000 / u64::from(timescale.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxes::{StcoBox, StscBox, StsdBox, StszBox, SttsBox};
    use crate::{Reader, track::SampleTables};

    fn stco(offsets: &[u32]) -> StcoBox {
        let mut payload = (offsets.len() as u32).to_be_bytes().to_vec();
        for o in offsets {
            payload.extend_from_slice(&o.to_be_bytes());
        }
        StcoBox::parse(&mut Reader::from_slice(&payload)).unwrap()
    }

    fn stsc(runs: &[(u32, u32)]) -> StscBox {
        StscBox {
            entries: runs
                .iter()
                .map(|&(first_chunk, samples_per_chunk)| crate::boxes::StscEntry {
                    first_chunk,
                    samples_per_chunk,
                    description_index: 1,
                })
                .collect(),
        }
    }

    fn stts(runs: &[(u32, u32)]) -> SttsBox {
        SttsBox {
            entries: runs
                .iter()
                .map(|&(sample_count, sample_delta)| crate::boxes::SttsEntry {
                    sample_count,
                    sample_delta,
                })
                .collect(),
        }
    }

    #[test]
    fn offsets_accumulate_within_a_chunk_and_reset_across_chunks() {
        let stsd = StsdBox::default();
        let stsz = StszBox {
            default_size: 0,
            sample_count: 4,
            sizes: vec![100, 150, 80, 60],
        };
        let stsc = stsc(&[(1, 2)]);
        let stco = stco(&[1000, 5000]);
        let stts = stts(&[(4, 500)]);
        let tables = SampleTables {
            stsd: &stsd,
            stsz: &stsz,
            stsc: &stsc,
            stco: &stco,
            stts: &stts,
            ctts: None,
            stss: None,
        };

        let samples: Vec<Sample> = SampleIter::new(&tables).map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].offset, 1000);
        assert_eq!(samples[1].offset, 1100);
        assert_eq!(samples[2].offset, 5000);
        assert_eq!(samples[3].offset, 5080);
        assert_eq!(samples[3].decode_time, 1500);
        assert!(samples.iter().all(|s| s.composition_offset == 0));
    }

    #[test]
    fn chunk_without_a_recorded_offset_is_an_error() {
        let stsd = StsdBox::default();
        let stsz = StszBox {
            default_size: 10,
            sample_count: 4,
            sizes: Vec::new(),
        };
        let stsc = stsc(&[(1, 1)]);
        let stco = stco(&[1000]);
        let stts = stts(&[(4, 1)]);
        let tables = SampleTables {
            stsd: &stsd,
            stsz: &stsz,
            stsc: &stsc,
            stco: &stco,
            stts: &stts,
            ctts: None,
            stss: None,
        };

        let results: Vec<Result<Sample>> = SampleIter::new(&tables).collect();
        assert!(results[0].is_ok());
        assert!(matches!(
            &results[1],
            Err(Error::ChunkOutOfRange { chunk: 1, count: 1 })
        ));
    }

    #[test]
    fn tick_conversion_floors() {
        assert_eq!(ticks_to_millis(0, 90000), 0);
        assert_eq!(ticks_to_millis(90000, 90000), 1000);
        assert_eq!(ticks_to_millis(1, 3), 333);
        assert_eq!(ticks_to_millis(5, 0), 5000);
    }
}
