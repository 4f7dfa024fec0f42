use crate::{
    Reader, Result, avc,
    extract::{SampleIter, ticks_to_millis},
    flv::FlvWriter,
    parser::BoxTree,
    track::Track,
};
use std::io::{Read, Seek, Write};

/// Summary of a completed conversion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RemuxStats {
    /// Video tags written, not counting the sequence header.
    pub samples: u32,
    /// Samples whose access unit carried an IDR slice.
    pub keyframes: u32,
    /// Decode timestamp of the last written sample, in milliseconds.
    pub duration_ms: u64,
    /// Total FLV bytes emitted.
    pub bytes_written: u64,
}

/// One-pass remuxer for a single AVC video track.
///
/// Parses the box forest eagerly, then walks the track's samples in index
/// order, reading each one at its resolved file offset and emitting an FLV
/// video tag for it. The source is assumed exclusively owned for the
/// duration of the conversion; any read or write failure aborts immediately.
///
/// # Example
///
/// ```no_run
/// use remux_mp4::FlvRemuxer;
/// use std::fs::File;
///
/// let stats = FlvRemuxer::new()
///     .track(0)
///     .remux(File::open("in.mp4")?, File::create("out.flv")?)?;
/// # Ok::<(), remux_mp4::Error>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct FlvRemuxer {
    track: Option<usize>,
}

impl FlvRemuxer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts the `index`-th trak box instead of the first one.
    pub fn track(mut self, index: usize) -> Self {
        self.track = Some(index);
        self
    }

    /// Parses `src` and writes the converted stream to `dst`.
    pub fn remux<R: Read + Seek, W: Write>(&self, src: R, dst: W) -> Result<RemuxStats> {
        let mut reader = Reader::new(src)?;
        let tree = BoxTree::parse(&mut reader)?;
        self.remux_parsed(&tree, &mut reader, dst)
    }

    /// Converts using an already-parsed forest, re-using `reader` for the
    /// sample reads.
    pub fn remux_parsed<R: Read + Seek, W: Write>(
        &self,
        tree: &BoxTree,
        reader: &mut Reader<R>,
        dst: W,
    ) -> Result<RemuxStats> {
        let track = match self.track {
            Some(index) => Track::nth(tree, index)?,
            None => Track::first(tree)?,
        };
        let timescale = track.timescale()?;
        let tables = track.sample_tables()?;
        let config = tables.avc_config()?;

        let mut flv = FlvWriter::new(dst);
        flv.write_header()?;
        flv.write_avc_sequence_header(config)?;

        let mut stats = RemuxStats::default();
        for sample in SampleIter::new(&tables) {
            let sample = sample?;

            reader.seek_to(sample.offset)?;
            let data = reader.read_bytes(sample.size as usize)?;

            let keyframe = avc::contains_idr(&data);
            let timestamp = ticks_to_millis(sample.decode_time, timescale);
            let composition_ms = i64::from(sample.composition_offset) * 1000
                / i64::from(timescale.max(1));

            flv.write_avc_frame(timestamp as u32, composition_ms as i32, keyframe, &data)?;

            stats.samples += 1;
            if keyframe {
                stats.keyframes += 1;
            }
            stats.duration_ms = timestamp;
        }

        stats.bytes_written = flv.bytes_written();
        Ok(stats)
    }
}
