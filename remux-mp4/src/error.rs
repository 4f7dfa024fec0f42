//! Error types for box parsing and FLV remuxing.

use crate::parser::FourCC;
use thiserror::Error;

/// Errors that can occur while parsing an mp4 file or writing an FLV stream.
///
/// Structural damage inside the box forest (truncated headers, size fields
/// smaller than a header) is not reported here; the parser ends the affected
/// level early and keeps the siblings parsed so far. A full-box version the
/// decoders do not understand yields a zeroed view instead of an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or seeking the source, or writing the sink, failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The parsed forest contains no trak box at all.
    #[error("no trak box found in file")]
    NoTrack,

    /// The requested track index does not exist.
    #[error("track {0} not found, file has {1} tracks")]
    TrackNotFound(usize, usize),

    /// The selected track lacks a box the conversion cannot run without.
    #[error("selected track is missing a required {0} box")]
    MissingBox(FourCC),

    /// The sample description carries no AVC decoder configuration record.
    #[error("no avcC configuration record found in the sample description")]
    MissingCodecConfig,

    /// A sample resolved to a chunk with no recorded file offset.
    #[error("chunk {chunk} is beyond the {count} entries of the chunk offset table")]
    ChunkOutOfRange { chunk: u32, count: u32 },
}
