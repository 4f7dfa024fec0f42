//! This crate parses ISO base media (mp4) files into an in-memory box tree and
//! remuxes a single AVC video track into an FLV tagged stream.
//!
//! The parser is resilience-favored: unknown boxes are captured as opaque
//! blobs (or, past a size threshold, recorded by file offset only), truncated
//! or undersized boxes end only the level they appear on, and already-parsed
//! siblings stay usable.
//!
//! # Quick start
//!
//! ```no_run
//! use remux_mp4::FlvRemuxer;
//! use std::fs::File;
//!
//! fn main() -> remux_mp4::Result<()> {
//!     let src = File::open("video.mp4")?;
//!     let dst = File::create("video.flv")?;
//!     let stats = FlvRemuxer::new().remux(src, dst)?;
//!     println!("{} samples written", stats.samples);
//!     Ok(())
//! }
//! ```

mod error;
mod extract;
mod parser;
mod reader;
mod remux;
mod track;

pub mod avc;
pub mod boxes;
pub mod flv;

pub use error::Error;
pub use extract::{Sample, SampleIter, ticks_to_millis};
pub use parser::{BoxData, BoxHeader, BoxTree, FourCC, Mp4Box, Registry, tags};
pub use reader::Reader;
pub use remux::{FlvRemuxer, RemuxStats};
pub use track::{SampleTables, Track};

/// A `Result` alias where the `Err` case is `remux_mp4::Error`.
pub type Result<T> = std::result::Result<T, Error>;
