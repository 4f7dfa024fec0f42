//! Typed decoders for the box records the remuxer understands.
//!
//! Each decoder is a plain transform over a captured payload slice; the
//! parser has already consumed the box header (and, for full boxes, the
//! version and flags) before any of these run.

mod ctts;
mod ftyp;
mod hdlr;
mod mdhd;
mod mvhd;
mod stco;
mod stsc;
mod stsd;
mod stss;
mod stsz;
mod stts;
mod tkhd;

pub use ctts::{CttsBox, CttsEntry};
pub use ftyp::FtypBox;
pub use hdlr::HdlrBox;
pub use mdhd::MdhdBox;
pub use mvhd::MvhdBox;
pub use stco::StcoBox;
pub use stsc::{StscBox, StscEntry};
pub use stsd::{SampleEntry, StsdBox};
pub use stss::StssBox;
pub use stsz::StszBox;
pub use stts::{SttsBox, SttsEntry};
pub use tkhd::TkhdBox;
