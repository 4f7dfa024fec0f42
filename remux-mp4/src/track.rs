use crate::{
    Error, Result,
    boxes::{CttsBox, HdlrBox, MdhdBox, StcoBox, StscBox, StsdBox, StssBox, StszBox, SttsBox, TkhdBox},
    parser::{BoxData, BoxTree, FourCC, Mp4Box, tags},
};

macro_rules! typed_box {
    ($trak:expr, $tag:expr, $variant:ident) => {
        match $trak.find_first($tag).map(|b| &b.data) {
            Some(BoxData::$variant(b)) => Some(b),
            _ => None,
        }
    };
}

/// View over one trak subtree. Nothing is materialized; every accessor
/// re-queries the tree.
pub struct Track<'a> {
    trak: &'a Mp4Box,
}

impl<'a> Track<'a> {
    /// First track in file order.
    pub fn first(tree: &'a BoxTree) -> Result<Self> {
        tree.find_first(tags::TRAK)
            .map(|trak| Self { trak })
            .ok_or(Error::NoTrack)
    }

    /// `index`-th track in file order.
    pub fn nth(tree: &'a BoxTree, index: usize) -> Result<Self> {
        let traks = tree.find_all(tags::TRAK);
        if traks.is_empty() {
            return Err(Error::NoTrack);
        }
        traks
            .get(index)
            .copied()
            .map(|trak| Self { trak })
            .ok_or(Error::TrackNotFound(index, traks.len()))
    }

    pub fn tkhd(&self) -> Option<&'a TkhdBox> {
        typed_box!(self.trak, tags::TKHD, Tkhd)
    }

    pub fn mdhd(&self) -> Option<&'a MdhdBox> {
        typed_box!(self.trak, tags::MDHD, Mdhd)
    }

    pub fn hdlr(&self) -> Option<&'a HdlrBox> {
        typed_box!(self.trak, tags::HDLR, Hdlr)
    }

    /// Handler type of the track's media, e.g. `vide`.
    pub fn handler_type(&self) -> Option<FourCC> {
        self.hdlr().map(|h| h.handler_type)
    }

    /// Media time scale the track's sample timestamps are expressed in.
    pub fn timescale(&self) -> Result<u32> {
        self.mdhd()
            .map(|m| m.timescale)
            .ok_or(Error::MissingBox(tags::MDHD))
    }

    /// Gathers the sample tables the conversion needs. stsd, stsz, stsc,
    /// stco and stts are required; ctts and stss are optional.
    pub fn sample_tables(&self) -> Result<SampleTables<'a>> {
        Ok(SampleTables {
            stsd: typed_box!(self.trak, tags::STSD, Stsd).ok_or(Error::MissingBox(tags::STSD))?,
            stsz: typed_box!(self.trak, tags::STSZ, Stsz).ok_or(Error::MissingBox(tags::STSZ))?,
            stsc: typed_box!(self.trak, tags::STSC, Stsc).ok_or(Error::MissingBox(tags::STSC))?,
            stco: typed_box!(self.trak, tags::STCO, Stco).ok_or(Error::MissingBox(tags::STCO))?,
            stts: typed_box!(self.trak, tags::STTS, Stts).ok_or(Error::MissingBox(tags::STTS))?,
            ctts: typed_box!(self.trak, tags::CTTS, Ctts),
            stss: typed_box!(self.trak, tags::STSS, Stss),
        })
    }
}

/// The sample tables of one track, borrowed from the box tree.
pub struct SampleTables<'a> {
    pub stsd: &'a StsdBox,
    pub stsz: &'a StszBox,
    pub stsc: &'a StscBox,
    pub stco: &'a StcoBox,
    pub stts: &'a SttsBox,
    pub ctts: Option<&'a CttsBox>,
    pub stss: Option<&'a StssBox>,
}

impl SampleTables<'_> {
    /// Number of samples the size table describes; drives the conversion
    /// loop.
    pub fn sample_count(&self) -> u32 {
        self.stsz.sample_count
    }

    /// Payload of the AVC decoder configuration record in the first sample
    /// description entry.
    pub fn avc_config(&self) -> Result<&[u8]> {
        self.stsd
            .entries
            .first()
            .and_then(|e| e.codec_config(tags::AVCC))
            .ok_or(Error::MissingCodecConfig)
    }
}
