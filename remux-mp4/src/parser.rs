use crate::{
    Reader, Result,
    boxes::{
        CttsBox, FtypBox, HdlrBox, MdhdBox, MvhdBox, SttsBox, StcoBox, StscBox, StsdBox, StssBox,
        StszBox, TkhdBox,
    },
};
use std::{
    collections::HashMap,
    fmt,
    io::{ErrorKind, Read, Seek},
};

/// Unknown boxes larger than this keep only their file offset; the payload is
/// never pulled into memory. A media-data box routinely exceeds it.
const MAX_OPAQUE_PAYLOAD: u64 = 10 * 1024 * 1024;

/// Four-byte box type tag.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const fn new(tag: &[u8; 4]) -> Self {
        Self(*tag)
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            // Tags are conventionally printable ascii, but nothing enforces it.
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC({self})")
    }
}

/// Well-known box type tags.
pub mod tags {
    use super::FourCC;

    pub const FTYP: FourCC = FourCC::new(b"ftyp");
    pub const FREE: FourCC = FourCC::new(b"free");
    pub const MOOV: FourCC = FourCC::new(b"moov");
    pub const MVHD: FourCC = FourCC::new(b"mvhd");
    pub const TRAK: FourCC = FourCC::new(b"trak");
    pub const TKHD: FourCC = FourCC::new(b"tkhd");
    pub const MDIA: FourCC = FourCC::new(b"mdia");
    pub const MDHD: FourCC = FourCC::new(b"mdhd");
    pub const HDLR: FourCC = FourCC::new(b"hdlr");
    pub const MINF: FourCC = FourCC::new(b"minf");
    pub const STBL: FourCC = FourCC::new(b"stbl");
    pub const UDTA: FourCC = FourCC::new(b"udta");
    pub const MDAT: FourCC = FourCC::new(b"mdat");
    pub const STSD: FourCC = FourCC::new(b"stsd");
    pub const STTS: FourCC = FourCC::new(b"stts");
    pub const STSC: FourCC = FourCC::new(b"stsc");
    pub const STSZ: FourCC = FourCC::new(b"stsz");
    pub const STCO: FourCC = FourCC::new(b"stco");
    pub const STSS: FourCC = FourCC::new(b"stss");
    pub const CTTS: FourCC = FourCC::new(b"ctts");
    pub const AVCC: FourCC = FourCC::new(b"avcC");
}

/// Header of a parsed box: declared size (including the 8 header bytes), type
/// tag and absolute file offset of the size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHeader {
    pub kind: FourCC,
    pub size: u32,
    pub offset: u64,
}

impl BoxHeader {
    /// Absolute file offset one past the last byte the size field claims.
    pub fn end(&self) -> u64 {
        self.offset + u64::from(self.size)
    }
}

/// Payload of a parsed box.
///
/// The set is closed: recognized record types carry a typed view, container
/// types carry nothing (their children hang off the node), and everything
/// else is either an opaque blob or, past [`MAX_OPAQUE_PAYLOAD`], a deferred
/// reference into the source.
pub enum BoxData {
    /// Structural box; the payload is the child boxes.
    Container,
    Ftyp(FtypBox),
    Mvhd(MvhdBox),
    Tkhd(TkhdBox),
    Mdhd(MdhdBox),
    Hdlr(HdlrBox),
    Stsd(StsdBox),
    Stts(SttsBox),
    Stsc(StscBox),
    Ctts(CttsBox),
    Stsz(StszBox),
    Stco(StcoBox),
    Stss(StssBox),
    /// Unrecognized box captured as raw payload bytes.
    Opaque(Vec<u8>),
    /// Unrecognized box too large to keep in memory; `offset` is where its
    /// payload starts in the source.
    Skipped { offset: u64 },
}

/// One node of the box forest. Owns its children exclusively.
pub struct Mp4Box {
    pub header: BoxHeader,
    /// Version byte, present for full boxes only.
    pub version: Option<u8>,
    /// 24-bit flags, present for full boxes only.
    pub flags: Option<u32>,
    pub data: BoxData,
    pub children: Vec<Mp4Box>,
}

impl Mp4Box {
    pub fn kind(&self) -> FourCC {
        self.header.kind
    }

    /// Pre-order depth-first search, first match wins.
    pub fn find_first(&self, kind: FourCC) -> Option<&Mp4Box> {
        if self.header.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_first(kind))
    }

    /// Pre-order depth-first search, all matches in visit order.
    pub fn find_all<'a>(&'a self, kind: FourCC, out: &mut Vec<&'a Mp4Box>) {
        if self.header.kind == kind {
            out.push(self);
        }
        for c in &self.children {
            c.find_all(kind, out);
        }
    }

    fn dump(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        writeln!(f, "{prefix}{} size: {}", self.header.kind, self.header.size)?;
        self.data.dump_attr(f, prefix)?;
        let nested = format!("{prefix}. ");
        for c in &self.children {
            c.dump(f, &nested)?;
        }
        Ok(())
    }
}

/// Root of the parsed forest. Owns every box; dropped as one unit.
pub struct BoxTree {
    pub boxes: Vec<Mp4Box>,
}

impl BoxTree {
    /// Parses the whole source with the default registry.
    pub fn parse<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self> {
        Self::parse_with(reader, &Registry::default())
    }

    /// Parses the whole source, dispatching box types through `registry`.
    pub fn parse_with<R: Read + Seek>(reader: &mut Reader<R>, registry: &Registry) -> Result<Self> {
        let end = reader.get_length();
        let boxes = parse_level(reader, registry, end)?;
        Ok(Self { boxes })
    }

    /// Pre-order depth-first search over the forest, first match wins.
    pub fn find_first(&self, kind: FourCC) -> Option<&Mp4Box> {
        self.boxes.iter().find_map(|b| b.find_first(kind))
    }

    /// Pre-order depth-first search over the forest, all matches.
    pub fn find_all(&self, kind: FourCC) -> Vec<&Mp4Box> {
        let mut out = Vec::new();
        for b in &self.boxes {
            b.find_all(kind, &mut out);
        }
        out
    }
}

impl fmt::Display for BoxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.boxes {
            b.dump(f, "")?;
        }
        Ok(())
    }
}

/// Decoding strategy the registry selects for a box type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decoder {
    Children,
    Ftyp,
    Mvhd,
    Tkhd,
    Mdhd,
    Hdlr,
    Stsd,
    Stts,
    Stsc,
    Ctts,
    Stsz,
    Stco,
    Stss,
}

impl Decoder {
    /// Full boxes carry a version byte and 24-bit flags ahead of their
    /// payload; the parser consumes both before handing off.
    fn is_full_box(self) -> bool {
        !matches!(self, Decoder::Children | Decoder::Ftyp)
    }
}

/// Static tag-to-decoder mapping used while parsing.
///
/// Container tags recurse structurally, record tags get a dedicated decoder,
/// and anything absent from the map falls back to the opaque/deferred policy.
pub struct Registry {
    decoders: HashMap<FourCC, Decoder>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut decoders = HashMap::new();
        for tag in [
            tags::MOOV,
            tags::TRAK,
            tags::MDIA,
            tags::MINF,
            tags::STBL,
            tags::UDTA,
        ] {
            decoders.insert(tag, Decoder::Children);
        }
        decoders.insert(tags::FTYP, Decoder::Ftyp);
        decoders.insert(tags::MVHD, Decoder::Mvhd);
        decoders.insert(tags::TKHD, Decoder::Tkhd);
        decoders.insert(tags::MDHD, Decoder::Mdhd);
        decoders.insert(tags::HDLR, Decoder::Hdlr);
        decoders.insert(tags::STSD, Decoder::Stsd);
        decoders.insert(tags::STTS, Decoder::Stts);
        decoders.insert(tags::STSC, Decoder::Stsc);
        decoders.insert(tags::CTTS, Decoder::Ctts);
        decoders.insert(tags::STSZ, Decoder::Stsz);
        decoders.insert(tags::STCO, Decoder::Stco);
        decoders.insert(tags::STSS, Decoder::Stss);
        Self { decoders }
    }
}

impl Registry {
    pub fn recognizes(&self, kind: FourCC) -> bool {
        self.decoders.contains_key(&kind)
    }

    fn get(&self, kind: FourCC) -> Option<Decoder> {
        self.decoders.get(&kind).copied()
    }
}

/// Parses sibling boxes until `end`, a truncation or a size underflow.
///
/// After every child the cursor is force-seeked to the position the child's
/// size field implies, whatever its decoder actually consumed; forward
/// progress is guaranteed because sizes below the 8-byte header end the
/// level instead of being followed.
fn parse_level<R: Read + Seek>(
    reader: &mut Reader<R>,
    registry: &Registry,
    end: u64,
) -> Result<Vec<Mp4Box>> {
    let mut boxes = Vec::new();

    while reader.get_position() + 8 <= end {
        let offset = reader.get_position();
        let size = match read_or_eof(reader.read_u32()) {
            Some(v) => v?,
            None => break,
        };
        let kind = match read_or_eof(reader.read_u32()) {
            Some(v) => FourCC(v?.to_be_bytes()),
            None => break,
        };

        // A size below the header length implies non-positive remaining
        // payload; stop this level and keep the siblings parsed so far.
        if size < 8 {
            break;
        }

        let header = BoxHeader { kind, size, offset };
        let box_end = header.end();
        let payload_end = box_end.min(end);

        let mut version = None;
        let mut flags = None;
        let mut children = Vec::new();

        let data = match registry.get(kind) {
            Some(Decoder::Children) => {
                children = parse_level(reader, registry, payload_end)?;
                BoxData::Container
            }
            Some(decoder) => {
                if decoder.is_full_box() {
                    match read_or_eof(reader.read_u32()) {
                        Some(v) => {
                            let vf = v?;
                            version = Some((vf >> 24) as u8);
                            flags = Some(vf & 0x00FF_FFFF);
                        }
                        None => break,
                    }
                }
                let avail = payload_end.saturating_sub(reader.get_position());
                let payload = match read_or_eof(reader.read_bytes(avail as usize)) {
                    Some(v) => v?,
                    None => break,
                };
                match decode_record(decoder, version.unwrap_or(0), &payload) {
                    Some(data) => data,
                    // A record the decoder cannot make sense of stays
                    // available as raw bytes.
                    None => BoxData::Opaque(payload),
                }
            }
            None => {
                // The declared size decides the policy; a deferred box is
                // never pulled into memory even when the file is shorter
                // than it claims.
                if u64::from(size) - 8 > MAX_OPAQUE_PAYLOAD {
                    BoxData::Skipped { offset: offset + 8 }
                } else {
                    let avail = payload_end.saturating_sub(offset + 8);
                    match read_or_eof(reader.read_bytes(avail as usize)) {
                        Some(v) => BoxData::Opaque(v?),
                        None => break,
                    }
                }
            }
        };

        boxes.push(Mp4Box {
            header,
            version,
            flags,
            data,
            children,
        });

        reader.seek_to(box_end)?;
    }

    if reader.get_position() < end {
        reader.seek_to(end)?;
    }

    Ok(boxes)
}

/// Maps a clean end-of-stream to `None` so callers can end the level early;
/// any other I/O failure stays an error.
fn read_or_eof<T>(result: std::io::Result<T>) -> Option<std::io::Result<T>> {
    match result {
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => None,
        other => Some(other),
    }
}

fn decode_record(decoder: Decoder, version: u8, payload: &[u8]) -> Option<BoxData> {
    let mut r = Reader::from_slice(payload);
    let data = match decoder {
        Decoder::Children => return None,
        Decoder::Ftyp => BoxData::Ftyp(FtypBox::parse(&mut r).ok()?),
        Decoder::Mvhd => BoxData::Mvhd(MvhdBox::parse(&mut r, version).ok()?),
        Decoder::Tkhd => BoxData::Tkhd(TkhdBox::parse(&mut r, version).ok()?),
        Decoder::Mdhd => BoxData::Mdhd(MdhdBox::parse(&mut r, version).ok()?),
        Decoder::Hdlr => BoxData::Hdlr(HdlrBox::parse(&mut r).ok()?),
        Decoder::Stsd => BoxData::Stsd(StsdBox::parse(&mut r).ok()?),
        Decoder::Stts => BoxData::Stts(SttsBox::parse(&mut r).ok()?),
        Decoder::Stsc => BoxData::Stsc(StscBox::parse(&mut r).ok()?),
        Decoder::Ctts => BoxData::Ctts(CttsBox::parse(&mut r, version).ok()?),
        Decoder::Stsz => BoxData::Stsz(StszBox::parse(&mut r).ok()?),
        Decoder::Stco => BoxData::Stco(StcoBox::parse(&mut r).ok()?),
        Decoder::Stss => BoxData::Stss(StssBox::parse(&mut r).ok()?),
    };
    Some(data)
}

impl BoxData {
    fn dump_attr(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        match self {
            BoxData::Container => Ok(()),
            BoxData::Ftyp(b) => {
                writeln!(f, "{prefix} major: {}", b.major_brand)?;
                writeln!(f, "{prefix} minor: {}", b.minor_version)
            }
            BoxData::Mvhd(b) => {
                writeln!(f, "{prefix} duration: {}/{}", b.duration, b.timescale)?;
                writeln!(f, "{prefix} rate: {}", b.rate)?;
                writeln!(f, "{prefix} volume: {}", b.volume)
            }
            BoxData::Tkhd(b) => {
                writeln!(f, "{prefix} track: {}", b.track_id)?;
                writeln!(f, "{prefix} duration: {}", b.duration)?;
                writeln!(f, "{prefix} width: {}", b.width >> 16)?;
                writeln!(f, "{prefix} height: {}", b.height >> 16)
            }
            BoxData::Mdhd(b) => {
                writeln!(f, "{prefix} timeScale: {}", b.timescale)?;
                writeln!(f, "{prefix} duration: {}", b.duration)?;
                writeln!(f, "{prefix} language: {}", b.language)
            }
            BoxData::Hdlr(b) => {
                writeln!(f, "{prefix} type: {}", b.handler_type)?;
                writeln!(f, "{prefix} name: {}", b.name)
            }
            BoxData::Stsd(b) => {
                writeln!(f, "{prefix} count: {}", b.entry_count)?;
                for e in &b.entries {
                    writeln!(f, "{prefix} entry: {} ({} bytes)", e.format, e.data.len())?;
                }
                Ok(())
            }
            BoxData::Stts(b) => {
                writeln!(f, "{prefix} count: {}", b.entries.len())?;
                for e in b.entries.iter().take(10) {
                    writeln!(f, "{prefix}  count: {} delta: {}", e.sample_count, e.sample_delta)?;
                }
                Ok(())
            }
            BoxData::Stsc(b) => {
                writeln!(f, "{prefix} count: {}", b.entries.len())?;
                for e in b.entries.iter().take(10) {
                    writeln!(
                        f,
                        "{prefix}  first_chunk: {} spc: {} descidx: {}",
                        e.first_chunk, e.samples_per_chunk, e.description_index
                    )?;
                }
                Ok(())
            }
            BoxData::Ctts(b) => {
                writeln!(f, "{prefix} count: {}", b.entries.len())?;
                for e in b.entries.iter().take(10) {
                    writeln!(f, "{prefix}  count: {} offset: {}", e.sample_count, e.offset)?;
                }
                Ok(())
            }
            BoxData::Stsz(b) => {
                writeln!(f, "{prefix} count: {}", b.sample_count)?;
                writeln!(f, "{prefix} constant: {}", b.default_size)?;
                if b.default_size == 0 {
                    for size in b.sizes.iter().take(10) {
                        writeln!(f, "{prefix}  size: {size}")?;
                    }
                }
                Ok(())
            }
            BoxData::Stco(b) => {
                writeln!(f, "{prefix} count: {}", b.len())?;
                for c in 0..b.len().min(10) {
                    if let Some(offset) = b.offset(c as u32) {
                        writeln!(f, "{prefix}  offset: {offset}")?;
                    }
                }
                Ok(())
            }
            BoxData::Stss(b) => {
                writeln!(f, "{prefix} count: {}", b.samples.len())?;
                for s in b.samples.iter().take(10) {
                    writeln!(f, "{prefix}  sync: {s}")?;
                }
                Ok(())
            }
            BoxData::Opaque(body) => {
                write!(f, "{prefix} body: [")?;
                for b in body.iter().take(10) {
                    write!(f, "{b},")?;
                }
                writeln!(f, "...] {}", body.len())
            }
            BoxData::Skipped { offset } => {
                writeln!(f, "{prefix} deferred at: {offset}")
            }
        }
    }
}
