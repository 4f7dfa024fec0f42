use crate::{Reader, Result, parser::FourCC};
use std::io::{Read, Seek};

/// Fixed-size field block of a visual sample entry: data reference index,
/// dimensions, resolution, compressor name and friends. The configuration
/// sub-boxes start right after it.
const VISUAL_ENTRY_FIELDS: usize = 78;

/// Sample description box: one entry per coding of the track's samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StsdBox {
    /// Entry count as declared on disk; entries past a truncation are
    /// dropped, so this can exceed `entries.len()`.
    pub entry_count: u32,
    pub entries: Vec<SampleEntry>,
}

/// One sample description entry: its coding format and the raw bytes after
/// the entry header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleEntry {
    pub format: FourCC,
    pub data: Vec<u8>,
}

impl StsdBox {
    pub fn parse<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self> {
        let entry_count = reader.read_u32()?;

        let mut entries = Vec::new();
        for _ in 0..entry_count {
            if reader.remaining() < 8 {
                break;
            }
            let size = reader.read_u32()? as u64;
            let format = FourCC(reader.read_u32()?.to_be_bytes());
            if size < 8 {
                break;
            }
            let body = (size - 8).min(reader.remaining());
            let data = reader.read_bytes(body as usize)?;
            entries.push(SampleEntry { format, data });
        }

        Ok(Self {
            entry_count,
            entries,
        })
    }
}

impl SampleEntry {
    /// Payload of the configuration sub-box tagged `kind`, e.g. `avcC`.
    ///
    /// The entry body is the fixed visual-sample-entry fields followed by
    /// size/tag-delimited sub-boxes; those are walked properly rather than
    /// scanned for a marker string, so trailing sub-boxes after the
    /// configuration record do not leak into the returned payload.
    pub fn codec_config(&self, kind: FourCC) -> Option<&[u8]> {
        let mut pos = VISUAL_ENTRY_FIELDS;

        while pos + 8 <= self.data.len() {
            let size = u32::from_be_bytes([
                self.data[pos],
                self.data[pos + 1],
                self.data[pos + 2],
                self.data[pos + 3],
            ]) as usize;
            let tag = FourCC([
                self.data[pos + 4],
                self.data[pos + 5],
                self.data[pos + 6],
                self.data[pos + 7],
            ]);

            if size < 8 || pos + size > self.data.len() {
                break;
            }
            if tag == kind {
                return Some(&self.data[pos + 8..pos + size]);
            }
            pos += size;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tags;

    fn visual_entry(children: &[(&[u8; 4], &[u8])]) -> SampleEntry {
        let mut data = vec![0u8; VISUAL_ENTRY_FIELDS];
        for (tag, payload) in children {
            data.extend_from_slice(&(8 + payload.len() as u32).to_be_bytes());
            data.extend_from_slice(*tag);
            data.extend_from_slice(payload);
        }
        SampleEntry {
            format: FourCC::new(b"avc1"),
            data,
        }
    }

    #[test]
    fn codec_config_finds_the_tagged_sub_box() {
        let entry = visual_entry(&[(b"avcC", &[1, 100, 0, 31])]);
        assert_eq!(entry.codec_config(tags::AVCC), Some(&[1, 100, 0, 31][..]));
    }

    #[test]
    fn codec_config_skips_preceding_and_excludes_trailing_boxes() {
        let entry = visual_entry(&[
            (b"colr", &[0; 7]),
            (b"avcC", &[1, 2, 3]),
            (b"btrt", &[0; 12]),
        ]);
        assert_eq!(entry.codec_config(tags::AVCC), Some(&[1, 2, 3][..]));
    }

    #[test]
    fn codec_config_handles_missing_or_malformed_children() {
        let entry = visual_entry(&[]);
        assert_eq!(entry.codec_config(tags::AVCC), None);

        // A sub-box size running past the entry ends the walk.
        let mut data = vec![0u8; VISUAL_ENTRY_FIELDS];
        data.extend_from_slice(&100u32.to_be_bytes());
        data.extend_from_slice(b"avcC");
        data.extend_from_slice(&[1, 2]);
        let entry = SampleEntry {
            format: FourCC::new(b"avc1"),
            data,
        };
        assert_eq!(entry.codec_config(tags::AVCC), None);
    }
}
