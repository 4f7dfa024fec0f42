use crate::{Reader, Result};
use std::io::{Read, Seek};

/// Media header box: the time scale every sample-table timestamp of the
/// track is expressed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdhdBox {
    /// Time units per second on the media timeline.
    pub timescale: u32,
    pub duration: u64,
    /// ISO-639-2/T language code.
    pub language: String,
}

impl MdhdBox {
    pub fn parse<R: Read + Seek>(reader: &mut Reader<R>, version: u8) -> Result<Self> {
        let (timescale, duration) = match version {
            0 => {
                reader.skip(8)?; // creation_time, modification_time
                (reader.read_u32()?, u64::from(reader.read_u32()?))
            }
            1 => {
                reader.skip(16)?;
                (reader.read_u32()?, reader.read_u64()?)
            }
            _ => return Ok(Self::default()),
        };

        // language is stored as an ISO-639-2/T code in an array of three
        // 5-bit fields, each the packed difference between its ascii value
        // and 0x60
        let packed = reader.read_u16()?;
        let language = String::from_utf16(&[
            (packed >> 10) + 0x60,
            ((packed & 0x03C0) >> 5) + 0x60,
            (packed & 0x1F) + 0x60,
        ])
        .unwrap_or_default();

        Ok(Self {
            timescale,
            duration,
            language,
        })
    }
}
