use crate::{Reader, Result};
use std::io::{Read, Seek};

/// Track header box. Versions 0 and 1 differ only in the width of the time
/// fields; any later version yields a zeroed view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TkhdBox {
    pub track_id: u32,
    pub duration: u64,
    /// Playback volume, 8.8 fixed point; zero for video tracks.
    pub volume: u16,
    /// Presentation width, 16.16 fixed point.
    pub width: u32,
    /// Presentation height, 16.16 fixed point.
    pub height: u32,
}

impl TkhdBox {
    pub fn parse<R: Read + Seek>(reader: &mut Reader<R>, version: u8) -> Result<Self> {
        let (track_id, duration) = match version {
            0 => {
                reader.skip(8)?; // creation_time, modification_time
                let track_id = reader.read_u32()?;
                reader.skip(4)?; // reserved
                (track_id, u64::from(reader.read_u32()?))
            }
            1 => {
                reader.skip(16)?;
                let track_id = reader.read_u32()?;
                reader.skip(4)?;
                (track_id, reader.read_u64()?)
            }
            _ => return Ok(Self::default()),
        };

        // reserved (8), layer (2), alternate_group (2)
        reader.skip(12)?;
        let volume = reader.read_u16()?;
        // reserved (2), unity matrix (36)
        reader.skip(38)?;
        let width = reader.read_u32()?;
        let height = reader.read_u32()?;

        Ok(Self {
            track_id,
            duration,
            volume,
            width,
            height,
        })
    }
}
