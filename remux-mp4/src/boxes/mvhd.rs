use crate::{Reader, Result};
use std::io::{Read, Seek};

/// Movie header box. Only version 0 is decoded; any other version yields a
/// zeroed view so that parsing can continue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MvhdBox {
    pub creation_time: u32,
    pub modification_time: u32,
    /// Time units per second on the movie timeline.
    pub timescale: u32,
    pub duration: u32,
    /// Playback rate, 16.16 fixed point.
    pub rate: u32,
    /// Playback volume, 8.8 fixed point.
    pub volume: u16,
}

impl MvhdBox {
    pub fn parse<R: Read + Seek>(reader: &mut Reader<R>, version: u8) -> Result<Self> {
        if version != 0 {
            return Ok(Self::default());
        }

        Ok(Self {
            creation_time: reader.read_u32()?,
            modification_time: reader.read_u32()?,
            timescale: reader.read_u32()?,
            duration: reader.read_u32()?,
            rate: reader.read_u32()?,
            volume: reader.read_u16()?,
        })
    }
}
