use crate::{Reader, Result, parser::FourCC};
use std::io::{Read, Seek};

/// Handler reference box: what kind of media the enclosing track carries
/// (`vide`, `soun`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HdlrBox {
    pub handler_type: FourCC,
    pub name: String,
}

impl HdlrBox {
    pub fn parse<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self> {
        reader.skip(4)?; // pre_defined
        let handler_type = FourCC(reader.read_u32()?.to_be_bytes());
        reader.skip(12)?; // reserved

        let name_bytes = reader.read_bytes(reader.remaining() as usize)?;
        let name = String::from_utf8_lossy(&name_bytes)
            .trim_end_matches('\0')
            .to_owned();

        Ok(Self { handler_type, name })
    }
}
