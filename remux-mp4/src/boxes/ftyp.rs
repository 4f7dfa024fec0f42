use crate::{Reader, Result, parser::FourCC};
use std::io::{Read, Seek};

/// File type box: brand of the container and the brands it is compatible
/// with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FtypBox {
    pub major_brand: FourCC,
    pub minor_version: u32,
    pub compatible_brands: Vec<FourCC>,
}

impl FtypBox {
    pub fn parse<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self> {
        let major_brand = FourCC(reader.read_u32()?.to_be_bytes());
        let minor_version = reader.read_u32()?;

        let mut compatible_brands = Vec::new();
        while reader.remaining() >= 4 {
            compatible_brands.push(FourCC(reader.read_u32()?.to_be_bytes()));
        }

        Ok(Self {
            major_brand,
            minor_version,
            compatible_brands,
        })
    }
}
