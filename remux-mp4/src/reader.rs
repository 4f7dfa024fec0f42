use std::io::{Cursor, Read, Result, Seek, SeekFrom};

/// Big-endian reader over a seekable byte source.
///
/// All multi-byte fields of the box format are big-endian, so the reader only
/// offers big-endian accessors. The current position is tracked internally;
/// seeking past the end is allowed and surfaces as `UnexpectedEof` on the
/// next read, which the parser treats as a truncation, not a fatal error.
pub struct Reader<R> {
    inner: R,
    pos: u64,
    len: u64,
}

impl<'a> Reader<Cursor<&'a [u8]>> {
    /// Wraps a captured payload slice, e.g. the body of a record box.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self {
            pos: 0,
            len: data.len() as u64,
            inner: Cursor::new(data),
        }
    }
}

impl<R: Read + Seek> Reader<R> {
    /// Wraps a seekable source, measuring its total length up front.
    pub fn new(mut inner: R) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self { inner, pos: 0, len })
    }

    pub fn has_more_data(&self) -> bool {
        self.pos < self.len
    }

    pub fn get_length(&self) -> u64 {
        self.len
    }

    pub fn get_position(&self) -> u64 {
        self.pos
    }

    /// Bytes between the current position and the end of the source.
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.pos)
    }

    pub fn seek_to(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, bytes: u64) -> Result<()> {
        self.seek_to(self.pos + bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn read_u24(&mut self) -> Result<u32> {
        let mut buf = [0; 3];
        self.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes([0, buf[0], buf[1], buf[2]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    pub fn read_bytes(&mut self, bytes: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0; bytes];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }
}
