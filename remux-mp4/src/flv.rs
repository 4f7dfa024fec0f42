//! FLV tagged-stream serialization.
//!
//! The output is a file header, a zero previous-tag-size field, then tags.
//! Every tag is followed by a 4-byte trailer holding the tag's exact
//! header-plus-payload byte count so the stream can also be walked
//! backwards.

use crate::Result;
use std::io::Write;

/// Tag type byte of a video tag.
pub const TAG_TYPE_VIDEO: u8 = 9;
/// Tag type byte of an audio tag.
pub const TAG_TYPE_AUDIO: u8 = 8;
/// Tag type byte of a script-data tag.
pub const TAG_TYPE_SCRIPT: u8 = 18;

/// Codec id of AVC in the low nibble of a video tag's first payload byte.
pub const VCODEC_AVC: u8 = 7;

/// Frame type nibble of a keyframe.
const FRAME_KEY: u8 = 0x10;
/// Frame type nibble of an inter frame.
const FRAME_INTER: u8 = 0x20;

/// AVC packet type byte: decoder configuration record.
const AVC_SEQUENCE_HEADER: u8 = 0x00;
/// AVC packet type byte: one access unit of NAL units.
const AVC_NALU: u8 = 0x01;

/// File header flags bit: the stream carries video.
const FLAG_HAS_VIDEO: u8 = 0x01;

/// Byte count of the fixed header preceding every tag payload.
const TAG_HEADER_SIZE: u32 = 11;

/// Serializer for a video-only FLV stream.
pub struct FlvWriter<W: Write> {
    inner: W,
    bytes_written: u64,
}

impl<W: Write> FlvWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Total bytes emitted so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Writes the file header (signature, version 1, video-present flag,
    /// header size 9) and the zero previous-tag-size field.
    pub fn write_header(&mut self) -> Result<()> {
        self.write_all(b"FLV")?;
        self.write_all(&[1, FLAG_HAS_VIDEO])?;
        self.write_u32(9)?;
        self.write_u32(0)?;
        Ok(())
    }

    /// Writes the AVC decoder configuration record as the stream's first
    /// video tag, timestamped zero.
    pub fn write_avc_sequence_header(&mut self, config: &[u8]) -> Result<()> {
        self.write_video_tag(0, FRAME_KEY | VCODEC_AVC, AVC_SEQUENCE_HEADER, 0, config)
    }

    /// Writes one coded access unit.
    pub fn write_avc_frame(
        &mut self,
        timestamp: u32,
        composition_offset: i32,
        keyframe: bool,
        data: &[u8],
    ) -> Result<()> {
        let frame_type = if keyframe { FRAME_KEY } else { FRAME_INTER };
        self.write_video_tag(
            timestamp,
            frame_type | VCODEC_AVC,
            AVC_NALU,
            composition_offset,
            data,
        )
    }

    /// Consumes the writer, handing back the sink.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_video_tag(
        &mut self,
        timestamp: u32,
        frame_and_codec: u8,
        packet_type: u8,
        composition_offset: i32,
        body: &[u8],
    ) -> Result<()> {
        // frame/codec byte + packet type + 24-bit composition offset.
        let payload_size = body.len() as u32 + 5;

        self.write_all(&[TAG_TYPE_VIDEO])?;
        self.write_u24(payload_size)?;
        // Timestamp: low 24 bits, then the high 8 as an extension byte.
        self.write_u24(timestamp & 0x00FF_FFFF)?;
        self.write_all(&[(timestamp >> 24) as u8])?;
        self.write_u24(0)?; // stream id

        self.write_all(&[frame_and_codec, packet_type])?;
        self.write_u24(composition_offset as u32)?;
        self.write_all(body)?;

        // Trailer: exact byte count of the tag just written, for backward
        // traversal.
        self.write_u32(TAG_HEADER_SIZE + payload_size)?;
        Ok(())
    }

    fn write_u24(&mut self, value: u32) -> Result<()> {
        let b = value.to_be_bytes();
        self.write_all(&[b[1], b[2], b[3]])
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_all(&value.to_be_bytes())
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.inner.write_all(buf)?;
        self.bytes_written += buf.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_nine_bytes_plus_zero_trailer() {
        let mut flv = FlvWriter::new(Vec::new());
        flv.write_header().unwrap();
        let out = flv.into_inner();
        assert_eq!(
            out,
            vec![b'F', b'L', b'V', 1, 0x01, 0, 0, 0, 9, 0, 0, 0, 0]
        );
    }

    #[test]
    fn every_tag_trailer_equals_header_plus_payload() {
        let mut flv = FlvWriter::new(Vec::new());
        flv.write_avc_sequence_header(&[1, 2, 3, 4]).unwrap();
        flv.write_avc_frame(500, 0, false, &[9; 20]).unwrap();
        let out = flv.into_inner();

        let mut pos = 0;
        while pos < out.len() {
            let payload_size = u32::from_be_bytes([0, out[pos + 1], out[pos + 2], out[pos + 3]]);
            let tag_len = 11 + payload_size as usize;
            let trailer =
                u32::from_be_bytes(out[pos + tag_len..pos + tag_len + 4].try_into().unwrap());
            assert_eq!(trailer, 11 + payload_size);
            pos += tag_len + 4;
        }
        assert_eq!(pos, out.len());
    }

    #[test]
    fn sequence_header_tag_layout() {
        let mut flv = FlvWriter::new(Vec::new());
        flv.write_avc_sequence_header(&[0xAA, 0xBB]).unwrap();
        let out = flv.into_inner();

        assert_eq!(out[0], TAG_TYPE_VIDEO);
        // payload = 5 prefix bytes + 2 config bytes
        assert_eq!(&out[1..4], &[0, 0, 7]);
        // timestamp + extension + stream id all zero
        assert_eq!(&out[4..11], &[0; 7]);
        // keyframe nibble | AVC, sequence-header packet, zero offset
        assert_eq!(&out[11..16], &[0x17, 0x00, 0, 0, 0]);
        assert_eq!(&out[16..18], &[0xAA, 0xBB]);
        assert_eq!(&out[18..22], &18u32.to_be_bytes());
    }

    #[test]
    fn extended_timestamp_lands_in_the_fourth_byte() {
        let mut flv = FlvWriter::new(Vec::new());
        flv.write_avc_frame(0x0123_4567, 0, true, &[]).unwrap();
        let out = flv.into_inner();
        assert_eq!(&out[4..7], &[0x23, 0x45, 0x67]);
        assert_eq!(out[7], 0x01);
    }

    #[test]
    fn composition_offset_is_written_as_24_bits() {
        let mut flv = FlvWriter::new(Vec::new());
        flv.write_avc_frame(0, 0x00C0FFEE_u32 as i32, false, &[]).unwrap();
        let out = flv.into_inner();
        assert_eq!(&out[13..16], &[0xC0, 0xFF, 0xEE]);
        // inter frame nibble | AVC codec id, NALU packet type
        assert_eq!(&out[11..13], &[0x27, 0x01]);
    }
}
