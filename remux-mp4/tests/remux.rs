use remux_mp4::{BoxTree, Error, FlvRemuxer, Reader, tags};
use std::{error::Error as StdError, io::Cursor};

// ==========================================
// Synthetic mp4 building
// ==========================================

fn basic_box(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(8 + payload.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(payload);
    out
}

fn full_box(tag: &[u8; 4], version: u8, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![version, 0, 0, 0];
    body.extend_from_slice(payload);
    basic_box(tag, &body)
}

fn container(tag: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
    basic_box(tag, &children.concat())
}

fn mdhd(timescale: u32) -> Vec<u8> {
    let mut p = vec![0; 8]; // creation_time, modification_time
    p.extend_from_slice(&timescale.to_be_bytes());
    p.extend_from_slice(&1000u32.to_be_bytes()); // duration
    p.extend_from_slice(&0x55C4u16.to_be_bytes()); // language: und
    p.extend_from_slice(&[0; 2]); // pre_defined
    full_box(b"mdhd", 0, &p)
}

fn hdlr(handler: &[u8; 4]) -> Vec<u8> {
    let mut p = vec![0; 4]; // pre_defined
    p.extend_from_slice(handler);
    p.extend_from_slice(&[0; 12]); // reserved
    p.extend_from_slice(b"VideoHandler\0");
    full_box(b"hdlr", 0, &p)
}

fn stsd_avc1(config: &[u8]) -> Vec<u8> {
    let mut entry_body = vec![0u8; 78]; // fixed visual sample entry fields
    entry_body.extend_from_slice(&basic_box(b"avcC", config));

    let mut p = 1u32.to_be_bytes().to_vec(); // entry_count
    p.extend_from_slice(&(8 + entry_body.len() as u32).to_be_bytes());
    p.extend_from_slice(b"avc1");
    p.extend_from_slice(&entry_body);
    full_box(b"stsd", 0, &p)
}

fn stts(runs: &[(u32, u32)]) -> Vec<u8> {
    let mut p = (runs.len() as u32).to_be_bytes().to_vec();
    for &(count, delta) in runs {
        p.extend_from_slice(&count.to_be_bytes());
        p.extend_from_slice(&delta.to_be_bytes());
    }
    full_box(b"stts", 0, &p)
}

fn stsc(runs: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut p = (runs.len() as u32).to_be_bytes().to_vec();
    for &(first, spc, desc) in runs {
        p.extend_from_slice(&first.to_be_bytes());
        p.extend_from_slice(&spc.to_be_bytes());
        p.extend_from_slice(&desc.to_be_bytes());
    }
    full_box(b"stsc", 0, &p)
}

fn stsz(sizes: &[u32]) -> Vec<u8> {
    let mut p = 0u32.to_be_bytes().to_vec(); // default size
    p.extend_from_slice(&(sizes.len() as u32).to_be_bytes());
    for s in sizes {
        p.extend_from_slice(&s.to_be_bytes());
    }
    full_box(b"stsz", 0, &p)
}

fn stco(offsets: &[u32]) -> Vec<u8> {
    let mut p = (offsets.len() as u32).to_be_bytes().to_vec();
    for o in offsets {
        p.extend_from_slice(&o.to_be_bytes());
    }
    full_box(b"stco", 0, &p)
}

fn ctts(runs: &[(u32, i32)]) -> Vec<u8> {
    let mut p = (runs.len() as u32).to_be_bytes().to_vec();
    for &(count, offset) in runs {
        p.extend_from_slice(&count.to_be_bytes());
        p.extend_from_slice(&offset.to_be_bytes());
    }
    full_box(b"ctts", 0, &p)
}

/// One access unit: a single length-prefixed NAL unit padded to `size`
/// bytes, with the given NAL header byte.
fn access_unit(nal_header: u8, size: usize) -> Vec<u8> {
    let mut out = ((size - 4) as u32).to_be_bytes().to_vec();
    out.push(nal_header);
    out.resize(size, 0);
    out
}

const AVC_CONFIG: &[u8] = &[0x01, 0x64, 0x00, 0x1F, 0xFF, 0xE1, 0x00, 0x02];

/// Builds a playable single-track file: moov up front, sample data inside
/// an mdat positioned so that the first sample lands exactly at the offset
/// the stco table records.
fn single_track_file(stbl_extra: &[Vec<u8>], samples: &[Vec<u8>]) -> Vec<u8> {
    const DATA_START: u32 = 1000;

    let sizes: Vec<u32> = samples.iter().map(|s| s.len() as u32).collect();
    let mut stbl_children = vec![
        stsd_avc1(AVC_CONFIG),
        stts(&[(sizes.len() as u32, 500)]),
        stsc(&[(1, sizes.len() as u32, 1)]),
        stsz(&sizes),
        stco(&[DATA_START]),
    ];
    stbl_children.extend_from_slice(stbl_extra);

    let trak = container(
        b"trak",
        &[container(
            b"mdia",
            &[
                mdhd(1000),
                hdlr(b"vide"),
                container(b"minf", &[container(b"stbl", &stbl_children)]),
            ],
        )],
    );

    let mut file = basic_box(b"ftyp", b"isom\x00\x00\x02\x00avc1isom");
    file.extend_from_slice(&container(b"moov", &[trak]));

    // Pad with a free box so the mdat payload starts at DATA_START.
    let pad = DATA_START as usize - 8 - (file.len() + 8);
    file.extend_from_slice(&basic_box(b"free", &vec![0; pad]));
    file.extend_from_slice(&basic_box(b"mdat", &samples.concat()));
    file
}

/// Splits an FLV body into (payload, timestamp) pairs, checking every tag
/// trailer along the way.
fn split_tags(flv: &[u8]) -> Vec<(Vec<u8>, u32)> {
    assert_eq!(&flv[..3], b"FLV");
    assert_eq!(flv[3], 1);
    assert_eq!(flv[4], 0x01); // video only
    assert_eq!(&flv[5..9], &9u32.to_be_bytes());
    assert_eq!(&flv[9..13], &0u32.to_be_bytes());

    let mut tags = Vec::new();
    let mut pos = 13;
    while pos < flv.len() {
        assert_eq!(flv[pos], 9, "expected a video tag");
        let payload_size =
            u32::from_be_bytes([0, flv[pos + 1], flv[pos + 2], flv[pos + 3]]) as usize;
        let timestamp = u32::from_be_bytes([flv[pos + 7], flv[pos + 4], flv[pos + 5], flv[pos + 6]]);
        assert_eq!(&flv[pos + 8..pos + 11], &[0; 3], "stream id must be zero");

        let payload = flv[pos + 11..pos + 11 + payload_size].to_vec();
        let trailer = u32::from_be_bytes(
            flv[pos + 11 + payload_size..pos + 15 + payload_size]
                .try_into()
                .unwrap(),
        );
        assert_eq!(trailer as usize, 11 + payload_size);

        tags.push((payload, timestamp));
        pos += 15 + payload_size;
    }
    tags
}

// ==========================================
// Conversion
// ==========================================

#[test]
fn end_to_end_two_samples_one_chunk() -> Result<(), Box<dyn StdError>> {
    let samples = vec![access_unit(0x65, 100), access_unit(0x41, 150)];
    let file = single_track_file(&[], &samples);

    let mut out = Vec::new();
    let stats = FlvRemuxer::new().remux(Cursor::new(&file), &mut out)?;

    assert_eq!(stats.samples, 2);
    assert_eq!(stats.keyframes, 1);
    assert_eq!(stats.duration_ms, 500);
    assert_eq!(stats.bytes_written as usize, out.len());

    let tags = split_tags(&out);
    assert_eq!(tags.len(), 3);

    // Sequence header: keyframe | AVC, packet type 0, config verbatim.
    let (header_tag, ts) = &tags[0];
    assert_eq!(*ts, 0);
    assert_eq!(&header_tag[..5], &[0x17, 0x00, 0, 0, 0]);
    assert_eq!(&header_tag[5..], AVC_CONFIG);

    // Sample 0: read from file offset 1000, keyframe, timestamp 0.
    let (tag, ts) = &tags[1];
    assert_eq!(*ts, 0);
    assert_eq!(&tag[..5], &[0x17, 0x01, 0, 0, 0]);
    assert_eq!(&tag[5..], &file[1000..1100]);

    // Sample 1: contiguous in the chunk, inter frame, timestamp 500.
    let (tag, ts) = &tags[2];
    assert_eq!(*ts, 500);
    assert_eq!(&tag[..5], &[0x27, 0x01, 0, 0, 0]);
    assert_eq!(&tag[5..], &file[1100..1250]);

    Ok(())
}

#[test]
fn composition_offsets_reach_the_tag_in_milliseconds() -> Result<(), Box<dyn StdError>> {
    let samples = vec![access_unit(0x65, 40), access_unit(0x41, 40)];
    let file = single_track_file(&[ctts(&[(2, 100)])], &samples);

    let mut out = Vec::new();
    FlvRemuxer::new().remux(Cursor::new(&file), &mut out)?;

    let tags = split_tags(&out);
    // 100 ticks at a 1000 Hz time scale is 100 ms.
    assert_eq!(&tags[1].0[2..5], &[0, 0, 100]);
    assert_eq!(&tags[2].0[2..5], &[0, 0, 100]);
    Ok(())
}

#[test]
fn missing_required_table_aborts_conversion() {
    let samples = vec![access_unit(0x65, 40)];
    let mut file = single_track_file(&[], &samples);

    // Corrupt the stco tag so the box is no longer recognized.
    let pos = file.windows(4).position(|w| w == b"stco").unwrap();
    file[pos..pos + 4].copy_from_slice(b"zzzz");

    let err = FlvRemuxer::new()
        .remux(Cursor::new(&file), &mut Vec::new())
        .unwrap_err();
    match err {
        Error::MissingBox(tag) => assert_eq!(tag, tags::STCO),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn file_without_tracks_is_rejected() {
    let file = basic_box(b"ftyp", b"isom\x00\x00\x02\x00");
    let err = FlvRemuxer::new()
        .remux(Cursor::new(&file), &mut Vec::new())
        .unwrap_err();
    assert!(matches!(err, Error::NoTrack));
}

#[test]
fn track_selection_is_bounds_checked() {
    let samples = vec![access_unit(0x65, 40)];
    let file = single_track_file(&[], &samples);

    let err = FlvRemuxer::new()
        .track(3)
        .remux(Cursor::new(&file), &mut Vec::new())
        .unwrap_err();
    assert!(matches!(err, Error::TrackNotFound(3, 1)));

    // Index 0 is the same track the default path picks.
    let mut by_index = Vec::new();
    let mut by_default = Vec::new();
    FlvRemuxer::new()
        .track(0)
        .remux(Cursor::new(&file), &mut by_index)
        .unwrap();
    FlvRemuxer::new()
        .remux(Cursor::new(&file), &mut by_default)
        .unwrap();
    assert_eq!(by_index, by_default);
}

// ==========================================
// Forest level behavior
// ==========================================

#[test]
fn dump_renders_the_forest_with_nested_prefixes() -> Result<(), Box<dyn StdError>> {
    let samples = vec![access_unit(0x65, 40)];
    let file = single_track_file(&[], &samples);

    let mut reader = Reader::new(Cursor::new(file))?;
    let tree = BoxTree::parse(&mut reader)?;
    let report = tree.to_string();

    assert!(report.contains("moov size:"));
    assert!(report.contains(". trak size:"));
    assert!(report.contains(". . . . stsz size:"));
    assert!(report.contains(" timeScale: 1000"));
    assert!(report.contains(" type: vide"));
    Ok(())
}

#[test]
fn unparsed_garbage_after_moov_does_not_break_the_track() -> Result<(), Box<dyn StdError>> {
    let samples = vec![access_unit(0x65, 40)];
    let mut file = single_track_file(&[], &samples);

    // A trailing header that claims more bytes than the file has.
    file.extend_from_slice(&64u32.to_be_bytes());
    file.extend_from_slice(b"junk");

    let mut out = Vec::new();
    let stats = FlvRemuxer::new().remux(Cursor::new(&file), &mut out)?;
    assert_eq!(stats.samples, 1);
    Ok(())
}
