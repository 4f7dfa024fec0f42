use anyhow::Result;
use clap::Args;
use kdam::BarExt;
use remux_mp4::{BoxTree, Reader, SampleIter, Track, avc, flv::FlvWriter, ticks_to_millis};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::PathBuf,
};

/// Remux one AVC video track from an mp4 file into an flv stream.
#[derive(Debug, Clone, Args)]
pub struct Convert {
    /// Path of the input mp4 file.
    #[arg(required = true)]
    input: PathBuf,

    /// Path of the output flv file. Defaults to the input path with an flv
    /// extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Zero-based index of the trak box to convert.
    #[arg(short, long)]
    track: Option<usize>,
}

impl Convert {
    pub fn execute(self) -> Result<()> {
        let output = self
            .output
            .unwrap_or_else(|| self.input.with_extension("flv"));

        let mut reader = Reader::new(BufReader::new(File::open(&self.input)?))?;
        let tree = BoxTree::parse(&mut reader)?;

        let track = match self.track {
            Some(index) => Track::nth(&tree, index)?,
            None => Track::first(&tree)?,
        };
        if let Some(handler) = track.handler_type() {
            log::debug!("track handler: {handler}");
            if handler != remux_mp4::FourCC::new(b"vide") {
                log::warn!("selected track is not a video track ({handler})");
            }
        }

        let timescale = track.timescale()?;
        let tables = track.sample_tables()?;
        let config = tables.avc_config()?;

        let mut flv = FlvWriter::new(BufWriter::new(File::create(&output)?));
        flv.write_header()?;
        flv.write_avc_sequence_header(config)?;

        let mut pb = kdam::tqdm!(total = tables.sample_count() as usize);
        let mut keyframes = 0u32;
        let mut duration_ms = 0u64;

        for sample in SampleIter::new(&tables) {
            let sample = sample?;

            reader.seek_to(sample.offset)?;
            let data = reader.read_bytes(sample.size as usize)?;

            let keyframe = avc::contains_idr(&data);
            if keyframe {
                keyframes += 1;
            }

            duration_ms = ticks_to_millis(sample.decode_time, timescale);
            let composition_ms =
                i64::from(sample.composition_offset) * 1000 / i64::from(timescale.max(1));

            flv.write_avc_frame(duration_ms as u32, composition_ms as i32, keyframe, &data)?;
            pb.update(1)?;
        }

        let samples = tables.sample_count();
        let bytes = flv.bytes_written();
        flv.into_inner().flush()?;
        eprintln!();

        log::info!(
            "wrote {} samples ({} keyframes, {}.{:03}s) to {}",
            samples,
            keyframes,
            duration_ms / 1000,
            duration_ms % 1000,
            output.display(),
        );
        log::debug!("{bytes} flv bytes");

        Ok(())
    }
}
