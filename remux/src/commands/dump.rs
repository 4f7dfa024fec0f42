use anyhow::Result;
use clap::Args;
use remux_mp4::{BoxTree, Reader};
use std::{fs::File, io::BufReader, path::PathBuf};

/// Parse an mp4 file and print its box tree.
#[derive(Debug, Clone, Args)]
pub struct Dump {
    /// Path of the mp4 file to inspect.
    #[arg(required = true)]
    input: PathBuf,
}

impl Dump {
    pub fn execute(self) -> Result<()> {
        let mut reader = Reader::new(BufReader::new(File::open(&self.input)?))?;
        let tree = BoxTree::parse(&mut reader)?;
        print!("{tree}");
        Ok(())
    }
}
