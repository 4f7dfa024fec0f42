mod commands;
mod logger;

use clap::{ColorChoice, Parser};
use colored::Colorize;
use commands::{Args, Commands};
use std::{
    io::{IsTerminal, stderr},
    process,
};

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let colorize = match args.color {
        ColorChoice::Always => true,
        ColorChoice::Auto => stderr().is_terminal(),
        ColorChoice::Never => false,
    };
    kdam::term::init(colorize);
    if !colorize {
        colored::control::set_override(false);
    }

    logger::init(args.verbose)?;

    match args.command {
        Commands::Convert(args) => args.execute()?,
        Commands::Dump(args) => args.execute()?,
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".bold().red(), e);
        process::exit(1);
    }
}
