//! Prints the number of distinct non-zero labels in a nifti file.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, LevelFilter};

use slicevol::{count_labels, Volume};

#[derive(Parser, Debug)]
#[command(author, about, version)]
struct Args {
    /// the label image to inspect
    input: PathBuf,

    /// more output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Args::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        })
        .init();

    let volume = Volume::load(&cli.input).unwrap_or_else(|e| {
        eprintln!("Error! {}", e);
        std::process::exit(-2);
    });
    debug!("{}: shape {:?}", cli.input.display(), volume.data.shape());
    println!("{}", count_labels(volume.data.iter()));
}
