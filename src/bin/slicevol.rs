//! Commandline utility to render a strip of slices from one or more nifti files.
//!
//! Base images are drawn first, label images over them. Each image is given as
//! `path[:cmap[:alpha[:vmin[:vmax]]]]`; label images only honour the alpha field.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use slicevol::{create_slice, ChannelSpec, Direction, RenderOptions, SliceError, SliceSelection};

// use clap to create commandline interface
#[derive(Parser, Debug)]
#[command(author, about, version, long_about)]
struct Args {
    /// the image file to write (format follows the extension, e.g. .png)
    out: PathBuf,

    /// continuous images, drawn in the order given
    #[arg(short, long = "baseimages", num_args = 0.., value_name = "DESCRIPTOR")]
    bases: Vec<String>,

    /// label images, drawn over the base images with a categorical colormap
    #[arg(short, long = "labelimages", num_args = 0.., value_name = "DESCRIPTOR")]
    labels: Vec<String>,

    /// Number for the axis you want to slice along:
    ///     0 -> X, 1 -> Y, 2 -> Z.
    #[arg(short = 'd', long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=2))]
    slicedim: u8,

    /// explicit slice numbers to show, in order
    #[arg(short, long, num_args = 1.., conflicts_with = "nslices")]
    slicenumbers: Vec<usize>,

    /// number of evenly spaced slices to show (at least 2)
    #[arg(short, long)]
    nslices: Option<usize>,

    /// repeat pixels so that slices are shown with square pixels
    #[arg(short, long)]
    isotropic: bool,

    /// with --isotropic, round spacing ratios that are not whole numbers
    #[arg(short, long, requires = "isotropic")]
    approximate: bool,

    /// more output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_specs(descriptors: &[String]) -> Result<Vec<ChannelSpec>, SliceError> {
    descriptors.iter().map(|d| d.parse()).collect()
}

fn run(cli: Args) -> Result<(), SliceError> {
    let selection = match (cli.nslices, cli.slicenumbers.is_empty()) {
        (Some(n), _) => SliceSelection::Count(n),
        (None, false) => SliceSelection::Indices(cli.slicenumbers),
        (None, true) => SliceSelection::Middle,
    };
    let options = RenderOptions {
        bases: parse_specs(&cli.bases)?,
        labels: parse_specs(&cli.labels)?,
        axis: Direction::try_from(usize::from(cli.slicedim))?,
        selection,
        isotropic: cli.isotropic,
        approximate: cli.approximate,
    };
    create_slice(&options, &cli.out)?;
    Ok(())
}

/// Main function that parses commandline arguments and runs the program.
fn main() {
    let cli = Args::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        })
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error! {}", e);
        std::process::exit(-2);
    }
}
