use std::path::PathBuf;

use fwpack::Chip;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
pub enum Command {
    /// Convert localized mp3 files into C arrays
    Media(MediaOpts),
    /// Pack the bootloader and application images into a flashable image
    Package(PackageOpts),
}

#[derive(StructOpt, Debug)]
pub struct MediaOpts {
    /// The directory containing the *zh.mp3 and *en.mp3 files
    pub directory: PathBuf,
}

#[derive(StructOpt, Debug)]
pub struct PackageOpts {
    /// The target chip, t3 or t5
    #[structopt(short = "c", long = "chip", env = "FWPACK_CHIP")]
    pub chip: Chip,
    /// Directory holding the vendor tools and bootloader images
    #[structopt(short = "t", long = "tools-path", env = "FWPACK_TOOLS_PATH")]
    pub tools_path: PathBuf,
    /// Directory to write the packed image to
    #[structopt(short = "o", long = "output-path", env = "FWPACK_OUTPUT_PATH")]
    pub output_path: PathBuf,
    /// The application image to pack
    #[structopt(short = "b", long = "bin-file", env = "FWPACK_BIN_FILE")]
    pub bin_file: PathBuf,
    /// Name of the sketch, used for the output filename
    #[structopt(short = "n", long = "sketch-name", env = "FWPACK_SKETCH_NAME")]
    pub sketch_name: String,
    /// Version of the sketch, used for the output filename
    #[structopt(short = "v", long = "sketch-version", env = "FWPACK_SKETCH_VERSION")]
    pub sketch_version: String,
}

#[derive(StructOpt, Debug)]
#[structopt(name = "fwpack")]
pub struct Opts {
    #[structopt(subcommand)]
    pub command: Command,
}
