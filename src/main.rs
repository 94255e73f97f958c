use std::path::Path;

use anyhow::Context;
use structopt::StructOpt;

mod cli;

use fwpack::{media, packager, ChipContext};

fn convert_media(directory: &Path) -> Result<(), anyhow::Error> {
    let generated = media::generate(directory).with_context(|| {
        format!(
            "Failed to convert media files in '{}'",
            directory.display()
        )
    })?;

    for files in generated {
        match files.source {
            Some(source) => println!(
                "Generated: {}, {}",
                files.header.display(),
                source.display()
            ),
            None => println!("Generated: {}", files.header.display()),
        }
    }

    Ok(())
}

fn package(opts: &cli::PackageOpts) -> Result<(), anyhow::Error> {
    let context = ChipContext::builder()
        .chip(opts.chip)
        .tools_path(&opts.tools_path)
        .output_path(&opts.output_path)
        .bin_file(&opts.bin_file)
        .sketch_name(&opts.sketch_name)
        .sketch_version(&opts.sketch_version)
        .build()?;

    let qio_file = packager::package(&context)
        .with_context(|| format!("Failed to package {} firmware", opts.chip))?;

    println!("Packed: {}", qio_file.display());

    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    use cli::{Command, MediaOpts};

    // Create a logger with a timestamp, filtered through RUST_LOG
    pretty_env_logger::init_timed();

    // Parse the command-line arguments
    let opts = cli::Opts::from_args();

    match &opts.command {
        Command::Media(MediaOpts { directory }) => convert_media(directory)?,
        Command::Package(package_opts) => package(package_opts)?,
    }

    Ok(())
}
