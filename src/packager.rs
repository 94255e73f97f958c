//! Assembles the bootloader and application images of a T3/T5 build into one flashable image
//!
//! The heavy lifting is done by two vendor tools: `cmake_Gen_image` concatenates the images as
//! described by a partition manifest, and `cmake_encrypt_crc` stamps the result with checksums.

mod manifest;
mod platform;

use std::env;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use log::{debug, error, info};

use crate::Error;

pub use manifest::{Manifest, Section};
pub use platform::{Platform, Tools};

/// Manifest handed to the image generator
const CONFIG_FILE: &str = "config.json";
/// Output of the image generator
const PACK_FILE: &str = "all_app_pack.bin";
/// Output of the CRC tool, derived by the tool from `PACK_FILE`
const PACK_CRC_FILE: &str = "all_app_pack_crc.bin";
/// Communications processor image shipped with the T5 tools
const CP_APP_FILE: &str = "t5_cp_app.bin";

/// The supported chip variants
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Chip {
    /// Single core
    T3,
    /// Dual core, with a communications processor that brings up WiFi/BLE before the application
    /// processor starts
    T5,
}

impl Chip {
    pub fn name(self) -> &'static str {
        match self {
            Chip::T3 => "t3",
            Chip::T5 => "t5",
        }
    }

    /// Whether a communications processor image has to be packed before the application
    pub fn is_dual_core(self) -> bool {
        self == Chip::T5
    }
}

impl FromStr for Chip {
    type Err = Error;

    fn from_str(s: &str) -> Result<Chip, Error> {
        match s.to_ascii_lowercase().as_str() {
            "t3" => Ok(Chip::T3),
            "t5" => Ok(Chip::T5),
            _ => Err(Error::UnsupportedChip(s.to_string())),
        }
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum BuilderError {
    #[error("Missing {} value in ChipContextBuilder", _0)]
    MissingField(&'static str),
}

/// Everything needed to package one sketch build
#[derive(Debug, Clone)]
pub struct ChipContext {
    chip: Chip,
    /// Directory holding the vendor tools, the bootloader and the CP image
    tools_path: PathBuf,
    /// Directory receiving `config.json`, the intermediate images and the final image
    output_path: PathBuf,
    /// The application image
    bin_file: PathBuf,
    sketch_name: String,
    sketch_version: String,
    platform: Platform,
}

impl ChipContext {
    pub fn builder() -> ChipContextBuilder {
        ChipContextBuilder::default()
    }

    pub fn chip(&self) -> Chip {
        self.chip
    }

    /// Filename of the final image, `<sketch>_QIO_<version>.bin`
    pub fn output_file_name(&self) -> String {
        format!("{}_QIO_{}.bin", self.sketch_name, self.sketch_version)
    }
}

#[derive(Debug, Default)]
pub struct ChipContextBuilder {
    chip: Option<Chip>,
    tools_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    bin_file: Option<PathBuf>,
    sketch_name: Option<String>,
    sketch_version: Option<String>,
    platform: Option<Platform>,
}

impl ChipContextBuilder {
    pub fn chip(&mut self, chip: Chip) -> &mut ChipContextBuilder {
        self.chip = Some(chip);
        self
    }

    pub fn tools_path<P: Into<PathBuf>>(&mut self, tools_path: P) -> &mut ChipContextBuilder {
        self.tools_path = Some(tools_path.into());
        self
    }

    pub fn output_path<P: Into<PathBuf>>(&mut self, output_path: P) -> &mut ChipContextBuilder {
        self.output_path = Some(output_path.into());
        self
    }

    pub fn bin_file<P: Into<PathBuf>>(&mut self, bin_file: P) -> &mut ChipContextBuilder {
        self.bin_file = Some(bin_file.into());
        self
    }

    pub fn sketch_name<S: Into<String>>(&mut self, sketch_name: S) -> &mut ChipContextBuilder {
        self.sketch_name = Some(sketch_name.into());
        self
    }

    pub fn sketch_version<S: Into<String>>(
        &mut self,
        sketch_version: S,
    ) -> &mut ChipContextBuilder {
        self.sketch_version = Some(sketch_version.into());
        self
    }

    /// Overrides the platform used to locate the vendor tools, which defaults to the host
    pub fn platform(&mut self, platform: Platform) -> &mut ChipContextBuilder {
        self.platform = Some(platform);
        self
    }

    /// Builds the final ChipContext from this ChipContextBuilder
    pub fn build(&self) -> Result<ChipContext, BuilderError> {
        Ok(ChipContext {
            chip: self.chip.ok_or(BuilderError::MissingField("chip"))?,
            tools_path: require(&self.tools_path, "tools_path")?,
            output_path: require(&self.output_path, "output_path")?,
            bin_file: require(&self.bin_file, "bin_file")?,
            sketch_name: require(&self.sketch_name, "sketch_name")?,
            sketch_version: require(&self.sketch_version, "sketch_version")?,
            platform: self.platform.clone().unwrap_or_else(Platform::host),
        })
    }
}

fn require<T: Clone>(value: &Option<T>, name: &'static str) -> Result<T, BuilderError> {
    value.clone().ok_or(BuilderError::MissingField(name))
}

/// Logs `err` at the point of failure and hands it back for propagation
fn log_error(err: Error) -> Error {
    error!("{}", err);
    err
}

/// Resolves `path` against the current directory without touching the process state
fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// Asserts that the input image at `path` exists
fn require_image(path: &Path) -> Result<(), Error> {
    if path.is_file() {
        Ok(())
    } else {
        Err(log_error(Error::MissingFirmware(path.to_path_buf())))
    }
}

/// Runs `command` to completion and asserts that it exited successfully and created `output`
fn run_tool(mut command: Command, output: &Path) -> Result<(), Error> {
    let program = Path::new(command.get_program());
    let tool = program
        .file_name()
        .unwrap_or_else(|| program.as_os_str())
        .to_string_lossy()
        .into_owned();

    debug!("Running {:?}", command);

    let status = command.status()?;

    if !status.success() {
        return Err(log_error(Error::ToolFailed { tool, status }));
    }

    if !output.exists() {
        return Err(log_error(Error::MissingOutput {
            tool,
            path: output.to_path_buf(),
        }));
    }

    Ok(())
}

/// Removes a leftover `path` from a previous run so a stale file can't pass as tool output
fn remove_stale(path: &Path) -> Result<(), Error> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed stale {}", path.display());
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Packs the images of `context` into `<output_path>/<sketch>_QIO_<version>.bin`
///
/// Fails at the first unmet precondition or failing tool. Files written before the failure are
/// left in place, and nothing is retried.
pub fn package(context: &ChipContext) -> Result<PathBuf, Error> {
    let chip = context.chip;
    let tools_path = absolute(&context.tools_path)?;
    let output_path = absolute(&context.output_path)?;
    let bin_file = absolute(&context.bin_file)?;

    debug!("platform: {}", context.platform);

    let tools = Tools::resolve(&context.platform, &tools_path).map_err(log_error)?;
    let bootloader = tools_path.join(format!("{}_bootloader.bin", chip));

    debug!("cmake_Gen_image: {}", tools.gen_image.display());
    debug!("cmake_encrypt_crc: {}", tools.encrypt_crc.display());
    debug!("bootloader: {}", bootloader.display());

    if let Some(missing) = tools.find_missing() {
        return Err(log_error(Error::ToolNotFound(missing.to_path_buf())));
    }

    require_image(&bootloader)?;

    let mut images = vec![bootloader];

    if chip.is_dual_core() {
        let cp_app = tools_path.join(CP_APP_FILE);

        if !cp_app.is_file() {
            return Err(log_error(Error::MissingCpFirmware(cp_app)));
        }

        info!(
            "{} dual-core: CP={}, AP={}",
            chip,
            cp_app.display(),
            bin_file.display()
        );

        images.push(cp_app);
    }

    require_image(&bin_file)?;
    images.push(bin_file);

    let mut manifest = Manifest::template(chip)?;
    manifest.set_firmware(&images);

    for section in &manifest.section {
        debug!(
            "section {}: {} @ {} ({})",
            section.partition,
            section.firmware.display(),
            section.start_addr,
            section.size
        );
    }

    let config_file = output_path.join(CONFIG_FILE);
    {
        let mut writer = BufWriter::new(File::create(&config_file)?);
        manifest.write_to(&mut writer)?;
        writer.flush()?;
    }

    let pack_file = output_path.join(PACK_FILE);
    let pack_crc_file = output_path.join(PACK_CRC_FILE);

    remove_stale(&pack_file)?;
    remove_stale(&pack_crc_file)?;

    let mut gen_image = Command::new(&tools.gen_image);
    gen_image
        .current_dir(&output_path)
        .arg("genfile")
        .arg("-injsonfile")
        .arg(&config_file)
        .arg("-infile")
        .args(&images)
        .arg("-outfile")
        .arg(&pack_file);

    run_tool(gen_image, &pack_file)?;

    let mut encrypt_crc = Command::new(&tools.encrypt_crc);
    encrypt_crc
        .current_dir(&output_path)
        .arg("-crc")
        .arg(&pack_file);

    run_tool(encrypt_crc, &pack_crc_file)?;

    let qio_file = output_path.join(context.output_file_name());
    fs::rename(&pack_crc_file, &qio_file)?;

    info!("Packed {} image {}", chip, qio_file.display());

    Ok(qio_file)
}
