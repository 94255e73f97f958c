//! The partition manifest consumed by the vendor image generator

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use super::Chip;
use crate::Error;

const T3_TEMPLATE: &str = include_str!("templates/t3.json");
const T5_TEMPLATE: &str = include_str!("templates/t5.json");

/// One flashable image and its placement in flash
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Path of the image to pack
    pub firmware: PathBuf,
    pub version: String,
    /// The partition name
    pub partition: String,
    /// Flash offset as a hex string, e.g. `0x00010000`
    pub start_addr: String,
    /// Partition size in kilobytes with a `K` suffix, e.g. `64K`
    pub size: String,
}

impl Section {
    /// Parses `start_addr`, returning `None` if it isn't a `0x` prefixed hex number
    pub fn start_address(&self) -> Option<u32> {
        let digits = self
            .start_addr
            .strip_prefix("0x")
            .or_else(|| self.start_addr.strip_prefix("0X"))?;

        u32::from_str_radix(digits, 16).ok()
    }

    /// Parses `size` into a number of bytes
    pub fn size_in_bytes(&self) -> Option<u32> {
        let kilobytes: u32 = self.size.strip_suffix('K')?.parse().ok()?;

        kilobytes.checked_mul(1024)
    }
}

/// The manifest layout understood by `cmake_Gen_image`
///
/// Field names and order are fixed by the external tool.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub magic: String,
    pub version: String,
    /// Number of entries in `section`
    pub count: usize,
    pub section: Vec<Section>,
}

impl Manifest {
    /// Loads the stock partition layout of `chip`
    pub fn template(chip: Chip) -> Result<Manifest, Error> {
        let template = match chip {
            Chip::T3 => T3_TEMPLATE,
            Chip::T5 => T5_TEMPLATE,
        };

        Ok(serde_json::from_str(template)?)
    }

    /// Replaces the firmware path of each section, in order, with `images`
    pub fn set_firmware<P: AsRef<Path>>(&mut self, images: &[P]) {
        debug_assert_eq!(images.len(), self.section.len());

        for (section, image) in self.section.iter_mut().zip(images) {
            section.firmware = image.as_ref().to_path_buf();
        }
    }

    /// Serializes the manifest as JSON indented with four spaces
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), Error> {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);

        self.serialize(&mut serializer)?;

        Ok(())
    }
}
