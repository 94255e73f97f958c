//! Build-time packaging for T3/T5 firmware
//!
//! [`media`] turns localized mp3 prompts into C arrays that are linked into the firmware, and
//! [`packager`] combines the bootloader and application images into a single flashable image.

pub mod media;
pub mod packager;
mod error;

pub use error::Error;

pub use packager::{package, Chip, ChipContext};
