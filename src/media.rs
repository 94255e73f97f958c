//! Localized audio prompts packed into C arrays for static linking
//!
//! Every `*zh.mp3` and `*en.mp3` file in a directory becomes one `CONST BYTE_T` array. The arrays
//! of each locale are declared in `media_src_<locale>.h`, defined in `media_src_<locale>.c`, and
//! both locale headers are pulled in by `media_src.h`. All of them are written next to the input
//! directory, i.e. into `<directory>/..`.

mod render;

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::Error;

pub use render::{write_header, write_source, write_umbrella_header};

/// Extension of the files picked up by `MediaSet::scan`
const ASSET_EXTENSION: &str = ".mp3";

/// Prefix of every generated array symbol
const SYMBOL_PREFIX: &str = "media_src_";

/// Name of the header that includes every locale header
pub const UMBRELLA_HEADER: &str = "media_src.h";

/// The language an audio asset belongs to
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Locale {
    Zh,
    En,
}

impl Locale {
    /// Every locale, in the order the generated files are emitted
    pub const ALL: [Locale; 2] = [Locale::Zh, Locale::En];

    /// Returns the lower-case tag used in filenames
    pub fn tag(self) -> &'static str {
        match self {
            Locale::Zh => "zh",
            Locale::En => "en",
        }
    }

    /// Classifies an asset by the suffix of its `filename`, returning `None` for files that are
    /// not localized mp3 files
    pub fn from_filename(filename: &str) -> Option<Locale> {
        if filename.ends_with("zh.mp3") {
            Some(Locale::Zh)
        } else if filename.ends_with("en.mp3") {
            Some(Locale::En)
        } else {
            None
        }
    }

    /// The include guard of this locale's header
    pub fn include_guard(self) -> String {
        format!("__MEDIA_SRC_{}_H__", self.tag().to_uppercase())
    }

    pub fn header_name(self) -> String {
        format!("media_src_{}.h", self.tag())
    }

    pub fn source_name(self) -> String {
        format!("media_src_{}.c", self.tag())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single audio file read into memory
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AudioAsset {
    /// The filename without its `.mp3` extension
    name: String,
    /// The raw file contents
    data: Vec<u8>,
}

impl AudioAsset {
    pub fn new<S: Into<String>>(name: S, data: Vec<u8>) -> AudioAsset {
        AudioAsset {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The C symbol of the array holding this asset
    pub fn symbol(&self) -> String {
        symbol_name(&self.name)
    }
}

/// Derives the array symbol for the asset with the base filename `name`
///
/// Anything that isn't valid in a C identifier, most commonly `-`, is replaced with `_`.
pub fn symbol_name(name: &str) -> String {
    let mut symbol = String::with_capacity(SYMBOL_PREFIX.len() + name.len());

    symbol.push_str(SYMBOL_PREFIX);
    symbol.extend(name.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        }
    }));

    symbol
}

/// The assets of a directory grouped by locale, each group in filename order
#[derive(Debug, Default)]
pub struct MediaSet {
    zh: Vec<AudioAsset>,
    en: Vec<AudioAsset>,
}

impl MediaSet {
    /// Reads every localized mp3 file in `directory`
    ///
    /// Files are visited in sorted filename order so the generated output is stable between runs.
    pub fn scan<P: AsRef<Path>>(directory: P) -> Result<MediaSet, Error> {
        let mut filenames = Vec::new();

        for entry in fs::read_dir(directory.as_ref())? {
            let entry = entry?;

            match entry.file_name().into_string() {
                Ok(filename) => filenames.push(filename),
                Err(filename) => warn!("Skipping non UTF-8 filename {:?}", filename),
            }
        }

        filenames.sort();

        let mut media = MediaSet::default();

        for filename in filenames {
            if !filename.ends_with(ASSET_EXTENSION) {
                continue;
            }

            let locale = match Locale::from_filename(&filename) {
                Some(locale) => locale,
                None => {
                    debug!("Skipping {} without a locale suffix", filename);
                    continue;
                }
            };

            let data = fs::read(directory.as_ref().join(&filename))?;
            let name = &filename[..filename.len() - ASSET_EXTENSION.len()];

            debug!("Read {} ({} bytes) as {}", filename, data.len(), locale);

            media.push(locale, AudioAsset::new(name, data));
        }

        Ok(media)
    }

    /// Appends `asset` to the assets of `locale`
    pub fn push(&mut self, locale: Locale, asset: AudioAsset) {
        match locale {
            Locale::Zh => self.zh.push(asset),
            Locale::En => self.en.push(asset),
        }
    }

    pub fn assets(&self, locale: Locale) -> &[AudioAsset] {
        match locale {
            Locale::Zh => &self.zh,
            Locale::En => &self.en,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.zh.is_empty() && self.en.is_empty()
    }

    /// Asserts that no two assets map to the same array symbol
    ///
    /// Both locales end up in the same link unit, so symbols are checked across locales too.
    pub fn check_symbols(&self) -> Result<(), Error> {
        let mut seen: HashMap<String, &str> = HashMap::new();

        for &locale in Locale::ALL.iter() {
            for asset in self.assets(locale) {
                let symbol = asset.symbol();

                if let Some(first) = seen.get(&symbol) {
                    return Err(Error::SymbolCollision {
                        symbol,
                        first: (*first).to_string(),
                        second: asset.name().to_string(),
                    });
                }

                seen.insert(symbol, asset.name());
            }
        }

        Ok(())
    }
}

/// Files written by `generate`
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Generated {
    pub header: PathBuf,
    /// The matching source file, absent for the umbrella header
    pub source: Option<PathBuf>,
}

/// Converts the assets in `directory` and writes the generated files into its parent
///
/// Existing files are overwritten. The umbrella header is always written, even when a locale has
/// no assets.
pub fn generate<P: AsRef<Path>>(directory: P) -> Result<Vec<Generated>, Error> {
    let directory = directory.as_ref();
    let media = MediaSet::scan(directory)?;

    media.check_symbols()?;

    let output_dir = directory.join("..");
    let mut generated = Vec::with_capacity(Locale::ALL.len() + 1);

    for &locale in Locale::ALL.iter() {
        let assets = media.assets(locale);

        if assets.is_empty() {
            continue;
        }

        let header = output_dir.join(locale.header_name());
        let source = output_dir.join(locale.source_name());

        let mut writer = BufWriter::new(File::create(&header)?);
        write_header(&mut writer, locale, assets)?;
        writer.flush()?;

        let mut writer = BufWriter::new(File::create(&source)?);
        write_source(&mut writer, locale, assets)?;
        writer.flush()?;

        generated.push(Generated {
            header,
            source: Some(source),
        });
    }

    let umbrella = output_dir.join(UMBRELLA_HEADER);
    let mut writer = BufWriter::new(File::create(&umbrella)?);
    write_umbrella_header(&mut writer)?;
    writer.flush()?;

    generated.push(Generated {
        header: umbrella,
        source: None,
    });

    Ok(generated)
}
