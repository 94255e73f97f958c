//! Host platform detection for the vendor packaging tools

use std::env::consts;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::Error;

/// Filename of the image generator, without the platform's executable suffix
const GEN_IMAGE_TOOL: &str = "cmake_Gen_image";
/// Filename of the CRC tool, without the platform's executable suffix
const ENCRYPT_CRC_TOOL: &str = "cmake_encrypt_crc";

/// Where the vendor ships its tool binaries for one platform
struct ToolLayout {
    os: &'static str,
    /// `None` matches any architecture
    arch: Option<&'static str>,
    /// Subdirectory of the tools path holding the binaries
    subdir: &'static [&'static str],
    exe_suffix: &'static str,
}

const TOOL_LAYOUTS: &[ToolLayout] = &[
    ToolLayout {
        os: "windows",
        arch: None,
        subdir: &["windows"],
        exe_suffix: ".exe",
    },
    ToolLayout {
        os: "linux",
        arch: None,
        subdir: &["linux"],
        exe_suffix: "",
    },
    ToolLayout {
        os: "macos",
        arch: Some("aarch64"),
        subdir: &["mac", "arm64"],
        exe_suffix: "",
    },
    ToolLayout {
        os: "macos",
        arch: Some("x86_64"),
        subdir: &["mac", "x86_64"],
        exe_suffix: "",
    },
];

/// An operating system and CPU architecture pair, named like `std::env::consts`
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new<S: Into<String>, T: Into<String>>(os: S, arch: T) -> Platform {
        Platform {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this binary was compiled for
    pub fn host() -> Platform {
        Platform::new(consts::OS, consts::ARCH)
    }

    fn layout(&self) -> Option<&'static ToolLayout> {
        TOOL_LAYOUTS.iter().find(|layout| {
            layout.os == self.os && layout.arch.map_or(true, |arch| arch == self.arch)
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Paths of the two vendor tools used to build a flashable image
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tools {
    /// Concatenates images according to a partition manifest
    pub gen_image: PathBuf,
    /// Appends the checksum to a packed image
    pub encrypt_crc: PathBuf,
}

impl Tools {
    /// Resolves the tool paths under `tools_path` for `platform`
    ///
    /// Returns `Error::UnsupportedPlatform` when the vendor ships no tools for `platform`. The
    /// returned paths are not checked for existence.
    pub fn resolve<P: AsRef<Path>>(platform: &Platform, tools_path: P) -> Result<Tools, Error> {
        let layout = platform
            .layout()
            .ok_or_else(|| Error::UnsupportedPlatform {
                os: platform.os.clone(),
                arch: platform.arch.clone(),
            })?;

        let mut dir = tools_path.as_ref().to_path_buf();
        dir.extend(layout.subdir);

        Ok(Tools {
            gen_image: dir.join(format!("{}{}", GEN_IMAGE_TOOL, layout.exe_suffix)),
            encrypt_crc: dir.join(format!("{}{}", ENCRYPT_CRC_TOOL, layout.exe_suffix)),
        })
    }

    /// Returns the first tool that does not exist on disk, if any
    pub fn find_missing(&self) -> Option<&Path> {
        [&self.gen_image, &self.encrypt_crc]
            .iter()
            .copied()
            .find(|path| !path.exists())
            .map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_resolve_windows_tools() {
        let tools = Tools::resolve(&Platform::new("windows", "x86_64"), "tools").unwrap();

        assert_eq!(
            tools.gen_image,
            Path::new("tools").join("windows").join("cmake_Gen_image.exe")
        );
        assert_eq!(
            tools.encrypt_crc,
            Path::new("tools").join("windows").join("cmake_encrypt_crc.exe")
        );
    }

    #[test]
    fn it_should_resolve_linux_tools_for_any_arch() {
        for arch in &["x86_64", "aarch64"] {
            let tools = Tools::resolve(&Platform::new("linux", *arch), "/opt/t5").unwrap();

            assert_eq!(tools.gen_image, Path::new("/opt/t5/linux/cmake_Gen_image"));
            assert_eq!(tools.encrypt_crc, Path::new("/opt/t5/linux/cmake_encrypt_crc"));
        }
    }

    #[test]
    fn it_should_resolve_mac_tools_per_arch() {
        let arm = Tools::resolve(&Platform::new("macos", "aarch64"), "/opt/t5").unwrap();
        let intel = Tools::resolve(&Platform::new("macos", "x86_64"), "/opt/t5").unwrap();

        assert_eq!(arm.gen_image, Path::new("/opt/t5/mac/arm64/cmake_Gen_image"));
        assert_eq!(intel.encrypt_crc, Path::new("/opt/t5/mac/x86_64/cmake_encrypt_crc"));
    }

    #[test]
    fn it_should_reject_unsupported_platforms() {
        for platform in &[
            Platform::new("freebsd", "x86_64"),
            Platform::new("macos", "powerpc"),
        ] {
            match Tools::resolve(platform, "/opt/t5") {
                Err(Error::UnsupportedPlatform { os, arch }) => {
                    assert_eq!(os, platform.os);
                    assert_eq!(arch, platform.arch);
                }
                other => panic!("expected unsupported platform, got {:?}", other),
            }
        }
    }

    #[test]
    fn it_should_report_missing_tools() {
        let tools = Tools {
            gen_image: PathBuf::from("/nonexistent/cmake_Gen_image"),
            encrypt_crc: PathBuf::from("/nonexistent/cmake_encrypt_crc"),
        };

        assert_eq!(
            tools.find_missing(),
            Some(Path::new("/nonexistent/cmake_Gen_image"))
        );
    }
}
