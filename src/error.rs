use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported host platform: {os} ({arch})")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Packaging tool not found: {}", .0.display())]
    ToolNotFound(PathBuf),

    #[error("Firmware image not found: {}", .0.display())]
    MissingFirmware(PathBuf),

    #[error("CP core app not found: {} - T5 requires the CP core to initialize WiFi/BLE before the AP core", .0.display())]
    MissingCpFirmware(PathBuf),

    #[error("Unsupported chip: {:?}", _0)]
    UnsupportedChip(String),

    #[error("{tool} exited with {status}")]
    ToolFailed { tool: String, status: ExitStatus },

    #[error("{tool} did not produce {}", .path.display())]
    MissingOutput { tool: String, path: PathBuf },

    #[error("Symbol {symbol} is generated by both {first:?} and {second:?}")]
    SymbolCollision {
        symbol: String,
        first: String,
        second: String,
    },

    #[error("I/O error: {}", _0)]
    IoError(#[from] io::Error),

    #[error("JSON error: {}", _0)]
    JsonError(#[from] serde_json::Error),
}
