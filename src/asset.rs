//! WinPython installer file names.
//!
//! Installers are published as `Winpython64-<python version>dot.exe`
//! (or `Winpython32-` for the 32-bit build).

use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;

const SUFFIX: &str = "dot.exe";

/// Installer architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
pub enum Arch {
    #[value(name = "32")]
    #[serde(rename = "32")]
    X86,
    #[default]
    #[value(name = "64")]
    #[serde(rename = "64")]
    X64,
}

impl Arch {
    pub fn prefix(self) -> &'static str {
        match self {
            Arch::X86 => "Winpython32-",
            Arch::X64 => "Winpython64-",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::X86 => write!(f, "32-bit"),
            Arch::X64 => write!(f, "64-bit"),
        }
    }
}

/// Matches installer names for one architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetPattern {
    arch: Arch,
}

impl AssetPattern {
    pub fn new(arch: Arch) -> Self {
        Self { arch }
    }

    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// Installer name for a given Python version
    pub fn file_name(&self, python_version: &str) -> String {
        format!("{}{}{}", self.arch.prefix(), python_version, SUFFIX)
    }

    /// Embedded Python version, or `None` if the name isn't an installer
    pub fn extract_version<'a>(&self, asset_name: &'a str) -> Option<&'a str> {
        asset_name
            .strip_prefix(self.arch.prefix())?
            .strip_suffix(SUFFIX)
    }

    pub fn matches(&self, asset_name: &str) -> bool {
        self.extract_version(asset_name).is_some()
    }
}
