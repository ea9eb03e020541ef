use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Maximum size for a pin file; pins are a single short line
const MAX_PIN_FILE_SIZE: u64 = 64 * 1024;

/// Locally pinned versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pins {
    /// Python version, e.g. `3.9.1.0`
    pub python: String,
    /// WinPython release tag, e.g. `4.1.20210417`
    pub winpython: String,
}

impl Pins {
    pub fn load(python_file: &Path, winpython_file: &Path) -> Result<Self> {
        Ok(Self {
            python: read_pin(python_file)?,
            winpython: read_pin(winpython_file)?,
        })
    }
}

/// Read a pin file, trimming surrounding whitespace
pub fn read_pin(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Cannot read pin file {}", path.display()))?;
    if metadata.len() > MAX_PIN_FILE_SIZE {
        anyhow::bail!(
            "Pin file {} is too large: {} bytes",
            path.display(),
            metadata.len()
        );
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pin file {}", path.display()))?;
    Ok(content.trim().to_string())
}
