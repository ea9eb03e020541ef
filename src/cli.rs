use crate::asset::Arch;
use crate::config::{Settings, WpcheckConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wpcheck")]
#[command(
    author,
    version,
    about = "Check a pinned Python/WinPython version against the latest WinPython release"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// File holding the pinned Python version
    #[arg(long, global = true, value_name = "FILE")]
    pub python_file: Option<PathBuf>,

    /// File holding the pinned WinPython version
    #[arg(long, global = true, value_name = "FILE")]
    pub winpython_file: Option<PathBuf>,

    /// Release endpoint to compare against
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Installer architecture
    #[arg(short, long, global = true, value_enum)]
    pub arch: Option<Arch>,

    /// Path to config file (default: auto-discover .wpcheckrc.toml, wpcheck.toml, or .wpcheckrc)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Compare the pinned WinPython version with the latest release (default).
    /// Exits 0 when up to date, 1 when an update ships the pinned Python
    /// version, 2 when it doesn't. Errors also exit 1 and print a
    /// diagnostic on stderr
    Wp,

    /// Print "<confidence>;<best match>" for the pinned Python version
    Py,

    /// Show version information
    Version,
}

impl Cli {
    /// Flags as a config layer, so they override any config file
    pub fn overrides(&self) -> WpcheckConfig {
        WpcheckConfig {
            url: self.url.clone(),
            python_file: self.python_file.clone(),
            winpython_file: self.winpython_file.clone(),
            arch: self.arch,
        }
    }

    /// Resolve settings from defaults, the config file and flags
    pub fn settings(&self, file_config: Option<WpcheckConfig>) -> Settings {
        let mut config = file_config.unwrap_or_default();
        config.merge(self.overrides());
        Settings::from_config(config)
    }
}
