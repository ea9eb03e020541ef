//! The two report modes.
//!
//! `wp` compares the pinned WinPython tag with the latest release and tells
//! CI through the exit code whether the pin needs bumping. `py` prints how
//! closely the latest installers match the pinned Python version.

use crate::asset::AssetPattern;
use crate::pins::Pins;
use crate::registry::{Release, ReleaseSource};
use crate::scorer::{MatchResult, score_assets};
use crate::version::Version;
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;
use tracing::{debug, info};

/// Exit status of the exact-comparison check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Already on the latest WinPython release
    UpToDate,
    /// A newer release exists and ships the pinned Python version
    UpdateAvailable,
    /// A newer release exists but doesn't ship the pinned Python version
    UpdateIncompatible,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::UpToDate => 0,
            ExitStatus::UpdateAvailable => 1,
            ExitStatus::UpdateIncompatible => 2,
        }
    }
}

/// Result of comparing the pins with a release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExactOutcome {
    /// The release ships an installer for the pinned Python version
    pub found: bool,
    /// The release tag equals the pinned WinPython version
    pub up_to_date: bool,
}

impl ExactOutcome {
    pub fn evaluate(release: &Release, pattern: &AssetPattern, pins: &Pins) -> Self {
        let wanted = pattern.file_name(&pins.python);
        let found = release.asset_names().any(|name| name == wanted);

        Self {
            found,
            up_to_date: release.tag_name == pins.winpython,
        }
    }

    pub fn status(self) -> ExitStatus {
        match (self.up_to_date, self.found) {
            (true, _) => ExitStatus::UpToDate,
            (false, true) => ExitStatus::UpdateAvailable,
            (false, false) => ExitStatus::UpdateIncompatible,
        }
    }
}

/// Run the exact-comparison check and print its human-readable report
pub async fn run_exact<S, W>(
    source: &S,
    pins: &Pins,
    pattern: &AssetPattern,
    out: &mut W,
) -> Result<ExitStatus>
where
    S: ReleaseSource + ?Sized,
    W: Write,
{
    writeln!(out, "Currently using WinPython version: {}", pins.winpython.bold())?;
    writeln!(out, "Which uses python version: {}", pins.python.bold())?;

    debug!("Fetching latest release from {}", source.describe());
    let release = source.latest_release().await?;
    info!(
        "Latest release {} has {} asset(s)",
        release.tag_name,
        release.assets.len()
    );

    let outcome = ExactOutcome::evaluate(&release, pattern, pins);
    if outcome.found {
        writeln!(
            out,
            "The latest WinPython version contains the current python version {}: there's nothing to do manually",
            pins.python
        )?;
    }

    let status = outcome.status();
    let message = match status {
        ExitStatus::UpToDate => format!(
            "Currently using the latest WinPython version: exiting with code {}",
            status.code()
        )
        .green(),
        ExitStatus::UpdateAvailable => format!(
            "The new WinPython version has the current python version: exiting with code {}",
            status.code()
        )
        .yellow(),
        ExitStatus::UpdateIncompatible => format!(
            "The new WinPython version does NOT have the current python version: exiting with code {}",
            status.code()
        )
        .red(),
    };
    writeln!(out, "{}", message)?;

    Ok(status)
}

/// Run the confidence check and print the `<level>;<match>` line without a newline
pub async fn run_confidence<S, W>(
    source: &S,
    python_version: &str,
    pattern: &AssetPattern,
    out: &mut W,
) -> Result<MatchResult>
where
    S: ReleaseSource + ?Sized,
    W: Write,
{
    let pinned = Version::parse(python_version).context("Invalid pinned Python version")?;

    debug!("Fetching latest release from {}", source.describe());
    let release = source.latest_release().await?;

    let result = score_assets(release.asset_names(), pattern, &pinned)
        .with_context(|| format!("Invalid installer name in release {}", release.tag_name))?;
    info!(
        "Confidence {} for python {} ({} arch)",
        result.level(),
        pinned,
        pattern.arch()
    );

    write!(out, "{}", result)?;
    out.flush()?;

    Ok(result)
}
