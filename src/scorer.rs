//! Best-effort match between the pinned Python version and the installers
//! of the latest release.

use crate::asset::AssetPattern;
use crate::version::{Confidence, FormatError, Version};
use std::fmt;
use tracing::debug;

/// How well the release covers the pinned Python version
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchResult {
    pub confidence: Confidence,
    /// Python version embedded in the best installer found
    pub best_match: Option<String>,
}

impl MatchResult {
    pub fn level(&self) -> u8 {
        self.confidence.level()
    }
}

/// Prints the machine-readable `<level>;<match>` line; `None` when nothing matched
impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{}",
            self.confidence,
            self.best_match.as_deref().unwrap_or("None")
        )
    }
}

/// Scan asset names in payload order for the installer closest to `pinned`.
///
/// The best match changes only when an installer shares a strictly longer
/// version prefix with the pin, and the scan stops at the first exact match.
/// A malformed version inside an installer name aborts the scan.
pub fn score_assets<'a, I>(
    asset_names: I,
    pattern: &AssetPattern,
    pinned: &Version,
) -> Result<MatchResult, FormatError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut result = MatchResult::default();

    for name in asset_names {
        let Some(embedded) = pattern.extract_version(name) else {
            continue;
        };

        let candidate = Version::parse(embedded)?;
        let next = result
            .confidence
            .next(pinned.common_prefix_len(&candidate));

        if next > result.confidence {
            debug!("{} raises confidence to {}", name, next.level());
            result.confidence = next;
            result.best_match = Some(embedded.to_string());
        }

        if result.confidence.is_exact() {
            break;
        }
    }

    Ok(result)
}
