pub mod confidence;

pub use confidence::Confidence;

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of dot-separated components in a WinPython/Python pin
const COMPONENTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("version '{input}' must be in this format: x.y.w.z (found {found} component(s))")]
pub struct FormatError {
    pub input: String,
    pub found: usize,
}

/// A strict four-component dotted version such as `3.9.1.0`.
///
/// Components are kept verbatim and compared as strings, so `"01"` and `"1"`
/// are different and non-numeric parts are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: String,
    pub minor: String,
    pub bug_fix: String,
    pub post_rel_fix: String,
}

impl Version {
    /// Parse `a.b.c.d`; anything other than exactly four parts is a `FormatError`
    pub fn parse(input: &str) -> Result<Self, FormatError> {
        let parts: Vec<&str> = input.split('.').collect();
        let [major, minor, bug_fix, post_rel_fix] = parts[..] else {
            return Err(FormatError {
                input: input.to_string(),
                found: parts.len(),
            });
        };

        Ok(Self {
            major: major.to_string(),
            minor: minor.to_string(),
            bug_fix: bug_fix.to_string(),
            post_rel_fix: post_rel_fix.to_string(),
        })
    }

    /// Components in order, most significant first
    pub fn components(&self) -> [&str; COMPONENTS] {
        [
            self.major.as_str(),
            self.minor.as_str(),
            self.bug_fix.as_str(),
            self.post_rel_fix.as_str(),
        ]
    }

    /// Number of leading components shared with `other` (0..=4)
    pub fn common_prefix_len(&self, other: &Version) -> usize {
        self.components()
            .iter()
            .zip(other.components())
            .take_while(|(a, b)| **a == *b)
            .count()
    }
}

impl FromStr for Version {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.bug_fix, self.post_rel_fix
        )
    }
}
