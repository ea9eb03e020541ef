//! Confidence that an upstream asset carries the pinned Python version.
//!
//! Levels only ever go up. A candidate asset moves the level to
//! `max(current, Candidate, for_prefix(k))` where `k` is the number of leading
//! version components it shares with the pin, so a later asset replaces the
//! best match only when it shares a strictly longer prefix.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Confidence {
    /// No qualifying asset seen yet
    #[default]
    None,
    /// At least one qualifying asset, nothing in common with the pin
    Candidate,
    Major,
    Minor,
    BugFix,
    /// All four components match
    Exact,
}

impl Confidence {
    /// State reached by an asset sharing `prefix_len` leading components
    pub fn for_prefix(prefix_len: usize) -> Self {
        match prefix_len {
            0 => Confidence::Candidate,
            1 => Confidence::Major,
            2 => Confidence::Minor,
            3 => Confidence::BugFix,
            _ => Confidence::Exact,
        }
    }

    /// Transition after seeing one more qualifying asset
    pub fn next(self, prefix_len: usize) -> Self {
        self.max(Self::for_prefix(prefix_len))
    }

    pub fn level(self) -> u8 {
        match self {
            Confidence::None => 0,
            Confidence::Candidate => 1,
            Confidence::Major => 2,
            Confidence::Minor => 3,
            Confidence::BugFix => 4,
            Confidence::Exact => 5,
        }
    }

    pub fn is_exact(self) -> bool {
        self == Confidence::Exact
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}
