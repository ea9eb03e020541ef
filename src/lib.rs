pub mod asset;
pub mod cli;
pub mod config;
pub mod pins;
pub mod registry;
pub mod report;
pub mod scorer;
pub mod version;

pub use asset::{Arch, AssetPattern};
pub use cli::{Cli, Command};
pub use config::{Settings, WpcheckConfig};
pub use pins::Pins;
pub use registry::{GitHubReleases, Release, ReleaseSource};
pub use report::{ExitStatus, run_confidence, run_exact};
pub use scorer::{MatchResult, score_assets};
pub use version::{Confidence, Version};
