//! Mock release source for testing checks without network calls.

use super::{Release, ReleaseAsset, ReleaseSource};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A release source that serves one pre-configured release.
pub struct MockReleaseSource {
    release: Option<Release>,
    calls: AtomicUsize,
}

impl MockReleaseSource {
    /// Create a source whose latest release has the given tag and no assets.
    pub fn new(tag_name: &str) -> Self {
        Self {
            release: Some(Release {
                tag_name: tag_name.to_string(),
                assets: Vec::new(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a source whose lookups always fail.
    pub fn failing() -> Self {
        Self {
            release: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Append an asset, keeping payload order.
    pub fn with_asset(mut self, name: &str) -> Self {
        if let Some(release) = self.release.as_mut() {
            release.assets.push(ReleaseAsset {
                name: name.to_string(),
            });
        }
        self
    }

    pub fn with_assets(self, names: &[&str]) -> Self {
        names.iter().fold(self, |source, name| source.with_asset(name))
    }

    /// Number of lookups served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseSource for MockReleaseSource {
    async fn latest_release(&self) -> Result<Release> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release
            .clone()
            .ok_or_else(|| anyhow!("mock release lookup failed"))
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_source_basic() {
        let source = MockReleaseSource::new("4.1.20210417")
            .with_asset("Winpython64-3.9.4.0dot.exe")
            .with_assets(&["a", "b"]);

        let release = source.latest_release().await.unwrap();
        assert_eq!(release.tag_name, "4.1.20210417");
        assert_eq!(
            release.asset_names().collect::<Vec<_>>(),
            vec!["Winpython64-3.9.4.0dot.exe", "a", "b"]
        );
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_source_failing() {
        let source = MockReleaseSource::failing().with_asset("ignored");
        assert!(source.latest_release().await.is_err());
        assert_eq!(source.describe(), "mock");
    }
}
