//! Forge response shape and release selection

use std::cmp::Ordering;

use serde::Deserialize;

use crate::forge::version::{Version, VersionParseError};

/// One published version of a module
///
/// Ordered solely by version, so two releases of the same version compare
/// equal regardless of where they can be downloaded from.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "ForgeRelease")]
pub struct ModuleRelease {
    pub version: Version,
    /// The version exactly as the forge spelled it
    pub raw_version: String,
    pub download_url: String,
}

impl ModuleRelease {
    pub fn new(version: Version, download_url: impl Into<String>) -> Self {
        Self {
            raw_version: version.to_string(),
            version,
            download_url: download_url.into(),
        }
    }
}

/// A release entry as it appears in the forge's JSON
#[derive(Deserialize)]
struct ForgeRelease {
    version: String,
    file: String,
}

impl TryFrom<ForgeRelease> for ModuleRelease {
    type Error = VersionParseError;

    fn try_from(release: ForgeRelease) -> Result<Self, Self::Error> {
        Ok(Self {
            version: Version::parse(&release.version)?,
            raw_version: release.version,
            download_url: release.file,
        })
    }
}

impl PartialEq for ModuleRelease {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for ModuleRelease {}

impl Ord for ModuleRelease {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}

impl PartialOrd for ModuleRelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A module's metadata as served by the forge
///
/// Only the release list is read; every other field is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleMetadata {
    pub releases: Vec<ModuleRelease>,
}

impl ModuleMetadata {
    /// Releases sorted by version, lowest first
    pub fn ordered_releases(&self) -> Vec<&ModuleRelease> {
        let mut releases: Vec<&ModuleRelease> = self.releases.iter().collect();
        releases.sort();
        releases
    }

    /// The greatest release with `lower <= version < upper`
    ///
    /// Returns `None` when no release falls inside the bounds.
    pub fn latest_within(&self, lower: &Version, upper: &Version) -> Option<&ModuleRelease> {
        self.ordered_releases()
            .into_iter()
            .filter(|release| &release.version >= lower && &release.version < upper)
            .next_back()
    }
}
