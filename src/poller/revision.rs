//! Revisions reported to the host, and when a release counts as new

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::forge::release::ModuleRelease;
use crate::forge::version::Version;

/// Key under which a revision records where its release can be downloaded
pub const LOCATION: &str = "LOCATION";

/// The host's record of an observed package state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRevision {
    /// The release's version string
    pub revision: String,
    /// When the release was observed
    pub timestamp: DateTime<Utc>,
    pub data: IndexMap<String, String>,
}

impl PackageRevision {
    pub fn new(revision: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            revision: revision.into(),
            timestamp,
            data: IndexMap::new(),
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.data.get(LOCATION).map(String::as_str)
    }
}

impl From<ModuleRelease> for PackageRevision {
    fn from(release: ModuleRelease) -> Self {
        let mut revision = PackageRevision::new(release.raw_version, Utc::now());
        revision.data.insert(LOCATION.to_string(), release.download_url);
        revision
    }
}

/// Whether a freshly fetched release should be reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionOutcome {
    NewRevision(ModuleRelease),
    NoChange,
}

impl RevisionOutcome {
    pub fn into_revision(self) -> Option<PackageRevision> {
        match self {
            RevisionOutcome::NewRevision(release) => Some(release.into()),
            RevisionOutcome::NoChange => None,
        }
    }
}

/// Compare a candidate release against the last revision the host recorded
///
/// The candidate is new only if its version is strictly greater than the
/// last-known one, so an older or equal release never replaces a newer
/// record. Without a usable last-known revision the candidate is always new.
pub fn latest_known_comparison(
    candidate: ModuleRelease,
    last_known: Option<&str>,
) -> RevisionOutcome {
    let Some(last_known) = last_known.map(str::trim).filter(|s| !s.is_empty()) else {
        return RevisionOutcome::NewRevision(candidate);
    };

    let last_known_version = match Version::parse(last_known) {
        Ok(version) => version,
        Err(e) => {
            warn!(
                "Ignoring unparseable last known revision '{}': {}",
                last_known, e
            );
            return RevisionOutcome::NewRevision(candidate);
        }
    };

    if candidate.version > last_known_version {
        RevisionOutcome::NewRevision(candidate)
    } else {
        debug!(
            "Latest release {} is not newer than last known revision {}",
            candidate.version, last_known_version
        );
        RevisionOutcome::NoChange
    }
}
