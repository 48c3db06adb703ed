//! Poller layer driven by the host
//!
//! - [`plugin`]: The host-facing operations (connection checks, latest revision)
//! - [`revision`]: Revision records and the "is this release new" policy

pub mod plugin;
pub mod revision;

pub use plugin::{CheckResult, ForgePoller};
pub use revision::{PackageRevision, RevisionOutcome, latest_known_comparison};
