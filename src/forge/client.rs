//! Forge trait for querying modules on a remote forge

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::config::Configuration;
use crate::forge::error::{ModuleNotFound, PingFailure};
use crate::forge::module_spec::ModuleSpec;
use crate::forge::release::ModuleRelease;

/// Operations the poller needs from a forge
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Forge: Send + Sync {
    /// Base URL of the forge, for logging
    fn url(&self) -> String;

    /// Checks that the forge itself is reachable
    async fn ping(&self) -> Result<(), PingFailure>;

    /// Checks that the module's metadata page exists and is reachable
    async fn ping_module(&self, module: &ModuleSpec) -> Result<(), PingFailure>;

    /// Fetches the module's releases and selects the latest one within the
    /// spec's bounds
    ///
    /// # Returns
    /// * `Ok(ModuleRelease)` - The greatest release with `lower <= version < upper`
    /// * `Err(ModuleNotFound)` - If the module could not be listed or no release is in range
    async fn get_latest_version(&self, module: &ModuleSpec)
    -> Result<ModuleRelease, ModuleNotFound>;
}

/// Builds a forge client from the host's repository configuration
#[cfg_attr(test, automock)]
pub trait ForgeFactory: Send + Sync {
    fn build(&self, repository: &Configuration) -> Arc<dyn Forge>;
}
