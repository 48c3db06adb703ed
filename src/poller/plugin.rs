//! Host-facing poller operations
//!
//! Each operation builds its own [`ModuleSpec`] and forge client from the
//! configuration the host passes in, so nothing is shared between calls and
//! the host may invoke operations concurrently.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Configuration, FORGE_URL};
use crate::forge::client::ForgeFactory;
use crate::forge::error::render_error;
use crate::forge::module_spec::ModuleSpec;
use crate::poller::revision::{PackageRevision, latest_known_comparison};
use crate::validation::{ValidationError, ValidationResult};

/// Outcome of a connection check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub successful: bool,
    pub messages: Vec<String>,
}

impl CheckResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            successful: true,
            messages: vec![message.into()],
        }
    }

    pub fn failure(messages: Vec<String>) -> Self {
        Self {
            successful: false,
            messages,
        }
    }
}

pub struct ForgePoller<F: ForgeFactory> {
    forge_factory: F,
}

impl<F: ForgeFactory> ForgePoller<F> {
    pub fn new(forge_factory: F) -> Self {
        Self { forge_factory }
    }

    pub fn is_repository_configuration_valid(&self, repository: &Configuration) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Err(error) = validate_forge_url(repository.get(FORGE_URL)) {
            result.add_error(error);
        }
        result
    }

    pub fn is_package_configuration_valid(
        &self,
        package: &Configuration,
        _repository: &Configuration,
    ) -> ValidationResult {
        ModuleSpec::build_for_validation(package).errors()
    }

    pub async fn check_connection_to_repository(&self, repository: &Configuration) -> CheckResult {
        let forge = self.forge_factory.build(repository);

        match forge.ping().await {
            Ok(()) => CheckResult::success("Connection successful"),
            Err(e) => {
                warn!("Connection to forge {} failed: {}", forge.url(), e);
                CheckResult::failure(vec![render_error(&e)])
            }
        }
    }

    pub async fn check_connection_to_package(
        &self,
        package: &Configuration,
        repository: &Configuration,
    ) -> CheckResult {
        let module = match ModuleSpec::build(package) {
            Ok(module) => module,
            Err(errors) => return CheckResult::failure(errors.messages()),
        };
        let forge = self.forge_factory.build(repository);

        match forge.ping_module(&module).await {
            Ok(()) => CheckResult::success(format!("Found {}", module.name())),
            Err(e) => {
                warn!("Module {} not reachable in forge {}: {}", module, forge.url(), e);
                CheckResult::failure(vec![render_error(&e)])
            }
        }
    }

    /// Latest release within the package's bounds, or `None` if there is
    /// nothing to report
    pub async fn get_latest_revision(
        &self,
        package: &Configuration,
        repository: &Configuration,
    ) -> Option<PackageRevision> {
        self.latest_modification_since(package, repository, None)
            .await
    }

    /// Latest release, but only if it is newer than `last_known`
    pub async fn latest_modification_since(
        &self,
        package: &Configuration,
        repository: &Configuration,
        last_known: Option<&PackageRevision>,
    ) -> Option<PackageRevision> {
        let module = ModuleSpec::build(package)
            .inspect_err(|errors| warn!("Not polling invalid package configuration: {}", errors))
            .ok()?;
        let forge = self.forge_factory.build(repository);
        let last_known = last_known.map(|revision| revision.revision.as_str());
        info!(
            "Looking up latest revision of module {} in forge {} since version {}",
            module,
            forge.url(),
            last_known.unwrap_or("(none)")
        );

        match forge.get_latest_version(&module).await {
            Ok(release) => latest_known_comparison(release, last_known).into_revision(),
            Err(e) => {
                info!(
                    "Module {} not found in forge {}: {}",
                    module,
                    forge.url(),
                    render_error(&e)
                );
                None
            }
        }
    }
}

fn validate_forge_url(raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::ForgeUrlMissing);
    }
    let url = reqwest::Url::parse(raw).map_err(|_| ValidationError::ForgeUrlInvalid)?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ValidationError::ForgeUrlNotHttp),
    }
}
