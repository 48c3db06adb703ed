//! Configuration validation errors reported back to the host

use thiserror::Error;

/// A single problem with user-supplied configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Forge URL is mandatory")]
    ForgeUrlMissing,

    #[error("Forge URL must be a URL")]
    ForgeUrlInvalid,

    #[error("Forge URL must be an HTTP(S) URL")]
    ForgeUrlNotHttp,

    #[error("Module name is mandatory")]
    ModuleNameMissing,

    #[error("Module name should be in format \"author/module\"")]
    ModuleNameFormat,

    #[error("Version to poll >= should be a version number")]
    LowerVersionBound,

    #[error("Version to poll < should be a version number")]
    UpperVersionBound,

    #[error("Version to poll >= should be lower than version to poll <")]
    EmptyVersionRange,
}

/// Outcome of validating a configuration bag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_successful(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Human-readable messages, one per error
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

impl FromIterator<ValidationError> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}
