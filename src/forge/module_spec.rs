//! What to poll: a module name plus version bounds

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::{
    Configuration, LOWER_VERSION_BOUND_INCLUSIVE, MODULE_NAME, UPPER_VERSION_BOUND_EXCLUSIVE,
};
use crate::forge::version::Version;
use crate::validation::{ValidationError, ValidationResult};

/// `author/module`: exactly one slash, both halves non-empty
static MODULE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^/]+/[^/]+$").expect("module name pattern is valid"));

/// A validated module specification
///
/// Releases with `lower_version_bound <= version < upper_version_bound` are
/// eligible. Unset bounds are [`Version::ZERO`] and [`Version::INFINITY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    name: String,
    lower_version_bound: Version,
    upper_version_bound: Version,
}

impl ModuleSpec {
    /// Build a spec from package configuration, or every reason it is invalid
    pub fn build(config: &Configuration) -> Result<Self, ValidationResult> {
        Self::build_for_validation(config).into_spec()
    }

    /// Validate each field independently
    ///
    /// Never fails outright, so validators can report on the bounds even when
    /// the module name is missing.
    pub fn build_for_validation(config: &Configuration) -> PartialModuleSpec {
        PartialModuleSpec {
            name: parse_name(config.get(MODULE_NAME)),
            lower_version_bound: parse_bound(
                config.get(LOWER_VERSION_BOUND_INCLUSIVE),
                Version::ZERO,
                ValidationError::LowerVersionBound,
            ),
            upper_version_bound: parse_bound(
                config.get(UPPER_VERSION_BOUND_EXCLUSIVE),
                Version::INFINITY,
                ValidationError::UpperVersionBound,
            ),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> &str {
        self.split_name().0
    }

    pub fn module(&self) -> &str {
        self.split_name().1
    }

    pub fn lower_version_bound(&self) -> &Version {
        &self.lower_version_bound
    }

    pub fn upper_version_bound(&self) -> &Version {
        &self.upper_version_bound
    }

    fn split_name(&self) -> (&str, &str) {
        // Validated on construction to contain exactly one '/'
        self.name.split_once('/').unwrap_or((self.name.as_str(), ""))
    }
}

impl fmt::Display for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (>= {}, < {})",
            self.name, self.lower_version_bound, self.upper_version_bound
        )
    }
}

/// A module spec whose fields were validated one by one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialModuleSpec {
    pub name: Result<String, ValidationError>,
    pub lower_version_bound: Result<Version, ValidationError>,
    pub upper_version_bound: Result<Version, ValidationError>,
}

impl PartialModuleSpec {
    /// Every field error, plus an empty-range error when both bounds parsed
    pub fn errors(&self) -> ValidationResult {
        let mut result: ValidationResult = [
            self.name.as_ref().err(),
            self.lower_version_bound.as_ref().err(),
            self.upper_version_bound.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect();

        if let (Ok(lower), Ok(upper)) = (&self.lower_version_bound, &self.upper_version_bound)
            && lower >= upper
        {
            result.add_error(ValidationError::EmptyVersionRange);
        }

        result
    }

    pub fn into_spec(self) -> Result<ModuleSpec, ValidationResult> {
        let errors = self.errors();
        match (self.name, self.lower_version_bound, self.upper_version_bound) {
            (Ok(name), Ok(lower_version_bound), Ok(upper_version_bound)) if errors.is_successful() => {
                Ok(ModuleSpec {
                    name,
                    lower_version_bound,
                    upper_version_bound,
                })
            }
            _ => {
                debug!("Invalid module spec: {}", errors);
                Err(errors)
            }
        }
    }
}

fn parse_name(raw: &str) -> Result<String, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::ModuleNameMissing);
    }
    if !MODULE_NAME_RE.is_match(raw) {
        return Err(ValidationError::ModuleNameFormat);
    }
    Ok(raw.to_string())
}

fn parse_bound(
    raw: &str,
    unbounded: Version,
    error: ValidationError,
) -> Result<Version, ValidationError> {
    if raw.is_empty() {
        return Ok(unbounded);
    }
    Version::parse(raw).map_err(|e| {
        debug!("Rejecting version bound '{}': {}", raw, e);
        error
    })
}
