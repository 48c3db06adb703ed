use thiserror::Error;

use crate::forge::version::Version;

/// The forge (or a module's page on it) could not be reached
#[derive(Debug, Error)]
pub enum PingFailure {
    #[error("Invalid Forge URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to connect to Forge at {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Forge at {url} responded with {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// No release of a module could be selected
///
/// An expected steady state (e.g. while a repository is being set up), so
/// callers report it as "nothing to report" rather than as a failure.
#[derive(Debug, Error)]
pub enum ModuleNotFound {
    #[error("Failed to list versions of module '{module}' ({status})")]
    Status { module: String, status: u16 },

    #[error("Failed to list versions of module '{module}': {reason}")]
    Unavailable { module: String, reason: String },

    #[error("Module '{module}' has no releases")]
    NoReleases { module: String },

    #[error("Module '{module}' has no release in range >= {lower}, < {upper}")]
    NoReleaseInRange {
        module: String,
        lower: Version,
        upper: Version,
    },
}

/// Renders an error together with its chain of causes
///
/// reqwest keeps the interesting part ("Connection refused", a DNS failure)
/// in the source chain rather than in its own message.
pub fn render_error(error: &dyn std::error::Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !rendered.contains(&message) {
            rendered.push_str(": ");
            rendered.push_str(&message);
        }
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer failure")]
    struct Outer {
        #[source]
        source: Inner,
    }

    #[derive(Debug, Error)]
    #[error("Connection refused")]
    struct Inner;

    #[test]
    fn render_error_appends_causes() {
        let error = Outer { source: Inner };

        assert_eq!(render_error(&error), "outer failure: Connection refused");
    }

    #[test]
    fn render_error_skips_causes_already_in_message() {
        let error = ModuleNotFound::Status {
            module: "puppetlabs/apache".to_string(),
            status: 500,
        };

        assert_eq!(
            render_error(&error),
            "Failed to list versions of module 'puppetlabs/apache' (500)"
        );
    }
}
