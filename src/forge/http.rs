//! Forge client over HTTP

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tracing::{debug, warn};

use crate::config::{Configuration, FORGE_URL, PollerConfig};
use crate::forge::client::{Forge, ForgeFactory};
use crate::forge::error::{ModuleNotFound, PingFailure, render_error};
use crate::forge::module_spec::ModuleSpec;
use crate::forge::release::{ModuleMetadata, ModuleRelease};

/// Forge client reading `<base>/<author>/<module>.json`
pub struct HttpForge {
    client: reqwest::Client,
    base_url: String,
    separator: char,
}

impl HttpForge {
    /// Creates a new HttpForge with default timeout and user agent
    pub fn new(base_url: &str) -> Self {
        Self::with_config(base_url, &PollerConfig::default())
    }

    pub fn with_config(base_url: &str, config: &PollerConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(config.user_agent.as_str())
                .timeout(Duration::from_millis(config.fetch_timeout_ms))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            separator: '/',
        }
    }

    /// Character joining author and module in metadata URLs (default `/`)
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    fn module_url(&self, module: &ModuleSpec) -> String {
        let segments = if self.separator == '/' {
            vec![
                module.author().to_string(),
                format!("{}.json", module.module()),
            ]
        } else {
            vec![format!(
                "{}{}{}.json",
                module.author(),
                self.separator,
                module.module()
            )]
        };

        // Unusable base URLs are left for the request itself to reject
        let Ok(mut url) = Url::parse(&self.base_url) else {
            return format!("{}/{}", self.base_url, segments.join("/"));
        };
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(&segments);
        }
        url.into()
    }

    /// Forges list release files as paths relative to the forge itself
    fn resolve_download_url(&self, file: &str) -> String {
        if Url::parse(file).is_ok() {
            return file.to_string();
        }
        Url::parse(&self.base_url)
            .and_then(|base| base.join(file))
            .map(String::from)
            .unwrap_or_else(|_| file.to_string())
    }

    async fn check(&self, url: &str) -> Result<(), PingFailure> {
        Url::parse(url).map_err(|e| PingFailure::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|source| PingFailure::Network {
                    url: url.to_string(),
                    source,
                })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Forge returned status {}: {}", status, url);
            return Err(PingFailure::Status {
                url: url.to_string(),
                status,
            });
        }

        debug!("Forge responded with {}: {}", status, url);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Forge for HttpForge {
    fn url(&self) -> String {
        self.base_url.clone()
    }

    async fn ping(&self) -> Result<(), PingFailure> {
        self.check(&self.base_url).await
    }

    async fn ping_module(&self, module: &ModuleSpec) -> Result<(), PingFailure> {
        self.check(&self.module_url(module)).await
    }

    async fn get_latest_version(
        &self,
        module: &ModuleSpec,
    ) -> Result<ModuleRelease, ModuleNotFound> {
        let url = self.module_url(module);
        let unavailable = |e: reqwest::Error| ModuleNotFound::Unavailable {
            module: module.name().to_string(),
            reason: render_error(&e),
        };

        let response = self.client.get(&url).send().await.map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Forge returned status {}: {}", status, url);
            return Err(ModuleNotFound::Status {
                module: module.name().to_string(),
                status: status.as_u16(),
            });
        }

        let metadata: ModuleMetadata = response.json().await.map_err(|e| {
            warn!("Failed to parse forge response from {}: {}", url, e);
            unavailable(e)
        })?;

        if metadata.releases.is_empty() {
            return Err(ModuleNotFound::NoReleases {
                module: module.name().to_string(),
            });
        }

        let latest = metadata
            .latest_within(module.lower_version_bound(), module.upper_version_bound())
            .ok_or_else(|| ModuleNotFound::NoReleaseInRange {
                module: module.name().to_string(),
                lower: module.lower_version_bound().clone(),
                upper: module.upper_version_bound().clone(),
            })?;

        debug!(
            "Selected {} {} from {} releases",
            module.name(),
            latest.version,
            metadata.releases.len()
        );

        Ok(ModuleRelease {
            download_url: self.resolve_download_url(&latest.download_url),
            ..latest.clone()
        })
    }
}

/// Builds [`HttpForge`] clients from the repository's `FORGE_URL`
#[derive(Debug, Clone, Default)]
pub struct HttpForgeFactory {
    config: PollerConfig,
}

impl HttpForgeFactory {
    pub fn new(config: PollerConfig) -> Self {
        Self { config }
    }
}

impl ForgeFactory for HttpForgeFactory {
    fn build(&self, repository: &Configuration) -> Arc<dyn Forge> {
        Arc::new(HttpForge::with_config(
            repository.get(FORGE_URL),
            &self.config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LOWER_VERSION_BOUND_INCLUSIVE, MODULE_NAME, UPPER_VERSION_BOUND_EXCLUSIVE};
    use crate::forge::version::Version;
    use mockito::Server;

    const APACHE_METADATA: &str = r#"{
        "author": "puppetlabs",
        "full_name": "puppetlabs/apache",
        "name": "apache",
        "releases": [
            {"version": "1.2.0", "file": "/system/releases/p/puppetlabs/puppetlabs-apache-1.2.0.tar.gz"},
            {"version": "0.9.0", "file": "/system/releases/p/puppetlabs/puppetlabs-apache-0.9.0.tar.gz"},
            {"version": "1.0.0", "file": "/system/releases/p/puppetlabs/puppetlabs-apache-1.0.0.tar.gz"}
        ]
    }"#;

    fn apache(lower: Option<&str>, upper: Option<&str>) -> ModuleSpec {
        ModuleSpec::build(
            &Configuration::new()
                .with(MODULE_NAME, Some("puppetlabs/apache"))
                .with(LOWER_VERSION_BOUND_INCLUSIVE, lower)
                .with(UPPER_VERSION_BOUND_EXCLUSIVE, upper),
        )
        .unwrap()
    }

    async fn serve_metadata(server: &mut mockito::ServerGuard, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/puppetlabs/apache.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn get_latest_version_returns_greatest_release_below_upper_bound() {
        let mut server = Server::new_async().await;
        let mock = serve_metadata(&mut server, APACHE_METADATA).await;

        let forge = HttpForge::new(&server.url());
        let release = forge
            .get_latest_version(&apache(None, Some("1.1.0")))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(release.version, Version::parse("1.0.0").unwrap());
        assert_eq!(
            release.download_url,
            format!(
                "{}/system/releases/p/puppetlabs/puppetlabs-apache-1.0.0.tar.gz",
                server.url()
            )
        );
    }

    #[tokio::test]
    async fn get_latest_version_returns_greatest_release_when_unbounded() {
        let mut server = Server::new_async().await;
        let mock = serve_metadata(&mut server, APACHE_METADATA).await;

        let forge = HttpForge::new(&format!("{}/", server.url()));
        let release = forge.get_latest_version(&apache(None, None)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(release.version, Version::parse("1.2.0").unwrap());
    }

    #[tokio::test]
    async fn get_latest_version_fails_when_no_release_below_bound() {
        let mut server = Server::new_async().await;
        let mock = serve_metadata(
            &mut server,
            r#"{"releases": [{"version": "2.0.0", "file": "/apache-2.0.0.tar.gz"}]}"#,
        )
        .await;

        let forge = HttpForge::new(&server.url());
        let result = forge.get_latest_version(&apache(None, Some("1.0.0"))).await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(ModuleNotFound::NoReleaseInRange { .. })
        ));
    }

    #[tokio::test]
    async fn get_latest_version_fails_for_module_without_releases() {
        let mut server = Server::new_async().await;
        let mock = serve_metadata(&mut server, r#"{"releases": []}"#).await;

        let forge = HttpForge::new(&server.url());
        let result = forge.get_latest_version(&apache(None, None)).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ModuleNotFound::NoReleases { .. })));
    }

    #[tokio::test]
    async fn get_latest_version_fails_on_error_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/puppetlabs/apache.json")
            .with_status(500)
            .create_async()
            .await;

        let forge = HttpForge::new(&server.url());
        let result = forge.get_latest_version(&apache(None, None)).await;

        mock.assert_async().await;
        let error = result.unwrap_err();
        assert_eq!(
            error.to_string(),
            "Failed to list versions of module 'puppetlabs/apache' (500)"
        );
    }

    #[tokio::test]
    async fn get_latest_version_fails_on_unexpected_body() {
        let mut server = Server::new_async().await;
        let mock = serve_metadata(&mut server, r#"{"versions": ["1.0.0"]}"#).await;

        let forge = HttpForge::new(&server.url());
        let result = forge.get_latest_version(&apache(None, None)).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ModuleNotFound::Unavailable { .. })));
    }

    #[tokio::test]
    async fn get_latest_version_uses_configured_separator() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/puppetlabs-apache.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(APACHE_METADATA)
            .create_async()
            .await;

        let forge = HttpForge::new(&server.url()).with_separator('-');
        let release = forge.get_latest_version(&apache(None, None)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(release.version, Version::parse("1.2.0").unwrap());
    }

    #[tokio::test]
    async fn ping_succeeds_when_forge_responds() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .create_async()
            .await;

        let forge = HttpForge::new(&server.url());

        assert!(forge.ping().await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn ping_module_fails_when_module_missing() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/puppetlabs/apache.json")
            .with_status(404)
            .create_async()
            .await;

        let forge = HttpForge::new(&server.url());
        let result = forge.ping_module(&apache(None, None)).await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(PingFailure::Status { status, .. }) if status == reqwest::StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn ping_fails_for_invalid_url() {
        let forge = HttpForge::new("not a url");

        let result = forge.ping().await;

        assert!(matches!(result, Err(PingFailure::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn ping_fails_when_connection_refused() {
        let forge = HttpForge::new("http://127.0.0.1:1");

        let error = forge.ping().await.unwrap_err();

        assert!(matches!(error, PingFailure::Network { .. }));
        assert!(
            error
                .to_string()
                .starts_with("Failed to connect to Forge at http://127.0.0.1:1")
        );
    }

    #[tokio::test]
    async fn requests_time_out_when_forge_never_replies() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let silent = tokio::spawn(async move {
            let mut connections = Vec::new();
            loop {
                let (socket, _) = listener.accept().await.unwrap();
                connections.push(socket);
            }
        });
        let forge = HttpForge::with_config(
            &url,
            &PollerConfig {
                fetch_timeout_ms: 300,
                ..PollerConfig::default()
            },
        );

        let (latest, ping) = tokio::time::timeout(Duration::from_secs(5), async {
            (
                forge.get_latest_version(&apache(None, None)).await,
                forge.ping().await,
            )
        })
        .await
        .expect("forge requests should time out on their own");
        silent.abort();

        assert!(matches!(latest, Err(ModuleNotFound::Unavailable { .. })));
        assert!(matches!(ping, Err(PingFailure::Network { .. })));
    }

    #[test]
    fn module_url_encodes_name_segments() {
        let forge = HttpForge::new("http://forge.example.com/");
        let module = ModuleSpec::build(
            &Configuration::new().with(MODULE_NAME, Some("a#x/b?c")),
        )
        .unwrap();

        assert_eq!(
            forge.module_url(&module),
            "http://forge.example.com/a%23x/b%3Fc.json"
        );
        assert_eq!(
            forge.with_separator('-').module_url(&module),
            "http://forge.example.com/a%23x-b%3Fc.json"
        );
    }

    #[test]
    fn module_url_keeps_base_path() {
        let forge = HttpForge::new("http://forge.example.com/v3/modules");

        assert_eq!(
            forge.module_url(&apache(None, None)),
            "http://forge.example.com/v3/modules/puppetlabs/apache.json"
        );
    }

    #[test]
    fn factory_builds_forge_for_configured_url() {
        let factory = HttpForgeFactory::default();
        let repository = Configuration::new().with(FORGE_URL, Some(" http://forge.example.com/ "));

        let forge = factory.build(&repository);

        assert_eq!(forge.url(), "http://forge.example.com");
    }

    #[test]
    fn resolve_download_url_keeps_absolute_urls() {
        let forge = HttpForge::new("http://forge.example.com");

        assert_eq!(
            forge.resolve_download_url("https://cdn.example.com/apache-1.0.0.tar.gz"),
            "https://cdn.example.com/apache-1.0.0.tar.gz"
        );
        assert_eq!(
            forge.resolve_download_url("/system/apache-1.0.0.tar.gz"),
            "http://forge.example.com/system/apache-1.0.0.tar.gz"
        );
    }
}
