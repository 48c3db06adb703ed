//! Forge test utilities

use mockito::{Mock, ServerGuard};

use forge_poller::config::{
    Configuration, FORGE_URL, LOWER_VERSION_BOUND_INCLUSIVE, MODULE_NAME,
    UPPER_VERSION_BOUND_EXCLUSIVE,
};

/// Build a forge metadata body listing `versions` in the given order
pub fn metadata_body(module: &str, versions: &[&str]) -> String {
    let file_prefix = module.replace('/', "-");
    let releases: Vec<serde_json::Value> = versions
        .iter()
        .map(|version| {
            serde_json::json!({
                "version": version,
                "file": format!("/system/releases/{}-{}.tar.gz", file_prefix, version),
            })
        })
        .collect();

    serde_json::json!({
        "full_name": module,
        "releases": releases,
    })
    .to_string()
}

/// Serve metadata for `module` listing `versions`
pub async fn mock_module(server: &mut ServerGuard, module: &str, versions: &[&str]) -> Mock {
    server
        .mock("GET", format!("/{}.json", module).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(metadata_body(module, versions))
        .create_async()
        .await
}

pub fn repository_config(forge_url: &str) -> Configuration {
    Configuration::new().with(FORGE_URL, Some(forge_url))
}

pub fn package_config(module: &str, lower: Option<&str>, upper: Option<&str>) -> Configuration {
    Configuration::new()
        .with(MODULE_NAME, Some(module))
        .with(LOWER_VERSION_BOUND_INCLUSIVE, lower)
        .with(UPPER_VERSION_BOUND_EXCLUSIVE, upper)
}
