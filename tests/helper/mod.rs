//! Shared helpers for integration tests

#![allow(dead_code)]

pub mod forge;

pub use forge::{metadata_body, mock_module, package_config, repository_config};
