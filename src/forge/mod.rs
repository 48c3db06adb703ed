//! Forge access layer
//!
//! Everything needed to ask a module forge for the latest release of a module
//! within version bounds.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │Configuration│────▶│ ModuleSpec  │────▶│    Forge    │
//! │(raw strings)│     │ (validated) │     │  (fetch)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                            ▼                   ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │   Version   │◀────│  Releases   │
//!                     │ (ordering)  │     │ (selection) │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`version`]: Ordered version numbers with ZERO/INFINITY sentinels
//! - [`module_spec`]: Module name plus bounds, built from configuration
//! - [`release`]: Forge response shape and bounded release selection
//! - [`client`]: `Forge` trait and factory for building clients
//! - [`http`]: reqwest-backed `Forge` implementation
//! - [`error`]: Ping and not-found error types

pub mod client;
pub mod error;
pub mod http;
pub mod module_spec;
pub mod release;
pub mod version;

pub use client::{Forge, ForgeFactory};
pub use error::{ModuleNotFound, PingFailure};
pub use http::{HttpForge, HttpForgeFactory};
pub use module_spec::{ModuleSpec, PartialModuleSpec};
pub use release::{ModuleMetadata, ModuleRelease};
pub use version::{Version, VersionParseError};
