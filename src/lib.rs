pub mod config;
pub mod forge;
pub mod logging;
pub mod poller;
pub mod validation;
