//! AHKFlow frontend library.
//!
//! Exposes the version client and configuration for use by the web and
//! native entry points and by tests.

#![warn(clippy::all, rust_2018_idioms)]

pub mod api;
pub mod app;
pub mod config;
pub mod state;

pub use api::VersionClient;
pub use app::AhkFlowApp;
pub use config::ApiHttpClientOptions;
