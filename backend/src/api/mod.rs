//! API handlers.

pub mod version;
