//! Engine configuration.
//!
//! Mirrors the layering the rest of the codebase uses for application
//! settings: hardcoded defaults, overlaid by an optional YAML file on disk,
//! overlaid by CLI flags. Loaded once by the binary entrypoint and passed
//! down by reference — partition threads each open their own `Catalog`
//! connection but read the same `EngineConfig` snapshot.

mod app_config;

pub use app_config::{default_data_dir, EngineConfig};
