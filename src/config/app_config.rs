use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Engine-wide configuration.
///
/// `EngineConfig::load` reads an optional YAML file and falls back to
/// [`EngineConfig::default`] for anything the file doesn't set. The CLI layer
/// overlays its own flags on top of whatever this produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Directory the engine keeps its default catalog file and scratch area under.
	pub data_dir: PathBuf,

	/// Log level passed to the `tracing` env-filter when the CLI doesn't override it.
	pub log_level: String,

	/// Default per-invocation timeout (seconds) for a converter command when
	/// the matched rule doesn't specify its own.
	pub default_timeout_secs: u64,

	/// Number of subfolder partitions to run concurrently in `--multi` mode.
	/// `0` means "one per discovered top-level subfolder".
	pub max_concurrent_partitions: usize,

	/// Base directory under which colliding source/dest paths are staged
	/// during conversion.
	pub scratch_dir: PathBuf,
}

impl Default for EngineConfig {
	fn default() -> Self {
		let data_dir = default_data_dir().unwrap_or_else(|_| PathBuf::from(".pwnorm"));
		Self {
			scratch_dir: data_dir.join("scratch"),
			data_dir,
			log_level: "info".to_string(),
			default_timeout_secs: 3600,
			max_concurrent_partitions: 0,
		}
	}
}

impl EngineConfig {
	/// Load configuration from an optional YAML file, falling back to defaults
	/// for anything missing or when the file doesn't exist at all.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let Some(path) = path else {
			return Ok(Self::default());
		};

		if !path.exists() {
			warn!(path = %path.display(), "config file not found, using defaults");
			return Ok(Self::default());
		}

		let raw = std::fs::read_to_string(path)?;
		let config: Self = serde_yaml::from_str(&raw)?;
		info!(path = %path.display(), "loaded engine configuration");
		Ok(config)
	}
}

/// Resolve the platform default data directory (`~/.local/share/pwnorm` on
/// Linux, the equivalent on macOS/Windows).
pub fn default_data_dir() -> Result<PathBuf> {
	dirs::data_dir()
		.map(|d| d.join("pwnorm"))
		.ok_or_else(|| anyhow::anyhow!("could not determine platform data directory"))
}
