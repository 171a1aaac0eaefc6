use std::collections::HashMap;
use std::path::Path;

use super::error::{RegistryError, Result};
use super::rule::{ConverterRule, RawRule};

/// C3: the declarative mapping from MIME type to conversion behavior.
///
/// Loaded once at batch start and handed to workers behind an `Arc`, the
/// same "load once, share an immutable snapshot" shape
/// `FileTypeRegistry::load_from_toml` uses for its own definition sources.
#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
	entries: HashMap<String, RawRule>,
}

fn read_yaml(path: &Path) -> Result<HashMap<String, RawRule>> {
	let text = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
		path: path.to_path_buf(),
		source,
	})?;
	serde_yaml::from_str(&text).map_err(|source| RegistryError::Yaml {
		path: path.to_path_buf(),
		source,
	})
}

impl ConverterRegistry {
	/// Load a base registry file, optionally layering a second file of the
	/// same shape on top (entries present in the override win, merged
	/// shallowly against the matching base entry when one exists).
	pub fn load(base_path: &Path, override_path: Option<&Path>) -> Result<Self> {
		let mut entries = read_yaml(base_path)?;

		if let Some(override_path) = override_path {
			let overrides = read_yaml(override_path)?;
			for (mime, overlay) in overrides {
				match entries.get(&mime) {
					Some(base) => {
						let merged = base.overlay_with(&overlay);
						entries.insert(mime, merged);
					}
					None => {
						entries.insert(mime, overlay);
					}
				}
			}
		}

		Ok(Self { entries })
	}

	/// Resolve the rule applicable to a file already identified as `mime`,
	/// refined by its `puid` (preferred) or source extension.
	pub fn resolve(&self, mime: &str, puid: Option<&str>, ext: Option<&str>) -> Option<ConverterRule> {
		let base = self.entries.get(mime)?;

		let resolved = if let Some(puid) = puid {
			base.puid
				.as_ref()
				.and_then(|overlays| overlays.get(puid))
				.map(|overlay| base.overlay_with(overlay))
		} else {
			None
		}
		.or_else(|| {
			ext.and_then(|ext| {
				base.source_ext
					.as_ref()
					.and_then(|overlays| overlays.get(ext))
					.map(|overlay| base.overlay_with(overlay))
			})
		})
		.unwrap_or_else(|| base.clone());

		Some(resolved.into())
	}
}
