//! C2: the identifier.
//!
//! Runs a PRONOM-aware signature tool first, falls back to libmagic when it
//! comes back empty, and layers in-process encoding detection on top for
//! text formats. A couple of PUIDs get normalized to the MIME type the rest
//! of the engine actually expects (`original_source` carried the same two
//! special cases as constants in its converter table).

mod encoding;
pub mod error;
mod extensions;
mod magic;
mod siegfried;

use std::path::Path;

pub use error::{IdentifyError, Result};
pub use extensions::canonical_extension;

/// Outcome of identifying one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
	pub mime: String,
	pub format: Option<String>,
	pub version: Option<String>,
	pub puid: Option<String>,
	pub size: u64,
	pub encoding: Option<String>,
	/// True when the current extension doesn't match any customary
	/// extension known for `mime`, and `mime` isn't exempt from the check.
	pub rename_required: bool,
}

/// Binaries the identifier shells out to. Split out of [`Identifier`] so
/// tests can point at stub scripts instead of requiring `sf`/`file` on PATH.
#[derive(Debug, Clone)]
pub struct IdentifierBinaries {
	pub siegfried: String,
	pub file: String,
}

impl Default for IdentifierBinaries {
	fn default() -> Self {
		Self {
			siegfried: "sf".to_string(),
			file: "file".to_string(),
		}
	}
}

pub struct Identifier {
	bins: IdentifierBinaries,
}

impl Identifier {
	pub fn new(bins: IdentifierBinaries) -> Self {
		Self { bins }
	}

	pub async fn identify(&self, path: &Path) -> Result<Identification> {
		let size = tokio::fs::metadata(path).await?.len();

		let (mime, format, version, puid) = match siegfried::identify(&self.bins.siegfried, path).await? {
			Some(m) => (m.mime, m.format, m.version, Some(m.puid)),
			None => match magic::identify(&self.bins.file, path).await? {
				Some(m) => (m.mime, m.format, None, None),
				None => return Err(IdentifyError::NoResult(path.to_path_buf())),
			},
		};

		let (mime, format) = normalize_puid_quirks(puid.as_deref(), mime, format);

		let encoding = if mime.starts_with("text/") {
			encoding::detect(path).await?
		} else {
			None
		};

		let rename_required = needs_rename(&mime, path);

		Ok(Identification {
			mime,
			format,
			version,
			puid,
			size,
			encoding,
			rename_required,
		})
	}
}

/// A couple of PRONOM identifiers describe formats whose registered MIME
/// type is less useful downstream than a simpler equivalent: plain-text
/// markup (`x-fmt/18`) and generic XML dialects (`fmt/979`).
fn normalize_puid_quirks(puid: Option<&str>, mime: String, format: Option<String>) -> (String, Option<String>) {
	match puid {
		Some("x-fmt/18") => ("text/plain".to_string(), format),
		Some("fmt/979") => ("application/xml".to_string(), format),
		_ => (mime, format),
	}
}

fn needs_rename(mime: &str, path: &Path) -> bool {
	if extensions::RENAME_EXEMPT_MIMES.contains(&mime) {
		return false;
	}
	let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
		return false;
	};
	matches!(extensions::is_customary(mime, ext), Some(false))
}
