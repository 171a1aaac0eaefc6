use std::path::Path;

use tokio::process::Command;

use super::error::Result;

#[derive(Debug, Clone)]
pub struct MagicMatch {
	pub mime: String,
	pub format: Option<String>,
}

/// Fallback probe used when the primary identifier has no match: shells out
/// to `file`, once for the MIME type and once for the free-text description.
pub async fn identify(file_bin: &str, path: &Path) -> Result<Option<MagicMatch>> {
	let mime_out = Command::new(file_bin)
		.arg("--mime-type")
		.arg("-b")
		.arg(path)
		.output()
		.await?;
	if !mime_out.status.success() {
		return Ok(None);
	}
	let mime = String::from_utf8_lossy(&mime_out.stdout).trim().to_string();
	if mime.is_empty() {
		return Ok(None);
	}

	let desc_out = Command::new(file_bin).arg("-b").arg(path).output().await?;
	let format = if desc_out.status.success() {
		let desc = String::from_utf8_lossy(&desc_out.stdout).trim().to_string();
		if desc.is_empty() { None } else { Some(desc) }
	} else {
		None
	};

	Ok(Some(MagicMatch { mime, format }))
}
