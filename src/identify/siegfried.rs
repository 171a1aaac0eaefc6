use std::path::Path;

use serde::Deserialize;
use tokio::process::Command;

use super::error::{IdentifyError, Result};

/// One `files[]` entry of Siegfried's `-json` output.
#[derive(Debug, Deserialize)]
struct SfFile {
	filesize: u64,
	matches: Vec<SfMatch>,
}

#[derive(Debug, Deserialize)]
struct SfMatch {
	id: String,
	format: Option<String>,
	version: Option<String>,
	mime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SfOutput {
	files: Vec<SfFile>,
}

#[derive(Debug, Clone)]
pub struct SiegfriedMatch {
	pub mime: String,
	pub format: Option<String>,
	pub version: Option<String>,
	pub puid: String,
	pub size: u64,
}

/// Call the Siegfried-compatible identifier binary (`sf -json <path>`) and
/// parse its first match. Returns `Ok(None)` on empty output or no matches,
/// never bubbling an error just because identification came back blank —
/// the caller falls back to the libmagic probe in that case.
pub async fn identify(sf_bin: &str, path: &Path) -> Result<Option<SiegfriedMatch>> {
	let output = Command::new(sf_bin).arg("-json").arg(path).output().await?;

	if !output.status.success() || output.stdout.is_empty() {
		return Ok(None);
	}

	let parsed: SfOutput = match serde_json::from_slice(&output.stdout) {
		Ok(p) => p,
		Err(e) => return Err(IdentifyError::BadSiegfriedOutput(e.to_string())),
	};

	let Some(file) = parsed.files.into_iter().next() else {
		return Ok(None);
	};
	let Some(m) = file.matches.into_iter().next() else {
		return Ok(None);
	};
	if m.mime.as_deref().unwrap_or("").is_empty() {
		return Ok(None);
	}

	Ok(Some(SiegfriedMatch {
		mime: m.mime.unwrap(),
		format: m.format,
		version: m.version,
		puid: m.id,
		size: file.filesize,
	}))
}
