use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::catalog::NewFileEntry;

fn is_dotfile(entry: &DirEntry) -> bool {
	entry
		.file_name()
		.to_str()
		.map(|s| s.starts_with('.'))
		.unwrap_or(false)
}

/// Walk `source_dir`, skipping dotfiles/dotdirs, and return every regular
/// file's path relative to `source_dir` (forward-slash separated).
pub fn scan(source_dir: &Path) -> Vec<String> {
	scan_dir(source_dir, source_dir)
}

/// Walk `walk_root`, producing paths relative to `relative_root` instead —
/// used by archive fan-out, where the extraction directory is walked but
/// child paths are recorded relative to the destination tree.
pub fn scan_dir(walk_root: &Path, relative_root: &Path) -> Vec<String> {
	WalkDir::new(walk_root)
		.into_iter()
		.filter_entry(|e| e.depth() == 0 || !is_dotfile(e))
		.filter_map(|e| e.ok())
		.filter(|e| e.file_type().is_file())
		.filter_map(|e| {
			e.path()
				.strip_prefix(relative_root)
				.ok()
				.map(|p| p.to_string_lossy().replace('\\', "/"))
		})
		.collect()
}

/// Path of the per-batch enumeration sidecar for a given destination dir.
pub fn sidecar_path(dest_dir: &Path) -> PathBuf {
	let mut name = dest_dir
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_default();
	name.push_str("-filelist.txt");
	dest_dir
		.parent()
		.map(|p| p.join(&name))
		.unwrap_or_else(|| PathBuf::from(name))
}

pub async fn write_sidecar(path: &Path, paths: &[String]) -> std::io::Result<()> {
	tokio::fs::write(path, paths.join("\n")).await
}

pub async fn read_sidecar(path: &Path) -> std::io::Result<Vec<String>> {
	let text = tokio::fs::read_to_string(path).await?;
	Ok(text.lines().map(|l| l.to_string()).filter(|l| !l.is_empty()).collect())
}

pub fn to_new_entries(paths: Vec<String>) -> Vec<NewFileEntry> {
	paths.into_iter().map(NewFileEntry::root).collect()
}
