//! C4: the file runner.
//!
//! For a single catalog entry, plans a destination path, runs the
//! registry-resolved converter command (or decides no command is needed),
//! classifies the outcome, and persists the result. Archive expansion and
//! kept intermediates are reported back to the caller rather than handled
//! in place — C6 and C5 own what happens next.

mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use error::{Result, RunnerError};

use crate::catalog::{Catalog, FileEntry, NewFileEntry, Status};
use crate::identify::Identifier;
use crate::process::{self, Outcome as ProcessOutcome};
use crate::registry::{build_command, CommandContext, ConverterRegistry};

/// What happened to one entry after a [`run`] call.
#[derive(Debug)]
pub enum RunOutcome {
	/// Status was updated (accepted/protected/skipped/renamed/etc); nothing
	/// further for the driver to do with this entry.
	Done,
	/// The converter produced a directory (archive extraction). The driver
	/// hands this to C6 to walk and append children.
	Expanded(PathBuf),
}

pub struct RunnerConfig<'a> {
	pub catalog: &'a Catalog,
	pub identifier: &'a Identifier,
	pub registry: &'a ConverterRegistry,
	pub source_dir: &'a Path,
	pub dest_dir: &'a Path,
	pub scratch_dir: &'a Path,
	pub default_timeout: Duration,
	pub orig_ext: bool,
	pub keep_originals: bool,
	pub set_source_ext: bool,
	pub identify_only: bool,
}

/// Run the full conversion lifecycle for `entry`, mutating it as status and
/// identification fields change, and persisting every terminal transition.
pub async fn run(cfg: &RunnerConfig<'_>, mut entry: FileEntry) -> Result<RunOutcome> {
	let mut source_path = resolve_source_path(cfg, &entry);

	if entry.mime.is_none() {
		let id = match cfg.identifier.identify(&source_path).await {
			Ok(id) => id,
			Err(e) => return fail_entry(cfg, entry, &e.to_string()).await,
		};
		entry.mime = Some(id.mime);
		entry.format = id.format;
		entry.version = id.version;
		entry.puid = id.puid;
		entry.size = Some(id.size as i64);
		entry.encoding = id.encoding;

		if id.rename_required && entry.is_root() {
			match rename_with_extension_folded_in(&source_path) {
				Ok(renamed) => {
					entry.path = relative_to(cfg.source_dir, &renamed);
					entry.ext = extension_of(&renamed);
					source_path = renamed;
				}
				Err(e) => return fail_entry(cfg, entry, &e.to_string()).await,
			}
		}
	}

	if cfg.set_source_ext && entry.is_root() {
		let mime = entry.mime.clone().expect("identified above");
		if let Some(canon_ext) = crate::identify::canonical_extension(&mime) {
			if entry.ext.as_deref() != Some(canon_ext) {
				match rename_with_extension(&source_path, canon_ext) {
					Ok(renamed) => {
						entry.path = relative_to(cfg.source_dir, &renamed);
						entry.ext = Some(canon_ext.to_string());
						source_path = renamed;
					}
					Err(e) => return fail_entry(cfg, entry, &e.to_string()).await,
				}
			}
		}
	}

	if cfg.identify_only {
		cfg.catalog.update(&entry).await?;
		return Ok(RunOutcome::Done);
	}

	let mime = entry.mime.clone().expect("identified above");
	let ext = entry.ext.clone();
	let rule = cfg.registry.resolve(&mime, entry.puid.as_deref(), ext.as_deref());

	let copy_path = cfg.dest_dir.join(&entry.path);

	let Some(rule) = rule else {
		entry.status = Status::Skipped;
		mirror_original(cfg, &entry, &source_path, &copy_path).await?;
		cfg.catalog.update(&entry).await?;
		tracing::debug!(path = %entry.path, mime, "no converter rule, skipped");
		return Ok(RunOutcome::Done);
	};

	let stem = Path::new(&entry.path)
		.file_stem()
		.map(|s| s.to_string_lossy().into_owned())
		.unwrap_or_default();
	let parent = Path::new(&entry.path)
		.parent()
		.map(PathBuf::from)
		.unwrap_or_default();

	let dest_ext = resolve_dest_ext(&rule, ext.as_deref(), cfg.orig_ext);
	let dest_path = cfg.dest_dir.join(&parent).join(format!(
		"{stem}{}",
		dest_ext.as_deref().unwrap_or("")
	));

	if rule.accepts(entry.version.as_deref(), entry.encoding.as_deref()) {
		entry.status = Status::Accepted;
		entry.kept = true;
		mirror_original(cfg, &entry, &source_path, &copy_path).await?;
		cfg.catalog.update(&entry).await?;
		return Ok(RunOutcome::Done);
	}

	if mime == "application/encrypted" {
		entry.status = Status::Protected;
		entry.kept = true;
		cfg.catalog.update(&entry).await?;
		return Ok(RunOutcome::Done);
	}

	mirror_original(cfg, &entry, &source_path, &copy_path).await?;

	let Some(command_template) = rule.command.clone() else {
		entry.status = if rule.remove { Status::Removed } else { Status::Skipped };
		cfg.catalog.update(&entry).await?;
		return Ok(RunOutcome::Done);
	};

	// A destination that exists with a *different* size than the source is
	// already a real conversion result from a previous run; skip running the
	// command again. A destination that doesn't exist, or exists but is just
	// the mirrored original (same size — mirroring and the command's
	// destination can collide, see above), still needs the command to run.
	if dest_path.exists() && file_size(&dest_path) != entry.size {
		entry.status = Status::Converted;
		entry.kept = rule.keep || cfg.keep_originals;
		cleanup_pre_copy(cfg, &entry, &copy_path, &dest_path);
		cfg.catalog.update(&entry).await?;
		if dest_path.is_dir() {
			return Ok(RunOutcome::Expanded(dest_path));
		}
		return finish(cfg, entry, dest_path).await;
	}

	let scratch_path = cfg.scratch_dir.join(&entry.path);
	let collides = source_path.to_string_lossy().to_lowercase() == dest_path.to_string_lossy().to_lowercase();
	let run_from = if collides {
		if let Some(parent) = scratch_path.parent() {
			tokio::fs::create_dir_all(parent).await?;
		}
		tokio::fs::rename(&source_path, &scratch_path).await?;
		scratch_path.clone()
	} else {
		source_path.clone()
	};

	if let Some(parent) = dest_path.parent() {
		tokio::fs::create_dir_all(parent).await?;
	}

	let pid = std::process::id();
	let ctx = CommandContext {
		source: &run_from,
		dest: &dest_path,
		temp: &scratch_path,
		mime_type: &mime,
		pid,
	};
	let command = build_command(&command_template, &ctx);
	let timeout = rule
		.timeout
		.map(Duration::from_secs)
		.unwrap_or(cfg.default_timeout);

	let outcome = match process::run_with_timeout(&command, cfg.scratch_dir, timeout).await {
		Ok(outcome) => outcome,
		Err(e) => {
			if collides && run_from != source_path {
				let _ = tokio::fs::copy(&run_from, &source_path).await;
			}
			remove_partial(&dest_path).await;
			cleanup_scratch(&scratch_path).await;
			return fail_entry(cfg, entry, &e.to_string()).await;
		}
	};

	let success = match &outcome {
		ProcessOutcome::Completed { exit_code, .. } => *exit_code == 0 && dest_path.exists(),
		ProcessOutcome::TimedOut => false,
	};

	if !success {
		if collides && run_from != source_path {
			let _ = tokio::fs::copy(&run_from, &source_path).await;
		}
		remove_partial(&dest_path).await;
		tokio::time::sleep(Duration::from_millis(100)).await;

		entry.status = classify_failure(&outcome);
		if entry.status == Status::Protected {
			entry.kept = true;
		}
		tracing::warn!(path = %entry.path, command, status = %entry.status, "conversion did not succeed");
		cfg.catalog.update(&entry).await?;
		cleanup_scratch(&scratch_path).await;
		return Ok(RunOutcome::Done);
	}

	if collides && run_from != source_path {
		let _ = tokio::fs::remove_file(&run_from).await;
	}
	cleanup_scratch(&scratch_path).await;

	if dest_path.is_dir() {
		entry.status = Status::Converted;
		entry.kept = rule.keep || cfg.keep_originals;
		cleanup_pre_copy(cfg, &entry, &copy_path, &dest_path);
		cfg.catalog.update(&entry).await?;
		return Ok(RunOutcome::Expanded(dest_path));
	}

	entry.status = Status::Converted;
	entry.kept = rule.keep || cfg.keep_originals;
	cleanup_pre_copy(cfg, &entry, &copy_path, &dest_path);
	cfg.catalog.update(&entry).await?;

	finish(cfg, entry, dest_path).await
}

/// Step 13: the freshly produced file always gets its own catalog row, and
/// that row runs through the same resolution logic as any other entry —
/// which may immediately terminate it (accepted/skipped) or chain into
/// another conversion. The one short-circuit is the same-format guard: a
/// PDF that still isn't PDF/A after the command ran (Ghostscript silently
/// produces an ordinary PDF) can't be improved by trying again.
async fn finish(cfg: &RunnerConfig<'_>, parent: FileEntry, produced_path: PathBuf) -> Result<RunOutcome> {
	let child_id = match cfg.identifier.identify(&produced_path).await {
		Ok(id) => id,
		Err(e) => {
			tracing::error!(
				path = %produced_path.display(),
				error = %e,
				"could not identify produced file; parent status stands, produced file left unindexed"
			);
			return Ok(RunOutcome::Done);
		}
	};

	if child_id.format == parent.format {
		return Ok(RunOutcome::Done);
	}

	let relative = relative_to(cfg.dest_dir, &produced_path);
	let mut new_entry = cfg.catalog.add(NewFileEntry::child(relative, parent.id)).await?;
	new_entry.mime = Some(child_id.mime);
	new_entry.format = child_id.format;
	new_entry.version = child_id.version;
	new_entry.puid = child_id.puid;
	new_entry.size = Some(child_id.size as i64);
	new_entry.encoding = child_id.encoding;
	new_entry.ext = extension_of(&produced_path);

	let child_cfg = RunnerConfig {
		catalog: cfg.catalog,
		identifier: cfg.identifier,
		registry: cfg.registry,
		source_dir: cfg.source_dir,
		dest_dir: cfg.dest_dir,
		scratch_dir: cfg.scratch_dir,
		default_timeout: cfg.default_timeout,
		orig_ext: cfg.orig_ext,
		keep_originals: cfg.keep_originals,
		set_source_ext: false,
		identify_only: false,
	};

	Box::pin(run(&child_cfg, new_entry)).await
}

fn resolve_source_path(cfg: &RunnerConfig<'_>, entry: &FileEntry) -> PathBuf {
	if entry.source_id.is_some() {
		cfg.dest_dir.join(&entry.path)
	} else {
		cfg.source_dir.join(&entry.path)
	}
}

fn resolve_dest_ext(rule: &crate::registry::ConverterRule, source_ext: Option<&str>, orig_ext: bool) -> Option<String> {
	let base = match &rule.dest_ext {
		Some(Some(ext)) => Some(format!(".{}", ext.trim_start_matches('.'))),
		Some(None) => None,
		None => source_ext.map(|e| format!(".{e}")),
	};

	if orig_ext {
		let source = source_ext.map(|e| format!(".{e}"));
		if base != source {
			return Some(format!("{}{}", source.unwrap_or_default(), base.unwrap_or_default()));
		}
	}
	base
}

fn extension_of(path: &Path) -> Option<String> {
	path.extension().map(|e| e.to_string_lossy().into_owned())
}

fn relative_to(base: &Path, path: &Path) -> String {
	path.strip_prefix(base)
		.unwrap_or(path)
		.to_string_lossy()
		.replace('\\', "/")
}

fn file_size(path: &Path) -> Option<i64> {
	std::fs::metadata(path).ok().map(|m| m.len() as i64)
}

/// Fold the current extension into the stem and drop it, matching the
/// rename signal's intent (the identifier no longer trusts the extension).
fn rename_with_extension_folded_in(path: &Path) -> Result<PathBuf> {
	let stem = path.file_stem().unwrap_or_default().to_string_lossy();
	let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
	let new_name = match ext {
		Some(ext) => format!("{stem}.{ext}"),
		None => stem.into_owned(),
	};
	let new_path = path.with_file_name(new_name);
	std::fs::rename(path, &new_path)?;
	Ok(new_path)
}

/// Persist a terminal `Failed` status for an entry whose identification or
/// execution raised an error outside rule evaluation (unreadable file,
/// missing converter binary, etc). Advances `status_ts` so the row isn't
/// reselected by the next pass.
async fn fail_entry(cfg: &RunnerConfig<'_>, mut entry: FileEntry, reason: &str) -> Result<RunOutcome> {
	entry.status = Status::Failed;
	tracing::error!(path = %entry.path, error = reason, "entry failed outside rule evaluation");
	cfg.catalog.update(&entry).await?;
	Ok(RunOutcome::Done)
}

/// Rename `path` to carry `ext` in place of whatever extension it has now.
fn rename_with_extension(path: &Path, ext: &str) -> Result<PathBuf> {
	let stem = path.file_stem().unwrap_or_default().to_string_lossy();
	let new_path = path.with_file_name(format!("{stem}.{ext}"));
	if new_path != path {
		std::fs::rename(path, &new_path)?;
	}
	Ok(new_path)
}

async fn mirror_original(cfg: &RunnerConfig<'_>, entry: &FileEntry, source_path: &Path, copy_path: &Path) -> Result<()> {
	if !entry.is_root() || cfg.source_dir == cfg.dest_dir {
		return Ok(());
	}
	if let Some(parent) = copy_path.parent() {
		tokio::fs::create_dir_all(parent).await?;
	}
	if !copy_path.exists() {
		tokio::fs::copy(source_path, copy_path).await?;
	}
	Ok(())
}

fn cleanup_pre_copy(cfg: &RunnerConfig<'_>, entry: &FileEntry, copy_path: &Path, dest_path: &Path) {
	if entry.kept || cfg.keep_originals {
		return;
	}
	if copy_path != dest_path && copy_path.exists() {
		let _ = std::fs::remove_file(copy_path);
	}
}

async fn remove_partial(path: &Path) {
	if path.is_dir() {
		let _ = tokio::fs::remove_dir_all(path).await;
	} else if path.is_file() {
		let _ = tokio::fs::remove_file(path).await;
	}
}

async fn cleanup_scratch(path: &Path) {
	if path.is_dir() {
		let _ = tokio::fs::remove_dir_all(path).await;
	} else if path.is_file() {
		let _ = tokio::fs::remove_file(path).await;
	}
}

fn classify_failure(outcome: &ProcessOutcome) -> Status {
	match outcome {
		ProcessOutcome::TimedOut => Status::Timeout,
		ProcessOutcome::Completed { stdout, .. } if stdout.contains("file requires a password for access") => {
			Status::Protected
		}
		ProcessOutcome::Completed { .. } => Status::Failed,
	}
}
