//! Command-line surface, built with the same `clap::Subcommand`/`ValueEnum`
//! idiom as `infra/cli/commands/file.rs`. This is a thin contract layer:
//! every subcommand just builds engine types and calls into `driver`/
//! `catalog` directly.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::catalog::Status;

#[derive(Parser, Debug)]
#[command(name = "pwnorm", version, about = "Batch file-normalization engine")]
pub struct Cli {
	/// Optional engine config file (YAML). Falls back to built-in defaults.
	#[arg(long, global = true)]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Run (or resume) a batch conversion over a source tree.
	Convert(ConvertArgs),
	/// Print the per-status tally for a catalog without running a batch.
	Status(StatusArgs),
	/// Run migrations against a catalog path without starting a batch.
	InitDb(InitDbArgs),
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
	/// Source directory to enumerate.
	pub source: PathBuf,

	/// Destination directory. Defaults to `<source>-conv`.
	#[arg(long)]
	pub dest: Option<PathBuf>,

	/// Catalog location: a filesystem path (sqlite) or a `postgres://` URL.
	#[arg(long, default_value = "catalog.sqlite")]
	pub db: String,

	/// Base converter registry file (YAML).
	#[arg(long, default_value = "converters.yml")]
	pub registry: PathBuf,

	/// Optional local overrides layered on top of `--registry`.
	#[arg(long)]
	pub registry_override: Option<PathBuf>,

	#[arg(long)]
	pub mime: Option<String>,
	#[arg(long)]
	pub puid: Option<String>,
	#[arg(long)]
	pub ext: Option<String>,
	#[arg(long, value_enum)]
	pub status: Option<CliStatus>,
	#[arg(long = "from-path")]
	pub from_path: Option<String>,
	#[arg(long = "to-path")]
	pub to_path: Option<String>,

	/// Reset every root entry to `new` and cascade-delete its descendants.
	#[arg(long)]
	pub reconvert: bool,
	/// Pick back up entries left `failed`/`timeout`/`protected`.
	#[arg(long)]
	pub retry: bool,
	/// Identify every selected entry and stop, without converting.
	#[arg(long = "identify-only")]
	pub identify_only: bool,
	/// Sweep the catalog for missing files and mark them `deleted`, then exit.
	#[arg(long)]
	pub filecheck: bool,
	/// Partition work across subfolders, one worker thread per subfolder.
	#[arg(long)]
	pub multi: bool,
	/// Retain originals alongside converted output even when the rule
	/// doesn't ask for it.
	#[arg(long = "keep-originals")]
	pub keep_originals: bool,
	/// Fold the source extension into the destination filename.
	#[arg(long = "orig-ext")]
	pub orig_ext: bool,
	/// Rename source files in place once identification corrects their
	/// extension.
	#[arg(long = "set-source-ext")]
	pub set_source_ext: bool,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
	#[arg(long, default_value = "catalog.sqlite")]
	pub db: String,
}

#[derive(clap::Args, Debug)]
pub struct InitDbArgs {
	#[arg(long, default_value = "catalog.sqlite")]
	pub db: String,
}

/// Mirrors [`Status`] for `--status`; kept separate so catalog internals
/// don't have to derive `ValueEnum`.
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum CliStatus {
	New,
	Accepted,
	Converted,
	Renamed,
	Skipped,
	Removed,
	Failed,
	Timeout,
	Protected,
	Deleted,
}

impl From<CliStatus> for Status {
	fn from(s: CliStatus) -> Self {
		match s {
			CliStatus::New => Status::New,
			CliStatus::Accepted => Status::Accepted,
			CliStatus::Converted => Status::Converted,
			CliStatus::Renamed => Status::Renamed,
			CliStatus::Skipped => Status::Skipped,
			CliStatus::Removed => Status::Removed,
			CliStatus::Failed => Status::Failed,
			CliStatus::Timeout => Status::Timeout,
			CliStatus::Protected => Status::Protected,
			CliStatus::Deleted => Status::Deleted,
		}
	}
}
