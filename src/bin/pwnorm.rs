//! CLI entrypoint: parse arguments, load configuration, dispatch to the
//! engine library. Kept deliberately thin — every real decision lives in
//! `pwnorm::driver`/`pwnorm::catalog`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pwnorm::catalog::{Catalog, Mode, Predicate, Status};
use pwnorm::cli::{Cli, Command, ConvertArgs, InitDbArgs, StatusArgs};
use pwnorm::config::EngineConfig;
use pwnorm::driver::{self, BatchOptions};
use pwnorm::identify::{Identifier, IdentifierBinaries};
use pwnorm::registry::ConverterRegistry;
use pwnorm::{EngineError, Result};

const ALL_STATUSES: &[Status] = &[
	Status::New,
	Status::Accepted,
	Status::Converted,
	Status::Renamed,
	Status::Skipped,
	Status::Removed,
	Status::Failed,
	Status::Timeout,
	Status::Protected,
	Status::Deleted,
];

#[tokio::main]
async fn main() {
	init_logging();

	if let Err(err) = run().await {
		tracing::error!(error = %err, "pwnorm failed");
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn init_logging() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run() -> Result<()> {
	let cli = Cli::parse();
	let config = EngineConfig::load(cli.config.as_deref())?;

	match cli.command {
		Command::Convert(args) => convert(&config, args).await,
		Command::Status(args) => status(&args).await,
		Command::InitDb(args) => init_db(&args).await,
	}
}

async fn convert(config: &EngineConfig, args: ConvertArgs) -> Result<()> {
	let source_dir = args.source.clone();
	if !source_dir.exists() {
		return Err(EngineError::SourceMissing(source_dir));
	}
	let dest_dir = args.dest.clone().unwrap_or_else(|| default_dest(&source_dir));

	let catalog = Arc::new(Catalog::open(&args.db).await?);

	if args.filecheck {
		let marked = driver::filecheck::run(&catalog, &source_dir, &dest_dir).await?;
		tracing::info!(marked, "filecheck complete, marked entries deleted");
		return Ok(());
	}

	let registry = Arc::new(ConverterRegistry::load(
		&args.registry,
		args.registry_override.as_deref(),
	)?);
	let identifier = Arc::new(Identifier::new(IdentifierBinaries::default()));

	let mode = if args.reconvert {
		Mode::Reconvert
	} else if args.retry {
		Mode::Retry
	} else {
		Mode::Conversion
	};

	let opts = BatchOptions {
		source_dir: source_dir.clone(),
		dest_dir: dest_dir.clone(),
		scratch_dir: config.scratch_dir.clone(),
		mode,
		multi: args.multi,
		max_concurrent_partitions: config.max_concurrent_partitions,
		default_timeout: Duration::from_secs(config.default_timeout_secs),
		orig_ext: args.orig_ext,
		keep_originals: args.keep_originals,
		set_source_ext: args.set_source_ext,
		identify_only: args.identify_only,
	};

	let (mut predicate, remaining) = driver::prepare(&catalog, &opts).await?;
	predicate = apply_filters(predicate, &args);

	tracing::info!(remaining, dest = %dest_dir.display(), "starting batch");

	let report = driver::run_batch(catalog, &args.db, identifier, registry, opts, predicate).await?;

	for (status, count) in &report.counts {
		println!("{status:>10}: {count}");
	}

	Ok(())
}

fn apply_filters(mut predicate: Predicate, args: &ConvertArgs) -> Predicate {
	if let Some(mime) = &args.mime {
		predicate = predicate.with_mime(mime.clone());
	}
	if let Some(puid) = &args.puid {
		predicate = predicate.with_puid(puid.clone());
	}
	if let Some(ext) = &args.ext {
		predicate = predicate.with_ext(ext.clone());
	}
	if let Some(status) = args.status {
		predicate = predicate.with_status(status.into());
	}
	if args.from_path.is_some() || args.to_path.is_some() {
		predicate = predicate.with_path_range(args.from_path.clone(), args.to_path.clone());
	}
	predicate
}

fn default_dest(source: &PathBuf) -> PathBuf {
	let mut name = source
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_default();
	name.push_str("-conv");
	source
		.parent()
		.map(|p| p.join(&name))
		.unwrap_or_else(|| PathBuf::from(name))
}

async fn status(args: &StatusArgs) -> Result<()> {
	let catalog = Catalog::open(&args.db).await?;
	for &s in ALL_STATUSES {
		let n = catalog
			.count(&Predicate::new(Mode::All).with_status(s))
			.await?;
		if n > 0 {
			println!("{s:>10}: {n}");
		}
	}
	Ok(())
}

async fn init_db(args: &InitDbArgs) -> Result<()> {
	Catalog::open(&args.db).await?;
	println!("catalog ready at {}", args.db);
	Ok(())
}
