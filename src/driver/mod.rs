//! C5: the batch driver.
//!
//! Enumerates (or resumes enumerating) the source tree, seeds the catalog,
//! partitions work across subfolders when asked to, and reports the
//! per-status tally for everything touched in this batch.

pub mod counters;
pub mod enumerate;
pub mod filecheck;
mod partition;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, Utc};

use crate::catalog::{Catalog, CatalogError, Mode, Predicate, Status};
use crate::identify::Identifier;
use crate::registry::ConverterRegistry;

pub use counters::Counters;
pub use partition::PartitionStatics;

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

pub struct BatchOptions {
	pub source_dir: PathBuf,
	pub dest_dir: PathBuf,
	pub scratch_dir: PathBuf,
	pub mode: Mode,
	pub multi: bool,
	/// Cap on simultaneously running partition threads in `--multi` mode.
	/// `0` means "one thread per discovered subfolder, no cap".
	pub max_concurrent_partitions: usize,
	pub default_timeout: Duration,
	pub orig_ext: bool,
	pub keep_originals: bool,
	pub set_source_ext: bool,
	pub identify_only: bool,
}

#[derive(Debug, Default)]
pub struct BatchReport {
	pub counts: BTreeMap<Status, u64>,
	pub batch_ts: Option<NaiveDateTime>,
}

/// Ensure the destination exists, seed the catalog if this looks like a
/// fresh batch, and return the predicate (with `batch_ts` attached) that the
/// caller should inspect before deciding whether to proceed.
pub async fn prepare(catalog: &Catalog, opts: &BatchOptions) -> Result<(Predicate, u64), CatalogError> {
	tokio::fs::create_dir_all(&opts.dest_dir).await?;

	// Reconvert is a one-time reset, not a standing selection mode: it picks
	// every root regardless of status, resets it to `new`, and cascades the
	// descendant delete so fan-out doesn't pile fresh rows on stale ones.
	// This has to happen *before* `batch_ts` is captured below — the reset
	// stamps `status_ts = now()` on each root, and the ordinary conversion
	// predicate the batch loop runs under only picks up rows whose
	// `status_ts` is still behind `batch_ts`. Reset-then-capture keeps the
	// reset rows eligible for the very batch that just reset them; the
	// other order would have the loop immediately see them as already
	// touched and select nothing.
	if opts.mode == Mode::Reconvert {
		let reset_predicate = Predicate::new(Mode::Reconvert);
		let roots = catalog.select(&reset_predicate, None).await?;
		for root in &roots {
			catalog.delete_descendants(root.id).await?;
		}
	}

	let batch_ts = Utc::now().naive_utc();

	let sidecar = enumerate::sidecar_path(&opts.dest_dir);
	let paths = if sidecar.exists() {
		enumerate::read_sidecar(&sidecar)
			.await
			.unwrap_or_default()
	} else {
		let found = enumerate::scan(&opts.source_dir);
		let _ = enumerate::write_sidecar(&sidecar, &found).await;
		found
	};

	if !paths.is_empty() {
		catalog.append(enumerate::to_new_entries(paths)).await?;
	}

	// A reconverted root runs the rest of the batch through the ordinary
	// conversion predicate. The roots-only predicate has no `status_ts`
	// guard (it has to match regardless of prior status, to reach entries
	// the default predicate would treat as finished), so reusing it for
	// the whole batch loop would reselect the same root forever; it also
	// never matches the non-root children fan-out recreates.
	let effective_mode = if opts.mode == Mode::Reconvert {
		Mode::Conversion
	} else {
		opts.mode
	};
	let predicate = Predicate::new(effective_mode).with_batch_ts(batch_ts);

	let remaining = catalog.count(&predicate).await?;
	Ok((predicate, remaining))
}

/// Run the batch to completion: either a single in-process worker loop, or
/// one OS thread per top-level subfolder when `multi` is set. `db_path` is
/// the same `--db` argument `catalog` was opened from — each `--multi`
/// partition thread opens its own connection pool against it, since a
/// sea_orm pool is tied to the tokio runtime that created it and each
/// partition drives its own single-threaded runtime.
pub async fn run_batch(
	catalog: Arc<Catalog>,
	db_path: &str,
	identifier: Arc<Identifier>,
	registry: Arc<ConverterRegistry>,
	opts: BatchOptions,
	predicate: Predicate,
) -> Result<BatchReport, CatalogError> {
	let batch_ts = predicate.batch_ts;
	let statics = PartitionStatics {
		source_dir: opts.source_dir.clone(),
		dest_dir: opts.dest_dir.clone(),
		scratch_dir: opts.scratch_dir.clone(),
		default_timeout: opts.default_timeout,
		orig_ext: opts.orig_ext,
		keep_originals: opts.keep_originals,
		set_source_ext: opts.set_source_ext,
		identify_only: opts.identify_only,
	};

	let remaining = catalog.count(&predicate).await?;
	let counters = Counters::new(remaining);

	if opts.multi {
		let subfolders = catalog.subfolders(&predicate).await?;
		let cap = if opts.max_concurrent_partitions == 0 {
			subfolders.len().max(1)
		} else {
			opts.max_concurrent_partitions
		};

		for chunk in subfolders.chunks(cap) {
			let mut handles = Vec::new();

			for folder in chunk {
				let catalog_path = db_path.to_string();
				let statics = statics.clone();
				let predicate = predicate.clone().with_subpath_prefix(folder.clone());
				let registry = Arc::clone(&registry);
				let identifier = Arc::clone(&identifier);
				let counters = Arc::clone(&counters);

				handles.push(std::thread::spawn(move || -> Result<(), CatalogError> {
					let rt = tokio::runtime::Builder::new_current_thread()
						.enable_all()
						.build()
						.expect("failed to start partition runtime");
					rt.block_on(async move {
						let catalog = Arc::new(Catalog::open(&catalog_path).await?);
						partition::run_partition(catalog, identifier, registry, statics, predicate, counters).await
					})
				}));
			}

			for handle in handles {
				handle.join().expect("partition thread panicked")?;
			}
		}
	} else {
		partition::run_partition(catalog.clone(), identifier, registry, statics, predicate, counters.clone()).await?;
	}

	report(&catalog, batch_ts).await
}

async fn report(catalog: &Catalog, batch_ts: Option<NaiveDateTime>) -> Result<BatchReport, CatalogError> {
	let mut counts = BTreeMap::new();
	for &status in ALL_STATUSES {
		let mut predicate = Predicate::new(Mode::All).with_status(status);
		if let Some(ts) = batch_ts {
			predicate = predicate.with_status_ts_after(ts);
		}
		let count = catalog.count(&predicate).await?;
		if count > 0 {
			counts.insert(status, count);
		}
	}
	Ok(BatchReport { counts, batch_ts })
}
