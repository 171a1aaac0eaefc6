use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{Catalog, CatalogError, Predicate};
use crate::fanout;
use crate::identify::Identifier;
use crate::registry::ConverterRegistry;
use crate::runner::{self, RunOutcome, RunnerConfig};

use super::counters::Counters;

/// Paths and flags shared by every worker, independent of which partition
/// it's driving.
#[derive(Clone)]
pub struct PartitionStatics {
	pub source_dir: PathBuf,
	pub dest_dir: PathBuf,
	pub scratch_dir: PathBuf,
	pub default_timeout: Duration,
	pub orig_ext: bool,
	pub keep_originals: bool,
	pub set_source_ext: bool,
	pub identify_only: bool,
}

/// Select-run-update in a loop until `predicate` selects nothing. Used both
/// for the single in-process worker and for each `--multi` partition.
pub async fn run_partition(
	catalog: Arc<Catalog>,
	identifier: Arc<Identifier>,
	registry: Arc<ConverterRegistry>,
	statics: PartitionStatics,
	predicate: Predicate,
	counters: Arc<Counters>,
) -> Result<(), CatalogError> {
	loop {
		let mut batch = catalog.select(&predicate, Some(1)).await?;
		let Some(entry) = batch.pop() else {
			break;
		};
		let container_id = entry.id;

		let cfg = RunnerConfig {
			catalog: &catalog,
			identifier: &identifier,
			registry: &registry,
			source_dir: &statics.source_dir,
			dest_dir: &statics.dest_dir,
			scratch_dir: &statics.scratch_dir,
			default_timeout: statics.default_timeout,
			orig_ext: statics.orig_ext,
			keep_originals: statics.keep_originals,
			set_source_ext: statics.set_source_ext,
			identify_only: statics.identify_only,
		};

		match runner::run(&cfg, entry).await {
			Ok(RunOutcome::Done) => {}
			Ok(RunOutcome::Expanded(dir)) => {
				match fanout::expand(&catalog, &statics.dest_dir, &dir, container_id).await {
					Ok(appended) if appended > 0 => counters.add_remains(appended as u64),
					Ok(_) => {}
					Err(e) => tracing::error!(error = %e, "archive fan-out failed"),
				}
			}
			Err(e) => {
				tracing::error!(error = %e, container_id, "runner failed for entry");
			}
		}

		counters.mark_finished(1);
	}

	Ok(())
}
