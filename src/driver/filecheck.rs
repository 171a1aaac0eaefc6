use std::path::Path;

use crate::catalog::{Catalog, CatalogError, Mode, Predicate, Status};

/// Sweep every catalog entry and mark `deleted` any whose backing file no
/// longer exists on disk. `deleted` is never inferred by the normal
/// conversion path — this is the only place that writes it.
pub async fn run(catalog: &Catalog, source_dir: &Path, dest_dir: &Path) -> Result<u64, CatalogError> {
	let entries = catalog.select(&Predicate::new(Mode::All), None).await?;
	let mut marked = 0;

	for mut entry in entries {
		if entry.status == Status::Deleted {
			continue;
		}
		let path = if entry.source_id.is_some() {
			dest_dir.join(&entry.path)
		} else {
			source_dir.join(&entry.path)
		};
		if !path.exists() {
			entry.status = Status::Deleted;
			catalog.update(&entry).await?;
			marked += 1;
		}
	}

	Ok(marked)
}
