//! C6: archive fan-out.
//!
//! After the runner reports an archive expanded into a directory, this walks
//! the extraction tree and registers each member as a child catalog row
//! pointing back at the container via `source_id`. Identification of each
//! child is deferred to its own runner pass, same as any other `new` entry.

use std::path::Path;

use crate::catalog::{Catalog, CatalogError, NewFileEntry};
use crate::driver::enumerate::scan_dir;

/// Walk `extracted_dir` (a subtree of `dest_dir`) and append one child row
/// per member file, linked to `container_id`. Returns the number appended.
pub async fn expand(
	catalog: &Catalog,
	dest_dir: &Path,
	extracted_dir: &Path,
	container_id: i32,
) -> Result<usize, CatalogError> {
	let paths = scan_dir(extracted_dir, dest_dir);
	let entries: Vec<NewFileEntry> = paths
		.into_iter()
		.map(|p| NewFileEntry::child(p, container_id))
		.collect();
	catalog.append(entries).await
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn appends_members_with_container_as_source() {
		let dir = tempfile::tempdir().unwrap();
		let db_path = dir.path().join("catalog.sqlite");
		let catalog = Catalog::open(db_path.to_str().unwrap()).await.unwrap();

		let container = catalog
			.add(NewFileEntry::root("bundle.zip"))
			.await
			.unwrap();

		let dest = dir.path().join("dest");
		let extracted = dest.join("bundle.zip");
		std::fs::create_dir_all(&extracted).unwrap();
		std::fs::write(extracted.join("a.txt"), b"a").unwrap();
		std::fs::write(extracted.join("b.txt"), b"b").unwrap();

		let appended = expand(&catalog, &dest, &extracted, container.id).await.unwrap();
		assert_eq!(appended, 2);
	}
}
