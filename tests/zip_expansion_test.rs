//! Scenario: a zip archive's converter rule extracts it into a directory.
//! The driver should fan the extracted members out into their own rows
//! (`source_id` pointing at the archive) and keep running the batch until
//! those children reach a terminal status too.

mod support;

use pretty_assertions::assert_eq;

use std::sync::Arc;
use std::time::Duration;

use pwnorm::catalog::{Mode, Predicate, Status};
use pwnorm::driver::{self, BatchOptions};

use support::Harness;

#[tokio::test]
async fn zip_members_are_appended_and_converge() {
	let harness = Harness::new().await;
	harness.write_source("bundle.zip", b"not a real zip, just stub bytes");

	let registry = harness.write_registry(
		r#"
application/zip:
  dest-ext: null
  command: >-
    mkdir -p <dest> &&
    cp <source> <dest>/a.txt &&
    mkdir -p <dest>/b &&
    cp <source> <dest>/b/c.txt &&
    cp <source> <dest>/d.csv

text/plain:
  accept: true
  keep: true
"#,
	);

	let Harness {
		root,
		source_dir,
		dest_dir,
		scratch_dir,
		catalog,
		identifier,
	} = harness;

	let db_path = root.path().join("catalog.sqlite");
	let catalog = Arc::new(catalog);
	let identifier = Arc::new(identifier);
	let registry = Arc::new(registry);

	let opts = BatchOptions {
		source_dir,
		dest_dir: dest_dir.clone(),
		scratch_dir,
		mode: Mode::Conversion,
		multi: false,
		max_concurrent_partitions: 0,
		default_timeout: Duration::from_secs(5),
		orig_ext: false,
		keep_originals: false,
		set_source_ext: false,
		identify_only: false,
	};

	let (predicate, remaining) = driver::prepare(&catalog, &opts).await.unwrap();
	assert_eq!(remaining, 1);

	driver::run_batch(
		Arc::clone(&catalog),
		db_path.to_str().unwrap(),
		identifier,
		registry,
		opts,
		predicate,
	)
	.await
	.unwrap();

	let rows = catalog
		.select(&Predicate::new(Mode::All), None)
		.await
		.unwrap();
	assert_eq!(rows.len(), 4, "archive + 3 extracted members");

	let archive = rows.iter().find(|r| r.path == "bundle.zip").unwrap();
	assert_eq!(archive.status, Status::Converted);

	for member in ["bundle/a.txt", "bundle/b/c.txt", "bundle/d.csv"] {
		let row = rows
			.iter()
			.find(|r| r.path == member)
			.unwrap_or_else(|| panic!("missing row for {member}"));
		assert_eq!(row.source_id, Some(archive.id));
		assert!(matches!(row.status, Status::Accepted | Status::Converted));
	}
}
