//! Scenario: a previously converted archive root, with children appended
//! by fan-out, gets reconverted. The cascade-delete that reconvert mode
//! triggers must clear out the old children before the batch repopulates
//! them, rather than piling new rows on top of the stale ones.

mod support;

use pretty_assertions::assert_eq;

use std::sync::Arc;
use std::time::Duration;

use pwnorm::catalog::{Mode, Predicate, Status};
use pwnorm::driver::{self, BatchOptions};

use support::Harness;

#[tokio::test]
async fn reconvert_cascades_delete_before_rerunning() {
	let harness = Harness::new().await;
	harness.write_source("bundle.zip", b"not a real zip, just stub bytes");

	let registry = harness.write_registry(
		r#"
application/zip:
  dest-ext: null
  command: >-
    mkdir -p <dest> &&
    cp <source> <dest>/a.txt &&
    cp <source> <dest>/b.txt

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

	let base_opts = |mode: Mode| BatchOptions {
		source_dir: source_dir.clone(),
		dest_dir: dest_dir.clone(),
		scratch_dir: scratch_dir.clone(),
		mode,
		multi: false,
		max_concurrent_partitions: 0,
		default_timeout: Duration::from_secs(5),
		orig_ext: false,
		keep_originals: false,
		set_source_ext: false,
		identify_only: false,
	};

	let first_opts = base_opts(Mode::Conversion);
	let (predicate, remaining) = driver::prepare(&catalog, &first_opts).await.unwrap();
	assert_eq!(remaining, 1);
	driver::run_batch(
		Arc::clone(&catalog),
		db_path.to_str().unwrap(),
		Arc::clone(&identifier),
		Arc::clone(&registry),
		first_opts,
		predicate,
	)
	.await
	.unwrap();

	let rows = catalog
		.select(&Predicate::new(Mode::All), None)
		.await
		.unwrap();
	assert_eq!(rows.len(), 3, "archive + 2 extracted members");
	let archive = rows.iter().find(|r| r.path == "bundle.zip").unwrap();
	assert_eq!(archive.status, Status::Converted);
	let old_child_ids: Vec<i32> = rows.iter().filter(|r| r.source_id.is_some()).map(|r| r.id).collect();
	assert_eq!(old_child_ids.len(), 2);

	let reconvert_opts = base_opts(Mode::Reconvert);
	let (predicate, remaining) = driver::prepare(&catalog, &reconvert_opts).await.unwrap();
	assert_eq!(remaining, 1, "only the root is reselected under reconvert");
	driver::run_batch(
		Arc::clone(&catalog),
		db_path.to_str().unwrap(),
		identifier,
		registry,
		reconvert_opts,
		predicate,
	)
	.await
	.unwrap();

	let rows = catalog
		.select(&Predicate::new(Mode::All), None)
		.await
		.unwrap();
	assert_eq!(rows.len(), 3, "cascade delete then re-expansion lands back at three rows");

	let archive = rows.iter().find(|r| r.path == "bundle.zip").unwrap();
	assert_eq!(archive.status, Status::Converted);
	assert_eq!(archive.source_id, None);

	let new_child_ids: Vec<i32> = rows.iter().filter(|r| r.source_id.is_some()).map(|r| r.id).collect();
	assert_eq!(new_child_ids.len(), 2);
	for id in &new_child_ids {
		assert!(
			!old_child_ids.contains(id),
			"reconvert must not leave the stale child rows behind"
		);
	}
	for member in ["bundle/a.txt", "bundle/b.txt"] {
		let row = rows
			.iter()
			.find(|r| r.path == member)
			.unwrap_or_else(|| panic!("missing row for {member}"));
		assert_eq!(row.source_id, Some(archive.id));
	}
}
