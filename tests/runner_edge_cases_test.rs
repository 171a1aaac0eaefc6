//! Regressions for three runner edge cases: a root with no converter rule
//! still needs mirroring into the destination, a runner-side error must
//! land as `failed` instead of leaving the row eligible for reselection
//! forever, and `--set-source-ext` has to actually rename the source.

mod support;

use pretty_assertions::assert_eq;

use std::sync::Arc;
use std::time::Duration;

use pwnorm::catalog::{Mode, Predicate, Status};
use pwnorm::driver::{self, BatchOptions};
use pwnorm::identify::{Identifier, IdentifierBinaries};

use support::Harness;

#[tokio::test]
async fn no_rule_root_is_mirrored_then_skipped() {
	let harness = Harness::new().await;
	harness.write_source("note.txt", b"hello");

	// Registry has no entry at all for text/plain, so resolution returns
	// None for this file.
	let registry = harness.write_registry(
		r#"
application/pdf:
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
	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].status, Status::Skipped);
	assert!(
		dest_dir.join("note.txt").exists(),
		"a root with no converter rule must still be mirrored into the destination"
	);
}

#[tokio::test]
async fn identification_error_is_recorded_as_failed_not_reselected() {
	let harness = Harness::new().await;
	harness.write_source("mystery.bin", b"whatever");

	let registry = harness.write_registry(
		r#"
application/pdf:
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
		..
	} = harness;

	// Point the identifier at binaries that don't exist, so `identify()`
	// fails with an io error rather than coming back empty.
	let identifier = Identifier::new(IdentifierBinaries {
		siegfried: "/no/such/sf-binary".to_string(),
		file: "/no/such/file-binary".to_string(),
	});

	let db_path = root.path().join("catalog.sqlite");
	let catalog = Arc::new(catalog);
	let identifier = Arc::new(identifier);
	let registry = Arc::new(registry);

	let opts = BatchOptions {
		source_dir,
		dest_dir,
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
		Arc::clone(&identifier),
		Arc::clone(&registry),
		opts,
		predicate,
	)
	.await
	.unwrap();

	let rows = catalog
		.select(&Predicate::new(Mode::All), None)
		.await
		.unwrap();
	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].status, Status::Failed);
	assert!(rows[0].status_ts.is_some(), "status_ts must advance so the row isn't reselected");

	// An ordinary conversion predicate against a fresh batch_ts must not
	// pick the row back up: `failed` is in the finished set, so the worker
	// loop would otherwise spin on it forever.
	let conversion_predicate = Predicate::new(Mode::Conversion).with_batch_ts(chrono::Utc::now().naive_utc());
	let remaining = catalog.select(&conversion_predicate, None).await.unwrap();
	assert!(remaining.is_empty(), "a failed row is terminal, not eligible for another ordinary pass");
}

#[tokio::test]
async fn set_source_ext_renames_root_to_canonical_extension() {
	let harness = Harness::new().await;
	// ".dot" is a customary extension for application/msword (so the
	// always-on rename-required check leaves it alone), but it isn't the
	// canonical one — ".doc" is.
	harness.write_source("memo.dot", b"not a real word document");

	let registry = harness.write_registry(
		r#"
application/msword:
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
		source_dir: source_dir.clone(),
		dest_dir,
		scratch_dir,
		mode: Mode::Conversion,
		multi: false,
		max_concurrent_partitions: 0,
		default_timeout: Duration::from_secs(5),
		orig_ext: false,
		keep_originals: false,
		set_source_ext: true,
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

	assert!(!source_dir.join("memo.dot").exists(), "the old name must be gone");
	assert!(source_dir.join("memo.doc").exists(), "renamed to the canonical extension for its mime");

	let rows = catalog
		.select(&Predicate::new(Mode::All), None)
		.await
		.unwrap();
	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].path, "memo.doc");
	assert_eq!(rows[0].ext.as_deref(), Some("doc"));
	assert_eq!(rows[0].status, Status::Accepted);
}
