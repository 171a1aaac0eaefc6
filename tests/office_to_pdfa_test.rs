//! Scenario: a docx converts to an intermediate PDF (named with `orig_ext`
//! folded in), and that intermediate is itself good enough to accept as-is.
//! Two rows should exist at the end: the docx (`converted`) and a child PDF
//! row (`accepted`) whose `source_id` points back at the docx.

mod support;

use pretty_assertions::assert_eq;

use std::time::Duration;

use pwnorm::catalog::{Mode, NewFileEntry, Predicate, Status};
use pwnorm::runner::{self, RunnerConfig};

use support::Harness;

#[tokio::test]
async fn docx_converts_then_child_pdf_is_accepted() {
	let harness = Harness::new().await;
	harness.write_source("doc.docx", b"pretend office document bytes");

	let registry = harness.write_registry(
		r#"
application/vnd.openxmlformats-officedocument.wordprocessingml.document:
  command: "cp <source> <dest>"
  dest-ext: pdf

application/pdf:
  accept:
    version: ["1b", "2b"]
"#,
	);

	let entry = harness
		.catalog
		.add(NewFileEntry::root("doc.docx"))
		.await
		.unwrap();

	let cfg = RunnerConfig {
		catalog: &harness.catalog,
		identifier: &harness.identifier,
		registry: &registry,
		source_dir: &harness.source_dir,
		dest_dir: &harness.dest_dir,
		scratch_dir: &harness.scratch_dir,
		default_timeout: Duration::from_secs(5),
		orig_ext: true,
		keep_originals: false,
		set_source_ext: false,
		identify_only: false,
	};

	runner::run(&cfg, entry).await.unwrap();

	let rows = harness
		.catalog
		.select(&Predicate::new(Mode::All), None)
		.await
		.unwrap();
	assert_eq!(rows.len(), 2);

	let docx_row = rows.iter().find(|r| r.path == "doc.docx").unwrap();
	assert_eq!(docx_row.status, Status::Converted);

	let pdf_row = rows.iter().find(|r| r.path == "doc.docx.pdf").unwrap();
	assert_eq!(pdf_row.status, Status::Accepted);
	assert_eq!(pdf_row.source_id, Some(docx_row.id));
	assert!(pdf_row.kept);

	assert!(harness.dest_dir.join("doc.docx.pdf").exists());
}
