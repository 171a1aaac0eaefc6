//! Shared test harness: a catalog + identifier wired to stub `sf`/`file`
//! binaries instead of the real PRONOM/libmagic tools, so these tests don't
//! depend on anything being installed on the machine that runs them. The
//! stub scripts classify by the path's extension, which is all these
//! scenarios need.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pwnorm::catalog::Catalog;
use pwnorm::identify::{Identifier, IdentifierBinaries};
use pwnorm::registry::ConverterRegistry;
use pwnorm::runner::RunnerConfig;

pub struct Harness {
	pub root: tempfile::TempDir,
	pub source_dir: PathBuf,
	pub dest_dir: PathBuf,
	pub scratch_dir: PathBuf,
	pub catalog: Catalog,
	pub identifier: Identifier,
}

impl Harness {
	pub async fn new() -> Self {
		let root = tempfile::tempdir().expect("tempdir");
		let source_dir = root.path().join("source");
		let dest_dir = root.path().join("dest");
		let scratch_dir = root.path().join("scratch");
		fs::create_dir_all(&source_dir).unwrap();
		fs::create_dir_all(&dest_dir).unwrap();
		fs::create_dir_all(&scratch_dir).unwrap();

		let db_path = root.path().join("catalog.sqlite");
		let catalog = Catalog::open(db_path.to_str().unwrap())
			.await
			.expect("open catalog");

		let identifier = Identifier::new(write_stub_binaries(root.path()));

		Self {
			root,
			source_dir,
			dest_dir,
			scratch_dir,
			catalog,
			identifier,
		}
	}

	pub fn runner_config<'a>(&'a self, registry: &'a ConverterRegistry) -> RunnerConfig<'a> {
		RunnerConfig {
			catalog: &self.catalog,
			identifier: &self.identifier,
			registry,
			source_dir: &self.source_dir,
			dest_dir: &self.dest_dir,
			scratch_dir: &self.scratch_dir,
			default_timeout: Duration::from_secs(5),
			orig_ext: false,
			keep_originals: false,
			set_source_ext: false,
			identify_only: false,
		}
	}

	pub fn write_source(&self, relative: &str, contents: &[u8]) -> PathBuf {
		let path = self.source_dir.join(relative);
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).unwrap();
		}
		fs::write(&path, contents).unwrap();
		path
	}

	pub fn write_registry(&self, yaml: &str) -> ConverterRegistry {
		let path = self.root.path().join("converters.yml");
		fs::write(&path, yaml).unwrap();
		ConverterRegistry::load(&path, None).unwrap()
	}
}

fn write_script(dir: &Path, name: &str, body: &str) -> String {
	let path = dir.join(name);
	fs::write(&path, body).unwrap();
	let mut perms = fs::metadata(&path).unwrap().permissions();
	perms.set_mode(0o755);
	fs::set_permissions(&path, perms).unwrap();
	path.to_string_lossy().into_owned()
}

/// A `sf -json <path>` stand-in that classifies by file extension, and a
/// `file --mime-type|-b <path>` stand-in that's never reached in these
/// tests (the stub `sf` always returns a match) but still needs to exist so
/// a resolver misconfiguration would fail loudly rather than silently.
fn write_stub_binaries(dir: &Path) -> IdentifierBinaries {
	let sf = write_script(
		dir,
		"sf-stub",
		r#"#!/bin/sh
path="$2"
size=$(wc -c < "$path" 2>/dev/null || echo 0)
case "$path" in
	*.docx.pdf)
		mime="application/pdf"; fmt="Acrobat PDF 1.4"; puid="fmt/18"; ver="1b" ;;
	*.docx)
		mime="application/vnd.openxmlformats-officedocument.wordprocessingml.document"
		fmt="Office Open XML Text"; puid="fmt/412"; ver="" ;;
	*.doc|*.dot)
		mime="application/msword"; fmt="Microsoft Word 97-2003"; puid="fmt/40"; ver="" ;;
	*.pdf)
		mime="application/pdf"; fmt="Acrobat PDF 1.4"; puid="fmt/18"; ver="1b" ;;
	*.zip)
		mime="application/zip"; fmt="ZIP Format"; puid="x-fmt/263"; ver="" ;;
	*.txt|*.csv)
		mime="text/plain"; fmt="Plain Text File"; puid="x-fmt/111"; ver="" ;;
	*)
		echo '{"files":[]}'
		exit 0
		;;
esac
printf '{"files":[{"filesize":%s,"matches":[{"id":"%s","format":"%s","version":"%s","mime":"%s"}]}]}\n' \
	"$size" "$puid" "$fmt" "$ver" "$mime"
"#,
	);

	let file = write_script(
		dir,
		"file-stub",
		r#"#!/bin/sh
echo "application/octet-stream"
"#,
	);

	IdentifierBinaries {
		siegfried: sf,
		file,
	}
}
