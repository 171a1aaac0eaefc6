use chrono::NaiveDateTime;

use super::entities::FileModel;
use super::status::Status;

/// Domain-level view of a catalog row, decoupled from the `sea_orm` entity
/// so the rest of the engine never has to think about `ActiveModel`s.
#[derive(Clone, Debug, PartialEq)]
pub struct FileEntry {
	pub id: i32,
	pub path: String,
	pub size: Option<i64>,
	pub puid: Option<String>,
	pub format: Option<String>,
	pub version: Option<String>,
	pub mime: Option<String>,
	pub encoding: Option<String>,
	pub ext: Option<String>,
	pub status: Status,
	pub status_ts: Option<NaiveDateTime>,
	pub kept: bool,
	pub source_id: Option<i32>,
}

impl FileEntry {
	pub fn is_root(&self) -> bool {
		self.source_id.is_none()
	}
}

impl TryFrom<FileModel> for FileEntry {
	type Error = String;

	fn try_from(m: FileModel) -> Result<Self, Self::Error> {
		Ok(Self {
			id: m.id,
			path: m.path,
			size: m.size,
			puid: m.puid,
			format: m.format,
			version: m.version,
			mime: m.mime,
			encoding: m.encoding,
			ext: m.ext,
			status: m.status.parse()?,
			status_ts: m.status_ts,
			kept: m.kept,
			source_id: m.source_id,
		})
	}
}

/// A not-yet-persisted row, as produced by enumeration or archive fan-out.
#[derive(Clone, Debug, Default)]
pub struct NewFileEntry {
	pub path: String,
	pub size: Option<i64>,
	pub source_id: Option<i32>,
	pub status: Option<Status>,
}

impl NewFileEntry {
	pub fn root(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			size: None,
			source_id: None,
			status: Some(Status::New),
		}
	}

	pub fn child(path: impl Into<String>, source_id: i32) -> Self {
		Self {
			path: path.into(),
			size: None,
			source_id: Some(source_id),
			status: Some(Status::New),
		}
	}
}
