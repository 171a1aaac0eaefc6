use chrono::NaiveDateTime;

use super::status::Status;

/// Selection mode; determines how the default status clause is built and
/// whether selection has side effects.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
	/// `status NOT IN finished AND (status_ts IS NULL OR status_ts < batch_ts)`
	#[default]
	Conversion,
	/// Roots only, ignore status, reset to `new` before selecting.
	Reconvert,
	/// Include terminal-failure statuses alongside the default clause.
	Retry,
	/// Invert the default status clause — used for end-of-batch reporting.
	Finished,
	/// No base status clause at all — every other field is still applied.
	/// Used by reporting code that wants an exact status match regardless
	/// of which bucket (finished/retryable/neither) it falls in.
	All,
}

/// A compound AND-of-optional-clauses predicate over the catalog. Built
/// with the `with_*` chain and passed to [`crate::catalog::Catalog`]
/// selection methods.
#[derive(Clone, Debug, Default)]
pub struct Predicate {
	pub mode: Mode,
	pub mime: Option<String>,
	pub puid: Option<String>,
	pub status: Option<Status>,
	pub ext: Option<String>,
	pub subpath_prefix: Option<String>,
	pub path_from: Option<String>,
	pub path_to: Option<String>,
	pub status_ts_before: Option<NaiveDateTime>,
	pub status_ts_after: Option<NaiveDateTime>,
	pub original_only: bool,
	pub batch_ts: Option<NaiveDateTime>,
}

impl Predicate {
	pub fn new(mode: Mode) -> Self {
		Self {
			mode,
			..Default::default()
		}
	}

	pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
		self.mime = Some(mime.into());
		self
	}

	pub fn with_puid(mut self, puid: impl Into<String>) -> Self {
		self.puid = Some(puid.into());
		self
	}

	pub fn with_status(mut self, status: Status) -> Self {
		self.status = Some(status);
		self
	}

	pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
		self.ext = Some(ext.into());
		self
	}

	pub fn with_subpath_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.subpath_prefix = Some(prefix.into());
		self
	}

	pub fn with_path_range(mut self, from: Option<String>, to: Option<String>) -> Self {
		self.path_from = from;
		self.path_to = to;
		self
	}

	pub fn original_only(mut self) -> Self {
		self.original_only = true;
		self
	}

	pub fn with_batch_ts(mut self, ts: NaiveDateTime) -> Self {
		self.batch_ts = Some(ts);
		self
	}

	pub fn with_status_ts_after(mut self, ts: NaiveDateTime) -> Self {
		self.status_ts_after = Some(ts);
		self
	}

	pub fn with_status_ts_before(mut self, ts: NaiveDateTime) -> Self {
		self.status_ts_before = Some(ts);
		self
	}
}
