use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of states a [`crate::catalog::FileEntry`] can be in.
///
/// `Deleted` is only ever written by an explicit file-check operation,
/// never inferred automatically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
	New,
	Accepted,
	Converted,
	Renamed,
	Skipped,
	Removed,
	Failed,
	Timeout,
	Protected,
	Deleted,
}

impl Status {
	/// Statuses that mean "this entry is done, leave it alone" under the
	/// default conversion-mode predicate.
	pub const FINISHED: &'static [Status] = &[
		Status::Converted,
		Status::Accepted,
		Status::Removed,
		Status::Renamed,
	];

	/// Statuses that `--retry` mode picks back up.
	pub const RETRYABLE: &'static [Status] = &[Status::Failed, Status::Timeout, Status::Protected];

	pub fn as_str(&self) -> &'static str {
		match self {
			Status::New => "new",
			Status::Accepted => "accepted",
			Status::Converted => "converted",
			Status::Renamed => "renamed",
			Status::Skipped => "skipped",
			Status::Removed => "removed",
			Status::Failed => "failed",
			Status::Timeout => "timeout",
			Status::Protected => "protected",
			Status::Deleted => "deleted",
		}
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Status {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s {
			"new" => Status::New,
			"accepted" => Status::Accepted,
			"converted" => Status::Converted,
			"renamed" => Status::Renamed,
			"skipped" => Status::Skipped,
			"removed" => Status::Removed,
			"failed" => Status::Failed,
			"timeout" => Status::Timeout,
			"protected" => Status::Protected,
			"deleted" => Status::Deleted,
			other => return Err(format!("unknown status: {other}")),
		})
	}
}
