use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

/// `Option<Option<T>>` normally can't tell "key absent" from "key present
/// with an explicit `null`" apart — both collapse to the outer `None`
/// because `deserialize_option` intercepts the null before it reaches the
/// inner type. Routing the field through this first forces the inner
/// `Option<T>` to see the null, so `dest-ext: null` round-trips as
/// `Some(None)` instead of being indistinguishable from an unset field.
fn deserialize_explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
	T: Deserialize<'de>,
	D: Deserializer<'de>,
{
	Option::deserialize(deserializer).map(Some)
}

/// Acceptance rule for a converter entry: when it matches the file already
/// identified, the file is left alone instead of being converted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Accept {
	#[default]
	Never,
	Always,
	Version(Vec<String>),
	Encoding(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum RawAccept {
	Bool(bool),
	Version { version: Vec<String> },
	Encoding { encoding: Vec<String> },
}

impl From<RawAccept> for Accept {
	fn from(raw: RawAccept) -> Self {
		match raw {
			RawAccept::Bool(true) => Accept::Always,
			RawAccept::Bool(false) => Accept::Never,
			RawAccept::Version { version } => Accept::Version(version),
			RawAccept::Encoding { encoding } => Accept::Encoding(encoding),
		}
	}
}

/// One registry entry as it appears on disk, before `puid`/`source-ext`
/// overlays have been resolved against a specific file.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub(crate) struct RawRule {
	pub command: Option<String>,
	pub accept: Option<RawAccept>,
	#[serde(rename = "dest-ext", default, deserialize_with = "deserialize_explicit_null")]
	pub dest_ext: Option<Option<String>>,
	pub timeout: Option<u64>,
	pub keep: Option<bool>,
	pub remove: Option<bool>,
	pub puid: Option<HashMap<String, RawRule>>,
	#[serde(rename = "source-ext")]
	pub source_ext: Option<HashMap<String, RawRule>>,
}

impl RawRule {
	/// Shallow-merge `overlay` on top of `self`: any field the overlay sets
	/// wins, fields it leaves unset fall back to `self`'s value. `puid`/
	/// `source-ext` tables are not merged further — only the top-level base
	/// entry carries them.
	pub(crate) fn overlay_with(&self, overlay: &RawRule) -> RawRule {
		RawRule {
			command: overlay.command.clone().or_else(|| self.command.clone()),
			accept: overlay.accept.clone().or_else(|| self.accept.clone()),
			dest_ext: overlay.dest_ext.clone().or_else(|| self.dest_ext.clone()),
			timeout: overlay.timeout.or(self.timeout),
			keep: overlay.keep.or(self.keep),
			remove: overlay.remove.or(self.remove),
			puid: self.puid.clone(),
			source_ext: self.source_ext.clone(),
		}
	}
}

/// A fully resolved converter rule for one file, after overlay merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterRule {
	pub command: Option<String>,
	pub accept: Accept,
	/// `None` means unspecified (keep source extension), `Some(None)` means
	/// the rule explicitly drops the extension.
	pub dest_ext: Option<Option<String>>,
	pub timeout: Option<u64>,
	pub keep: bool,
	pub remove: bool,
}

impl From<RawRule> for ConverterRule {
	fn from(raw: RawRule) -> Self {
		ConverterRule {
			command: raw.command,
			accept: raw.accept.map(Accept::from).unwrap_or_default(),
			dest_ext: raw.dest_ext,
			timeout: raw.timeout,
			keep: raw.keep.unwrap_or(false),
			remove: raw.remove.unwrap_or(false),
		}
	}
}

impl ConverterRule {
	/// Whether this rule, applied to a file with the given version/encoding
	/// already identified, means "leave the file as-is".
	pub fn accepts(&self, version: Option<&str>, encoding: Option<&str>) -> bool {
		match &self.accept {
			Accept::Never => false,
			Accept::Always => true,
			Accept::Version(versions) => version.is_some_and(|v| versions.iter().any(|x| x == v)),
			Accept::Encoding(encodings) => {
				encoding.is_some_and(|e| encodings.iter().any(|x| x.eq_ignore_ascii_case(e)))
			}
		}
	}
}
