//! Customary-extension lookup used for the rename signal.
//!
//! This is intentionally a small static table rather than a loaded schema:
//! it only needs to answer "is this extension plausible for that MIME type",
//! for the handful of formats this engine actually sees in source trees.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static CUSTOMARY_EXTENSIONS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
	let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
	m.insert("text/plain", &["txt", "text", "log"]);
	m.insert("text/html", &["html", "htm"]);
	m.insert("text/csv", &["csv"]);
	m.insert("text/xml", &["xml"]);
	m.insert("application/xml", &["xml"]);
	m.insert("application/pdf", &["pdf"]);
	m.insert("application/zip", &["zip"]);
	m.insert(
		"application/msword",
		&["doc", "dot"],
	);
	m.insert(
		"application/vnd.openxmlformats-officedocument.wordprocessingml.document",
		&["docx"],
	);
	m.insert("application/vnd.ms-excel", &["xls", "xlt"]);
	m.insert(
		"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
		&["xlsx"],
	);
	m.insert("application/vnd.ms-powerpoint", &["ppt", "pot", "pps"]);
	m.insert(
		"application/vnd.openxmlformats-officedocument.presentationml.presentation",
		&["pptx"],
	);
	m.insert(
		"application/vnd.oasis.opendocument.text",
		&["odt"],
	);
	m.insert("application/rtf", &["rtf"]);
	m.insert("image/jpeg", &["jpg", "jpeg", "jpe"]);
	m.insert("image/png", &["png"]);
	m.insert("image/tiff", &["tif", "tiff"]);
	m.insert("image/gif", &["gif"]);
	m.insert("image/bmp", &["bmp"]);
	m.insert("message/rfc822", &["eml"]);
	m.insert("application/vnd.ms-outlook", &["msg"]);
	m
});

/// MIME types this engine never asks to rename regardless of extension.
pub const RENAME_EXEMPT_MIMES: &[&str] = &[
	"application/octet-stream",
	"application/xml",
	"text/plain",
];

/// Whether `ext` (lowercase, no dot) is a customary extension for `mime`.
/// Returns `None` when the table has no opinion about `mime` at all — callers
/// should treat that as "cannot judge" rather than "mismatch".
pub fn is_customary(mime: &str, ext: &str) -> Option<bool> {
	CUSTOMARY_EXTENSIONS
		.get(mime)
		.map(|exts| exts.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// The primary customary extension for `mime`, used when a source file's
/// extension is being forced to match its identified type. `None` when the
/// table has no opinion about `mime`.
pub fn canonical_extension(mime: &str) -> Option<&'static str> {
	CUSTOMARY_EXTENSIONS.get(mime).and_then(|exts| exts.first().copied())
}
