use std::path::Path;

use chardetng::EncodingDetector;

use super::error::Result;

const SNIFF_LEN: usize = 64 * 1024;

/// Detect the character encoding of a file already identified as text.
/// Reads a bounded prefix in-process rather than shelling out a second time.
pub async fn detect(path: &Path) -> Result<Option<String>> {
	let bytes = tokio::fs::read(path).await?;
	let sniff = &bytes[..bytes.len().min(SNIFF_LEN)];
	if sniff.is_empty() {
		return Ok(None);
	}

	let mut detector = EncodingDetector::new();
	detector.feed(sniff, sniff.len() == bytes.len());
	let encoding = detector.guess(None, true);

	Ok(Some(encoding.name().to_string()))
}
