use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Partition a content item lives in. Content ids are unique only within
/// their partition, so every junction row carries the source as well.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
	/// User-authored content.
	Items,
	/// System-generated content.
	Auto,
}
impl ContentSource {
	pub const ALL: [Self; 2] = [Self::Items, Self::Auto];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Items => "items",
			Self::Auto => "auto",
		}
	}
}
impl fmt::Display for ContentSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for ContentSource {
	type Err = ParseSourceError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"items" => Ok(Self::Items),
			"auto" => Ok(Self::Auto),
			_ => Err(ParseSourceError { raw: raw.to_string() }),
		}
	}
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown content source {raw:?}; expected one of items, auto.")]
pub struct ParseSourceError {
	pub raw: String,
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use super::ContentSource;

	#[test]
	fn parses_known_sources_case_insensitively() {
		assert_eq!(ContentSource::from_str("items").expect("items"), ContentSource::Items);
		assert_eq!(ContentSource::from_str(" AUTO ").expect("auto"), ContentSource::Auto);
	}

	#[test]
	fn rejects_unknown_sources() {
		let err = ContentSource::from_str("archive").expect_err("expected parse failure");

		assert!(err.to_string().contains("archive"));
	}

	#[test]
	fn serializes_as_snake_case_strings() {
		let json = serde_json::to_string(&ContentSource::Items).expect("serialize");

		assert_eq!(json, "\"items\"");

		let parsed: ContentSource = serde_json::from_str("\"auto\"").expect("deserialize");

		assert_eq!(parsed, ContentSource::Auto);
	}
}
