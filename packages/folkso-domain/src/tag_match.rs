use serde::{Deserialize, Serialize};

/// How a multi-tag filter combines its tags.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMatch {
	/// Item matches if it carries at least one of the tags.
	#[default]
	Any,
	/// Item matches only if it carries every tag.
	All,
}
impl TagMatch {
	/// Lenient parse: unknown values collapse to [`TagMatch::Any`] rather than
	/// erroring, so a garbled query parameter degrades to the broader filter.
	pub fn normalize(raw: &str) -> Self {
		match raw.trim().to_ascii_lowercase().as_str() {
			"all" => Self::All,
			_ => Self::Any,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::TagMatch;

	#[test]
	fn normalize_accepts_all_in_any_case() {
		assert_eq!(TagMatch::normalize("all"), TagMatch::All);
		assert_eq!(TagMatch::normalize("ALL"), TagMatch::All);
		assert_eq!(TagMatch::normalize(" All "), TagMatch::All);
	}

	#[test]
	fn normalize_collapses_unknown_values_to_any() {
		assert_eq!(TagMatch::normalize("any"), TagMatch::Any);
		assert_eq!(TagMatch::normalize("bogus"), TagMatch::Any);
		assert_eq!(TagMatch::normalize(""), TagMatch::Any);
	}

	#[test]
	fn default_is_any() {
		assert_eq!(TagMatch::default(), TagMatch::Any);
	}
}
