use std::collections::HashSet;

use uuid::Uuid;

/// Drops duplicate tag ids while keeping the first occurrence of each in its
/// original position. Filter semantics and cardinality ranking both depend on
/// the surviving order, so this never sorts.
pub fn dedup_preserving_order(tag_ids: &[Uuid]) -> Vec<Uuid> {
	let mut seen = HashSet::with_capacity(tag_ids.len());
	let mut deduped = Vec::with_capacity(tag_ids.len());

	for id in tag_ids {
		if seen.insert(*id) {
			deduped.push(*id);
		}
	}

	deduped
}

/// Canonical slug form for a tag label: lowercase ASCII alphanumerics with
/// single interior hyphens. Returns `None` when nothing survives.
pub fn normalize_slug(raw: &str) -> Option<String> {
	let mut slug = String::with_capacity(raw.len());
	let mut pending_hyphen = false;

	for ch in raw.chars() {
		if ch.is_ascii_alphanumeric() {
			if pending_hyphen && !slug.is_empty() {
				slug.push('-');
			}

			pending_hyphen = false;

			slug.push(ch.to_ascii_lowercase());
		} else {
			pending_hyphen = true;
		}
	}

	if slug.is_empty() { None } else { Some(slug) }
}

#[cfg(test)]
mod tests {
	use uuid::Uuid;

	use super::{dedup_preserving_order, normalize_slug};

	#[test]
	fn dedup_keeps_first_occurrence_order() {
		let t1 = Uuid::new_v4();
		let t2 = Uuid::new_v4();
		let deduped = dedup_preserving_order(&[t1, t2, t1, t2, t1]);

		assert_eq!(deduped, vec![t1, t2]);
	}

	#[test]
	fn dedup_of_empty_input_is_empty() {
		assert!(dedup_preserving_order(&[]).is_empty());
	}

	#[test]
	fn slug_collapses_separator_runs() {
		assert_eq!(normalize_slug("  My Tag!! "), Some("my-tag".to_string()));
		assert_eq!(normalize_slug("rust_lang  2024"), Some("rust-lang-2024".to_string()));
	}

	#[test]
	fn slug_of_pure_punctuation_is_none() {
		assert_eq!(normalize_slug("---"), None);
		assert_eq!(normalize_slug(""), None);
	}
}
