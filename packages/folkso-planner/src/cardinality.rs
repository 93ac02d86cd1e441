use ahash::AHashMap;
use folkso_domain::ContentSource;
use uuid::Uuid;

/// Key of one snapshot entry: a tag within one content partition.
pub type CardinalityKey = (Uuid, ContentSource);

/// Read access to tag cardinality estimates.
///
/// Implementations return whichever of the requested (tag, source) pairs they
/// know about. Absent pairs are normal (a tag may have no snapshot row yet);
/// the planner substitutes its configured fallback count for each one.
/// Counts are estimates and may lag the live data; they steer cost decisions
/// only, never correctness.
pub trait CardinalitySource: Send + Sync {
	fn get_cardinalities(
		&self,
		tag_ids: &[Uuid],
		sources: &[ContentSource],
	) -> AHashMap<CardinalityKey, i64>;
}

/// Map-backed cardinalities for tests and fixed fixtures.
#[derive(Debug, Default)]
pub struct FixedCardinalities {
	counts: AHashMap<CardinalityKey, i64>,
}
impl FixedCardinalities {
	pub fn from_pairs<I>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (CardinalityKey, i64)>,
	{
		Self { counts: pairs.into_iter().collect() }
	}
}
impl CardinalitySource for FixedCardinalities {
	fn get_cardinalities(
		&self,
		tag_ids: &[Uuid],
		sources: &[ContentSource],
	) -> AHashMap<CardinalityKey, i64> {
		let mut out = AHashMap::with_capacity(tag_ids.len() * sources.len());

		for tag_id in tag_ids {
			for source in sources {
				if let Some(count) = self.counts.get(&(*tag_id, *source)) {
					out.insert((*tag_id, *source), *count);
				}
			}
		}

		out
	}
}

#[cfg(test)]
mod tests {
	use uuid::Uuid;

	use folkso_domain::ContentSource;

	use super::{CardinalitySource, FixedCardinalities};

	#[test]
	fn returns_only_known_pairs() {
		let t1 = Uuid::new_v4();
		let t2 = Uuid::new_v4();
		let source = FixedCardinalities::from_pairs([((t1, ContentSource::Items), 42)]);
		let counts = source.get_cardinalities(&[t1, t2], &ContentSource::ALL);

		assert_eq!(counts.len(), 1);
		assert_eq!(counts.get(&(t1, ContentSource::Items)), Some(&42));
		assert_eq!(counts.get(&(t2, ContentSource::Items)), None);
	}
}
