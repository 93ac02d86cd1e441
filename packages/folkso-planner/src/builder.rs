use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use folkso_domain::{ContentSource, TagMatch, dedup_preserving_order};

use crate::strategy::{Strategy, StrategyChoice, StrategyPlanner};

/// SQL fragment plan for one tag filter, ready to attach to a base query.
/// Built fresh per request and discarded after [`TagPredicate::attach`].
#[derive(Debug)]
pub struct TagPredicate {
	shape: Shape,
	sources: Vec<ContentSource>,
	choice: Option<StrategyChoice>,
}

#[derive(Debug)]
enum Shape {
	Noop,
	AnyExists { tags: Vec<Uuid> },
	PerTagExists { tags: Vec<Uuid> },
	GroupedCount { tags: Vec<Uuid> },
	SeededGroupedCount { tags: Vec<Uuid>, seeds: Vec<Uuid> },
}

/// Turns a tag filter into a [`TagPredicate`].
///
/// Duplicate tag ids collapse to their first occurrence before anything else,
/// so duplicates influence neither k nor the rendered SQL. An empty tag set
/// yields a no-op. Any-match needs no cost decision and bypasses the planner
/// entirely; only all-match consults it.
pub fn apply_tag_filter(
	planner: &StrategyPlanner,
	tag_ids: &[Uuid],
	sources: &[ContentSource],
	tag_match: TagMatch,
) -> TagPredicate {
	let tags = dedup_preserving_order(tag_ids);

	if tags.is_empty() {
		return TagPredicate { shape: Shape::Noop, sources: sources.to_vec(), choice: None };
	}

	match tag_match {
		TagMatch::Any => TagPredicate {
			shape: Shape::AnyExists { tags },
			sources: sources.to_vec(),
			choice: None,
		},
		TagMatch::All => {
			let choice = planner.pick_strategy(&tags, sources);
			let shape = match choice.strategy {
				Strategy::SelfJoin => Shape::PerTagExists { tags },
				Strategy::GroupHaving => Shape::GroupedCount { tags },
				Strategy::TwoPhaseSingle | Strategy::TwoPhaseDual => {
					let seed_len =
						if choice.strategy == Strategy::TwoPhaseDual { 2 } else { 1 };
					// Seed order comes from a fresh cardinality ranking; with
					// fewer distinct tags than seats the seed set just shrinks.
					let seeds = planner
						.rank_by_cardinality(&tags, sources)
						.into_iter()
						.take(seed_len)
						.map(|(tag_id, _)| tag_id)
						.collect::<Vec<_>>();

					Shape::SeededGroupedCount { tags, seeds }
				},
			};

			TagPredicate { shape, sources: sources.to_vec(), choice: Some(choice) }
		},
	}
}

impl TagPredicate {
	pub fn is_noop(&self) -> bool {
		matches!(self.shape, Shape::Noop)
	}

	/// The planning outcome, present only when the planner ran (all-match with
	/// at least one tag).
	pub fn choice(&self) -> Option<&StrategyChoice> {
		self.choice.as_ref()
	}

	/// Appends the filter as `AND ...` fragments to the consumer's query.
	///
	/// `item` is the alias of the base relation and must expose `content_id`
	/// and `source` columns. Correlated probes scope the junction with
	/// `content_source = {item}.source`, and the uncorrelated derived tables
	/// compare on `(content_id, content_source)` row values, so a content id
	/// reused across partitions can never satisfy a filter with rows from
	/// another partition.
	pub fn attach(&self, qb: &mut QueryBuilder<'_, Postgres>, item: &str) {
		match &self.shape {
			Shape::Noop => {},
			Shape::AnyExists { tags } => {
				qb.push(format!(
					" AND EXISTS (SELECT 1 FROM content_tags ct WHERE ct.content_id = {item}.content_id AND ct.content_source = {item}.source AND ct.tag_id = ANY("
				));
				qb.push_bind(tags.clone());
				qb.push("))");
			},
			Shape::PerTagExists { tags } => {
				for tag_id in tags {
					qb.push(format!(
						" AND EXISTS (SELECT 1 FROM content_tags ct WHERE ct.content_id = {item}.content_id AND ct.content_source = {item}.source AND ct.tag_id = "
					));
					qb.push_bind(*tag_id);
					qb.push(")");
				}
			},
			Shape::GroupedCount { tags } => self.push_grouped(qb, item, tags, None),
			Shape::SeededGroupedCount { tags, seeds } =>
				self.push_grouped(qb, item, tags, Some(seeds)),
		}
	}

	fn push_grouped(
		&self,
		qb: &mut QueryBuilder<'_, Postgres>,
		item: &str,
		tags: &[Uuid],
		seeds: Option<&[Uuid]>,
	) {
		qb.push(format!(
			" AND ({item}.content_id, {item}.source) IN (SELECT ct.content_id, ct.content_source FROM content_tags ct WHERE ct.tag_id = ANY("
		));
		qb.push_bind(tags.to_vec());
		qb.push(") AND ct.content_source = ANY(");
		qb.push_bind(self.source_names());
		qb.push(")");

		if let Some(seeds) = seeds {
			if seeds.len() == 1 {
				qb.push(
					" AND (ct.content_id, ct.content_source) IN (SELECT seed.content_id, seed.content_source FROM content_tags seed WHERE seed.tag_id = ",
				);
				qb.push_bind(seeds[0]);
				qb.push(" AND seed.content_source = ANY(");
				qb.push_bind(self.source_names());
				qb.push("))");
			} else {
				qb.push(
					" AND (ct.content_id, ct.content_source) IN (SELECT seed.content_id, seed.content_source FROM content_tags seed WHERE seed.tag_id = ANY(",
				);
				qb.push_bind(seeds.to_vec());
				qb.push(") AND seed.content_source = ANY(");
				qb.push_bind(self.source_names());
				qb.push(
					") GROUP BY seed.content_id, seed.content_source HAVING COUNT(DISTINCT seed.tag_id) = ",
				);
				qb.push_bind(seeds.len() as i64);
				qb.push(")");
			}
		}

		qb.push(" GROUP BY ct.content_id, ct.content_source HAVING COUNT(DISTINCT ct.tag_id) = ");
		qb.push_bind(tags.len() as i64);
		qb.push(")");
	}

	fn source_names(&self) -> Vec<String> {
		self.sources.iter().map(ContentSource::to_string).collect()
	}
}
