use std::sync::Arc;

use uuid::Uuid;

use folkso_domain::ContentSource;

use crate::cardinality::CardinalitySource;

/// Predicate shape the builder will construct for an all-match tag filter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
	/// One correlated EXISTS per tag; cheap while the tag count is small.
	SelfJoin,
	/// Grouped distinct-tag counting over the junction rows of all tags.
	GroupHaving,
	/// Grouped counting restricted to candidates holding the rarest tag.
	TwoPhaseSingle,
	/// Grouped counting restricted to candidates holding both rarest tags.
	TwoPhaseDual,
}
impl Strategy {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::SelfJoin => "self_join",
			Self::GroupHaving => "group_having",
			Self::TwoPhaseSingle => "two_phase_single",
			Self::TwoPhaseDual => "two_phase_dual",
		}
	}
}

/// Outcome of one planning pass, kept around for logs and explain payloads.
/// Equal inputs against an unchanged snapshot always produce an equal choice.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrategyChoice {
	pub strategy: Strategy,
	pub k: usize,
	pub rarest_count: i64,
	pub estimated_candidates: i64,
	pub reason: String,
}

/// Chooses a predicate shape from tag cardinalities. Planning is a pure
/// read: it consults the snapshot through [`CardinalitySource`] and never
/// touches live tables.
pub struct StrategyPlanner {
	cfg: folkso_config::Planner,
	cardinalities: Arc<dyn CardinalitySource>,
}
impl StrategyPlanner {
	pub fn new(cfg: folkso_config::Planner, cardinalities: Arc<dyn CardinalitySource>) -> Self {
		Self { cfg, cardinalities }
	}

	/// Per-tag totals across the requested sources, ascending. The sort is
	/// stable, so tags with equal totals keep the caller's order; the two-phase
	/// shapes rely on that to pick deterministic seeds.
	pub fn rank_by_cardinality(
		&self,
		tag_ids: &[Uuid],
		sources: &[ContentSource],
	) -> Vec<(Uuid, i64)> {
		let counts = self.cardinalities.get_cardinalities(tag_ids, sources);
		let mut ranked = tag_ids
			.iter()
			.map(|tag_id| {
				let total = sources
					.iter()
					.map(|source| {
						counts
							.get(&(*tag_id, *source))
							.copied()
							.unwrap_or(self.cfg.fallback_default_count)
					})
					.sum::<i64>();

				(*tag_id, total)
			})
			.collect::<Vec<_>>();

		ranked.sort_by_key(|(_, total)| *total);

		ranked
	}

	/// Picks the cheapest predicate shape for an all-match filter over
	/// `tag_ids` (already deduplicated by the caller). Total over every input:
	/// an empty tag set plans like any other call, and the grouped-count
	/// fallback guarantees an answer even with every strategy disabled.
	pub fn pick_strategy(&self, tag_ids: &[Uuid], sources: &[ContentSource]) -> StrategyChoice {
		let ranked = self.rank_by_cardinality(tag_ids, sources);
		let k = ranked.len();
		let rarest_count = ranked.first().map(|(_, total)| *total).unwrap_or(0);
		let choice = self.decide(k, rarest_count, &ranked);

		if self.cfg.telemetry.log_decisions {
			tracing::debug!(
				strategy = choice.strategy.as_str(),
				k = choice.k,
				rarest_count = choice.rarest_count,
				estimated_candidates = choice.estimated_candidates,
				reason = %choice.reason,
				"Planned tag filter strategy.",
			);
		}

		choice
	}

	fn decide(&self, k: usize, rarest_count: i64, ranked: &[(Uuid, i64)]) -> StrategyChoice {
		let cfg = &self.cfg;

		if cfg.enable_self_join && k <= cfg.small_k_threshold as usize {
			return StrategyChoice {
				strategy: Strategy::SelfJoin,
				k,
				rarest_count,
				estimated_candidates: rarest_count,
				reason: format!("k={k} <= small_k_threshold={}.", cfg.small_k_threshold),
			};
		}
		if cfg.enable_group_having && rarest_count <= cfg.group_having_rarest_ceiling {
			return StrategyChoice {
				strategy: Strategy::GroupHaving,
				k,
				rarest_count,
				estimated_candidates: rarest_count,
				reason: format!(
					"rarest_count={rarest_count} <= group_having_rarest_ceiling={}.",
					cfg.group_having_rarest_ceiling
				),
			};
		}
		if cfg.enable_two_phase {
			if k >= cfg.two_phase_min_k_for_dual_seed as usize
				&& rarest_count > cfg.two_phase_dual_seed_floor
			{
				let second = ranked.get(1).map(|(_, total)| *total).unwrap_or(rarest_count);
				// Intersecting the two rarest tags is assumed to halve the
				// smaller count. A deliberately crude estimate; the cap below
				// is the tunable that keeps it honest.
				let estimated = rarest_count.min(second) / 2;

				if estimated <= cfg.seed_candidate_cap {
					return StrategyChoice {
						strategy: Strategy::TwoPhaseDual,
						k,
						rarest_count,
						estimated_candidates: estimated,
						reason: format!(
							"dual seed eligible (k={k} >= {}, rarest_count={rarest_count} > {}); min(rarest, second_rarest) / 2 = {estimated} <= seed_candidate_cap={}.",
							cfg.two_phase_min_k_for_dual_seed,
							cfg.two_phase_dual_seed_floor,
							cfg.seed_candidate_cap
						),
					};
				}
			}
			if rarest_count <= cfg.seed_candidate_cap {
				return StrategyChoice {
					strategy: Strategy::TwoPhaseSingle,
					k,
					rarest_count,
					estimated_candidates: rarest_count,
					reason: format!(
						"rarest_count={rarest_count} <= seed_candidate_cap={}.",
						cfg.seed_candidate_cap
					),
				};
			}
		}

		if cfg.telemetry.warn_on_fallback {
			tracing::warn!(
				k,
				rarest_count,
				"No tag filter strategy was eligible; falling back to grouped counting.",
			);
		}

		StrategyChoice {
			strategy: Strategy::GroupHaving,
			k,
			rarest_count,
			estimated_candidates: rarest_count,
			reason: "No strategy was eligible; defaulting to grouped counting.".to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use uuid::Uuid;

	use folkso_domain::ContentSource;

	use super::{Strategy, StrategyPlanner};
	use crate::cardinality::FixedCardinalities;

	const SOURCES: [ContentSource; 1] = [ContentSource::Items];

	fn base_cfg() -> folkso_config::Planner {
		folkso_config::Planner::default()
	}

	fn planner_with(
		cfg: folkso_config::Planner,
		counts: &[(Uuid, i64)],
	) -> StrategyPlanner {
		let source = FixedCardinalities::from_pairs(
			counts.iter().map(|(tag_id, count)| ((*tag_id, ContentSource::Items), *count)),
		);

		StrategyPlanner::new(cfg, Arc::new(source))
	}

	fn tags(n: usize) -> Vec<Uuid> {
		(0..n).map(|_| Uuid::new_v4()).collect()
	}

	#[test]
	fn small_k_prefers_self_join() {
		let ids = tags(2);
		let counts = vec![(ids[0], 9_000), (ids[1], 12_000)];
		let planner = planner_with(base_cfg(), &counts);
		let choice = planner.pick_strategy(&ids, &SOURCES);

		assert_eq!(choice.strategy, Strategy::SelfJoin);
		assert_eq!(choice.k, 2);
		assert_eq!(choice.rarest_count, 9_000);
		assert_eq!(choice.estimated_candidates, 9_000);
	}

	#[test]
	fn rare_tag_prefers_group_having() {
		let ids = tags(5);
		let counts =
			vec![(ids[0], 40_000), (ids[1], 50), (ids[2], 70_000), (ids[3], 80_000), (ids[4], 90_000)];
		let planner = planner_with(base_cfg(), &counts);
		let choice = planner.pick_strategy(&ids, &SOURCES);

		assert_eq!(choice.strategy, Strategy::GroupHaving);
		assert_eq!(choice.rarest_count, 50);
	}

	#[test]
	fn never_panics_for_zero_or_one_tag() {
		let planner = planner_with(base_cfg(), &[]);
		let empty = planner.pick_strategy(&[], &SOURCES);

		assert_eq!(empty.k, 0);
		assert_eq!(empty.rarest_count, 0);

		let one = tags(1);
		let choice = planner.pick_strategy(&one, &SOURCES);

		assert_eq!(choice.k, 1);
		assert_eq!(choice.strategy, Strategy::SelfJoin);
	}

	#[test]
	fn repeated_picks_are_identical() {
		let ids = tags(4);
		let counts = vec![(ids[0], 10), (ids[1], 20), (ids[2], 30), (ids[3], 40)];
		let planner = planner_with(base_cfg(), &counts);
		let first = planner.pick_strategy(&ids, &SOURCES);
		let second = planner.pick_strategy(&ids, &SOURCES);

		assert_eq!(first, second);
	}

	#[test]
	fn dual_seed_estimate_halves_the_smaller_count() {
		let cfg = folkso_config::Planner {
			group_having_rarest_ceiling: 100,
			two_phase_min_k_for_dual_seed: 7,
			two_phase_dual_seed_floor: 100,
			..base_cfg()
		};
		let ids = tags(10);
		let mut counts = vec![(ids[0], 500), (ids[1], 600)];

		for id in &ids[2..] {
			counts.push((*id, 10_000));
		}

		let planner = planner_with(cfg, &counts);
		let choice = planner.pick_strategy(&ids, &SOURCES);

		assert_eq!(choice.strategy, Strategy::TwoPhaseDual);
		assert_eq!(choice.rarest_count, 500);
		assert_eq!(choice.estimated_candidates, 250);
	}

	#[test]
	fn overflowing_dual_estimate_falls_through_to_single_then_fallback() {
		let cfg = folkso_config::Planner {
			group_having_rarest_ceiling: 100,
			two_phase_min_k_for_dual_seed: 7,
			two_phase_dual_seed_floor: 100,
			seed_candidate_cap: 249,
			..base_cfg()
		};
		let ids = tags(10);
		let mut counts = vec![(ids[0], 500), (ids[1], 600)];

		for id in &ids[2..] {
			counts.push((*id, 10_000));
		}

		// Dual estimate 250 exceeds the cap, and so does the single-seed
		// estimate of 500, so the universal fallback applies.
		let planner = planner_with(cfg, &counts);
		let choice = planner.pick_strategy(&ids, &SOURCES);

		assert_eq!(choice.strategy, Strategy::GroupHaving);
		assert!(choice.reason.contains("No strategy was eligible"));
	}

	#[test]
	fn single_seed_applies_below_the_cap() {
		let cfg = folkso_config::Planner {
			enable_self_join: false,
			enable_group_having: false,
			..base_cfg()
		};
		let ids = tags(2);
		let counts = vec![(ids[0], 100), (ids[1], 200)];
		let planner = planner_with(cfg, &counts);
		let choice = planner.pick_strategy(&ids, &SOURCES);

		assert_eq!(choice.strategy, Strategy::TwoPhaseSingle);
		assert_eq!(choice.estimated_candidates, 100);
	}

	#[test]
	fn all_strategies_disabled_still_answers() {
		let cfg = folkso_config::Planner {
			enable_self_join: false,
			enable_group_having: false,
			enable_two_phase: false,
			..base_cfg()
		};
		let ids = tags(3);
		let planner = planner_with(cfg, &[(ids[0], 1), (ids[1], 2), (ids[2], 3)]);
		let choice = planner.pick_strategy(&ids, &SOURCES);

		assert_eq!(choice.strategy, Strategy::GroupHaving);
		assert!(choice.reason.contains("No strategy was eligible"));
	}

	#[test]
	fn missing_pairs_fall_back_to_the_default_count() {
		let cfg = folkso_config::Planner { fallback_default_count: 5, ..base_cfg() };
		let ids = tags(1);
		let planner = StrategyPlanner::new(cfg, Arc::new(FixedCardinalities::default()));
		let choice = planner.pick_strategy(&ids, &ContentSource::ALL);

		// One missing pair per source, each contributing the fallback count.
		assert_eq!(choice.rarest_count, 10);
	}

	#[test]
	fn ranking_is_ascending_and_stable_on_ties() {
		let ids = tags(3);
		let counts = vec![(ids[0], 5), (ids[1], 5), (ids[2], 1)];
		let planner = planner_with(base_cfg(), &counts);
		let ranked = planner.rank_by_cardinality(&ids, &SOURCES);

		assert_eq!(ranked, vec![(ids[2], 1), (ids[0], 5), (ids[1], 5)]);
	}

	#[test]
	fn choice_serializes_with_snake_case_strategy() {
		let ids = tags(2);
		let planner = planner_with(base_cfg(), &[(ids[0], 1), (ids[1], 2)]);
		let choice = planner.pick_strategy(&ids, &SOURCES);
		let json = serde_json::to_value(&choice).expect("serialize choice");

		assert_eq!(json["strategy"], "self_join");
		assert_eq!(json["k"], 2);
	}
}
