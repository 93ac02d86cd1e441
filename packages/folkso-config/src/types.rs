use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub planner: Planner,
	#[serde(default)]
	pub stats: Stats,
	#[serde(default)]
	pub query: Query,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Thresholds steering the tag-filter strategy decision. Counts compare
/// against cardinality totals summed across the requested sources.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Planner {
	pub small_k_threshold: u32,
	pub group_having_rarest_ceiling: i64,
	pub two_phase_min_k_for_dual_seed: u32,
	pub two_phase_dual_seed_floor: i64,
	pub seed_candidate_cap: i64,
	pub fallback_default_count: i64,
	pub enable_self_join: bool,
	pub enable_group_having: bool,
	pub enable_two_phase: bool,
	pub telemetry: PlannerTelemetry,
}
impl Default for Planner {
	fn default() -> Self {
		Self {
			small_k_threshold: 3,
			group_having_rarest_ceiling: 1_000,
			two_phase_min_k_for_dual_seed: 6,
			two_phase_dual_seed_floor: 5_000,
			seed_candidate_cap: 50_000,
			fallback_default_count: 0,
			enable_self_join: true,
			enable_group_having: true,
			enable_two_phase: true,
			telemetry: PlannerTelemetry::default(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlannerTelemetry {
	pub log_decisions: bool,
	pub warn_on_fallback: bool,
}
impl Default for PlannerTelemetry {
	fn default() -> Self {
		Self { log_decisions: true, warn_on_fallback: true }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Stats {
	pub refresh_interval_secs: u64,
	pub cache_reload_secs: u64,
}
impl Default for Stats {
	fn default() -> Self {
		Self { refresh_interval_secs: 300, cache_reload_secs: 60 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Query {
	pub default_limit: u32,
	pub max_limit: u32,
	pub max_tags_per_filter: usize,
}
impl Default for Query {
	fn default() -> Self {
		Self { default_limit: 50, max_limit: 500, max_tags_per_filter: 64 }
	}
}
