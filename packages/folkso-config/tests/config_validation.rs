use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use folkso_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml() -> String {
	SAMPLE_CONFIG_TEMPLATE_TOML.to_string()
}

fn sample_toml_with_planner(key: &str, value: Value) -> String {
	let mut parsed: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let root = parsed.as_table_mut().expect("Template config must be a table.");
	let planner = root
		.get_mut("planner")
		.and_then(Value::as_table_mut)
		.expect("Template config must include [planner].");

	planner.insert(key.to_string(), value);

	toml::to_string(&parsed).expect("Failed to render template config.")
}

fn sample_toml_with_query(key: &str, value: i64) -> String {
	let mut parsed: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let root = parsed.as_table_mut().expect("Template config must be a table.");
	let query = root
		.get_mut("query")
		.and_then(Value::as_table_mut)
		.expect("Template config must include [query].");

	query.insert(key.to_string(), Value::Integer(value));

	toml::to_string(&parsed).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("folkso_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> folkso_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = folkso_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse test config.")
}

#[test]
fn template_config_is_valid() {
	load_payload(sample_toml()).expect("Expected template config to load.");
}

#[test]
fn planner_thresholds_must_be_non_negative() {
	let payload = sample_toml_with_planner("seed_candidate_cap", Value::Integer(-1));
	let err = load_payload(payload).expect_err("Expected seed_candidate_cap validation error.");

	assert!(
		err.to_string().contains("planner.seed_candidate_cap must be zero or greater."),
		"Unexpected error: {err}"
	);
}

#[test]
fn planner_fallback_default_count_must_be_non_negative() {
	let payload = sample_toml_with_planner("fallback_default_count", Value::Integer(-5));
	let err = load_payload(payload).expect_err("Expected fallback_default_count validation error.");

	assert!(
		err.to_string().contains("planner.fallback_default_count must be zero or greater."),
		"Unexpected error: {err}"
	);
}

#[test]
fn planner_ceiling_above_cap_is_accepted() {
	// The ceiling/cap ordering is advisory, never enforced. A ceiling above the
	// cap only shifts which branch fires.
	let payload = sample_toml_with_planner("group_having_rarest_ceiling", Value::Integer(100_000));

	load_payload(payload).expect("Expected ceiling above cap to load.");
}

#[test]
fn planner_section_defaults_apply_when_omitted() {
	let mut parsed: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let root = parsed.as_table_mut().expect("Template config must be a table.");

	root.remove("planner");
	root.remove("stats");
	root.remove("query");

	let payload = toml::to_string(&parsed).expect("Failed to render template config.");
	let cfg: Config = toml::from_str(&payload).expect("Failed to parse config without [planner].");

	assert_eq!(cfg.planner.small_k_threshold, 3);
	assert_eq!(cfg.planner.group_having_rarest_ceiling, 1_000);
	assert_eq!(cfg.planner.two_phase_min_k_for_dual_seed, 6);
	assert_eq!(cfg.planner.two_phase_dual_seed_floor, 5_000);
	assert_eq!(cfg.planner.seed_candidate_cap, 50_000);
	assert_eq!(cfg.planner.fallback_default_count, 0);
	assert!(cfg.planner.enable_self_join);
	assert!(cfg.planner.enable_group_having);
	assert!(cfg.planner.enable_two_phase);
	assert!(cfg.planner.telemetry.log_decisions);
	assert!(cfg.planner.telemetry.warn_on_fallback);
	assert_eq!(cfg.stats.refresh_interval_secs, 300);
	assert_eq!(cfg.stats.cache_reload_secs, 60);
	assert_eq!(cfg.query.default_limit, 50);
	assert_eq!(cfg.query.max_limit, 500);
	assert_eq!(cfg.query.max_tags_per_filter, 64);
}

#[test]
fn pool_max_conns_must_be_positive() {
	let mut cfg = base_config();

	cfg.storage.postgres.pool_max_conns = 0;

	let err =
		folkso_config::validate(&cfg).expect_err("Expected pool_max_conns validation error.");

	assert!(
		err.to_string()
			.contains("storage.postgres.pool_max_conns must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn default_limit_cannot_exceed_max_limit() {
	let payload = sample_toml_with_query("default_limit", 1_000);
	let err = load_payload(payload).expect_err("Expected default_limit validation error.");

	assert!(
		err.to_string().contains("query.default_limit must not exceed query.max_limit."),
		"Unexpected error: {err}"
	);
}

#[test]
fn max_tags_per_filter_must_be_positive() {
	let payload = sample_toml_with_query("max_tags_per_filter", 0);
	let err = load_payload(payload).expect_err("Expected max_tags_per_filter validation error.");

	assert!(
		err.to_string().contains("query.max_tags_per_filter must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn stats_intervals_must_be_positive() {
	let mut cfg = base_config();

	cfg.stats.refresh_interval_secs = 0;

	let err = folkso_config::validate(&cfg)
		.expect_err("Expected refresh_interval_secs validation error.");

	assert!(
		err.to_string().contains("stats.refresh_interval_secs must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn binds_are_trimmed_on_load() {
	let payload = sample_toml().replace(
		"http_bind  = \"127.0.0.1:8080\"",
		"http_bind  = \"  127.0.0.1:8080  \"",
	);
	let cfg = load_payload(payload).expect("Expected padded bind to load.");

	assert_eq!(cfg.service.http_bind, "127.0.0.1:8080");
}

#[test]
fn missing_service_section_is_a_parse_error() {
	let mut parsed: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let root = parsed.as_table_mut().expect("Template config must be a table.");

	root.remove("service");

	let payload = toml::to_string(&parsed).expect("Failed to render template config.");
	let err = load_payload(payload).expect_err("Expected missing [service] parse error.");
	let message = match err {
		Error::ParseConfig { source, .. } => source.to_string(),
		err => panic!("Expected parse config error, got {err}"),
	};

	assert!(message.contains("missing field `service`"), "Unexpected error: {message}");
}

#[test]
fn folkso_example_toml_is_valid() {
	let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

	path.push("../../folkso.example.toml");

	folkso_config::load(&path).expect("Expected folkso.example.toml to be a valid config.");
}
