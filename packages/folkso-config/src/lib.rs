mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Planner, PlannerTelemetry, Postgres, Query, Service, Stats, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.admin_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.admin_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("planner.group_having_rarest_ceiling", cfg.planner.group_having_rarest_ceiling),
		("planner.two_phase_dual_seed_floor", cfg.planner.two_phase_dual_seed_floor),
		("planner.seed_candidate_cap", cfg.planner.seed_candidate_cap),
		("planner.fallback_default_count", cfg.planner.fallback_default_count),
	] {
		if value < 0 {
			return Err(Error::Validation {
				message: format!("{label} must be zero or greater."),
			});
		}
	}

	if cfg.stats.refresh_interval_secs == 0 {
		return Err(Error::Validation {
			message: "stats.refresh_interval_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.stats.cache_reload_secs == 0 {
		return Err(Error::Validation {
			message: "stats.cache_reload_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.query.default_limit == 0 {
		return Err(Error::Validation {
			message: "query.default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.query.max_limit == 0 {
		return Err(Error::Validation {
			message: "query.max_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.query.default_limit > cfg.query.max_limit {
		return Err(Error::Validation {
			message: "query.default_limit must not exceed query.max_limit.".to_string(),
		});
	}
	if cfg.query.max_tags_per_filter == 0 {
		return Err(Error::Validation {
			message: "query.max_tags_per_filter must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let trimmed = cfg.service.http_bind.trim();

	if trimmed.len() != cfg.service.http_bind.len() {
		cfg.service.http_bind = trimmed.to_string();
	}

	let trimmed = cfg.service.admin_bind.trim();

	if trimmed.len() != cfg.service.admin_bind.len() {
		cfg.service.admin_bind = trimmed.to_string();
	}

	let trimmed = cfg.storage.postgres.dsn.trim();

	if trimmed.len() != cfg.storage.postgres.dsn.len() {
		cfg.storage.postgres.dsn = trimmed.to_string();
	}
}
