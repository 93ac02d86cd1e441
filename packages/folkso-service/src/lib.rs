pub mod query;
pub mod stats;
pub mod tags;
pub mod time_serde;

use std::sync::Arc;

use folkso_config::Config;
use folkso_planner::StrategyPlanner;
use folkso_storage::db::Db;

pub use query::{ContentQueryRequest, ContentQueryResponse, ContentView};
pub use stats::{StatsRefreshReport, TagStatsCache};
pub use tags::{TagListResponse, TagView};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	UnknownTag { slug: String },
	Storage { message: String },
}

pub struct ContentService {
	pub cfg: Config,
	pub db: Db,
	pub stats: Arc<TagStatsCache>,
	pub planner: StrategyPlanner,
}

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::UnknownTag { slug } => write!(f, "Unknown tag: {slug}"),
			Self::Storage { message } => write!(f, "Storage error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<sqlx::Error> for ServiceError {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<folkso_storage::Error> for ServiceError {
	fn from(err: folkso_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl ContentService {
	/// Wires the planner to the shared stats cache. The cache starts empty;
	/// call [`TagStatsCache::reload`] once connected so the first requests
	/// plan against real counts instead of fallbacks.
	pub fn new(cfg: Config, db: Db) -> Self {
		let stats = Arc::new(TagStatsCache::default());
		let planner = StrategyPlanner::new(cfg.planner.clone(), stats.clone());

		Self { cfg, db, stats, planner }
	}
}
