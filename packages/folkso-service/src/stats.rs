use std::sync::{Arc, RwLock};

use ahash::AHashMap;
use time::OffsetDateTime;
use uuid::Uuid;

use folkso_domain::ContentSource;
use folkso_planner::{CardinalityKey, CardinalitySource};
use folkso_storage::{db::Db, tag_stats};

use crate::{ContentService, ServiceResult};

/// Shared snapshot of tag cardinalities backing the planner.
///
/// Readers clone the inner [`Arc`] and never hold the lock across a lookup;
/// reloads build the next map on the side and swap it in whole. A request
/// therefore plans against either the previous snapshot or the new one,
/// never a mix of the two.
#[derive(Default)]
pub struct TagStatsCache {
	snapshot: RwLock<Arc<AHashMap<CardinalityKey, i64>>>,
}
impl TagStatsCache {
	/// Replaces the snapshot with the current `tag_stats` contents and returns
	/// the number of cached (tag, source) pairs.
	pub async fn reload(&self, db: &Db) -> ServiceResult<usize> {
		let pairs = tag_stats::load_snapshot(db).await?;
		let next: AHashMap<CardinalityKey, i64> = pairs.into_iter().collect();
		let len = next.len();

		*self.snapshot.write().unwrap_or_else(|err| err.into_inner()) = Arc::new(next);

		Ok(len)
	}

	pub fn len(&self) -> usize {
		self.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.load().is_empty()
	}

	fn load(&self) -> Arc<AHashMap<CardinalityKey, i64>> {
		self.snapshot.read().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl CardinalitySource for TagStatsCache {
	fn get_cardinalities(
		&self,
		tag_ids: &[Uuid],
		sources: &[ContentSource],
	) -> AHashMap<CardinalityKey, i64> {
		let snapshot = self.load();
		let mut out = AHashMap::with_capacity(tag_ids.len() * sources.len());

		for tag_id in tag_ids {
			for source in sources {
				if let Some(count) = snapshot.get(&(*tag_id, *source)) {
					out.insert((*tag_id, *source), *count);
				}
			}
		}

		out
	}
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StatsRefreshReport {
	pub pairs: u64,
	pub cached_entries: usize,
	#[serde(with = "crate::time_serde")]
	pub refreshed_at: OffsetDateTime,
}

impl ContentService {
	/// Recomputes `tag_stats` from the junction rows and reloads the cache.
	pub async fn refresh_stats(&self) -> ServiceResult<StatsRefreshReport> {
		let pairs = tag_stats::recompute_tag_stats(&self.db).await?;
		let cached_entries = self.stats.reload(&self.db).await?;

		tracing::info!(pairs, cached_entries, "Refreshed tag statistics.");

		Ok(StatsRefreshReport { pairs, cached_entries, refreshed_at: OffsetDateTime::now_utc() })
	}
}

#[cfg(test)]
mod tests {
	use uuid::Uuid;

	use folkso_domain::ContentSource;
	use folkso_planner::CardinalitySource;

	use super::TagStatsCache;

	#[test]
	fn empty_cache_reports_no_entries() {
		let cache = TagStatsCache::default();

		assert!(cache.is_empty());
		assert_eq!(cache.len(), 0);
		assert!(cache.get_cardinalities(&[Uuid::new_v4()], &ContentSource::ALL).is_empty());
	}
}
