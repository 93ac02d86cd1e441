use std::str::FromStr;

use folkso_domain::ContentSource;
use uuid::Uuid;

use crate::{Error, Result, db::Db, models::TagStat};

/// Replaces the whole cardinality snapshot in one transaction so readers see
/// either the previous snapshot or the new one, never a mix. Returns the
/// number of (tag, source) pairs written.
pub async fn recompute_tag_stats(db: &Db) -> Result<u64> {
	let mut tx = db.pool.begin().await?;

	sqlx::query("DELETE FROM tag_stats").execute(&mut *tx).await?;

	let inserted = sqlx::query(
		"\
INSERT INTO tag_stats (tag_id, content_source, distinct_content, computed_at)
SELECT tag_id, content_source, COUNT(DISTINCT content_id), now()
FROM content_tags
GROUP BY tag_id, content_source",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(inserted.rows_affected())
}

pub async fn load_all_stats(db: &Db) -> Result<Vec<TagStat>> {
	let stats = sqlx::query_as::<_, TagStat>(
		"SELECT tag_id, content_source, distinct_content, computed_at FROM tag_stats",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(stats)
}

pub async fn load_stats_for_tag(db: &Db, tag_id: Uuid) -> Result<Vec<TagStat>> {
	let stats = sqlx::query_as::<_, TagStat>(
		"\
SELECT tag_id, content_source, distinct_content, computed_at
FROM tag_stats
WHERE tag_id = $1",
	)
	.bind(tag_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(stats)
}

/// Typed view of the snapshot for cache reloads. A row whose `content_source`
/// no longer parses points at a corrupt snapshot and is surfaced as an error
/// rather than silently dropped.
pub async fn load_snapshot(db: &Db) -> Result<Vec<((Uuid, ContentSource), i64)>> {
	let stats = load_all_stats(db).await?;
	let mut pairs = Vec::with_capacity(stats.len());

	for stat in stats {
		let source = ContentSource::from_str(&stat.content_source).map_err(|_| {
			Error::InvalidStoredValue(format!(
				"tag_stats.content_source {:?} is not a known source",
				stat.content_source
			))
		})?;

		pairs.push(((stat.tag_id, source), stat.distinct_content));
	}

	Ok(pairs)
}
