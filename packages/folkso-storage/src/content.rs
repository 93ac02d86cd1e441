use folkso_domain::ContentSource;
use sqlx::{Executor, Postgres, Transaction};
use uuid::Uuid;

use crate::{Result, db::Db, models::ContentItem};

pub async fn upsert_content(db: &Db, item: &ContentItem) -> Result<()> {
	upsert_content_exec(&db.pool, item).await?;

	Ok(())
}

pub async fn upsert_content_tx(
	tx: &mut Transaction<'_, Postgres>,
	item: &ContentItem,
) -> Result<()> {
	upsert_content_exec(&mut **tx, item).await?;

	Ok(())
}

pub async fn attach_tag(
	db: &Db,
	content_id: Uuid,
	source: ContentSource,
	tag_id: Uuid,
) -> Result<()> {
	attach_tag_exec(&db.pool, content_id, source, tag_id).await?;

	Ok(())
}

pub async fn attach_tag_tx(
	tx: &mut Transaction<'_, Postgres>,
	content_id: Uuid,
	source: ContentSource,
	tag_id: Uuid,
) -> Result<()> {
	attach_tag_exec(&mut **tx, content_id, source, tag_id).await?;

	Ok(())
}

pub async fn count_by_source(db: &Db, source: ContentSource) -> Result<i64> {
	let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM content_items WHERE source = $1")
		.bind(source.as_str())
		.fetch_one(&db.pool)
		.await?;

	Ok(count)
}

async fn upsert_content_exec<'e, E>(executor: E, item: &ContentItem) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"\
INSERT INTO content_items (
	content_id,
	source,
	title,
	body,
	status,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7)
ON CONFLICT (content_id, source) DO UPDATE
SET
	title = EXCLUDED.title,
	body = EXCLUDED.body,
	status = EXCLUDED.status,
	updated_at = EXCLUDED.updated_at",
	)
	.bind(item.content_id)
	.bind(item.source.as_str())
	.bind(item.title.as_str())
	.bind(item.body.as_str())
	.bind(item.status.as_str())
	.bind(item.created_at)
	.bind(item.updated_at)
	.execute(executor)
	.await?;

	Ok(())
}

async fn attach_tag_exec<'e, E>(
	executor: E,
	content_id: Uuid,
	source: ContentSource,
	tag_id: Uuid,
) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"\
INSERT INTO content_tags (content_id, content_source, tag_id)
VALUES ($1, $2, $3)
ON CONFLICT (content_id, content_source, tag_id) DO NOTHING",
	)
	.bind(content_id)
	.bind(source.as_str())
	.bind(tag_id)
	.execute(executor)
	.await?;

	Ok(())
}
