use sqlx::{Executor, Postgres, Transaction};

use crate::{Result, db::Db, models::Tag};

pub async fn upsert_tag(db: &Db, tag: &Tag) -> Result<()> {
	upsert_tag_exec(&db.pool, tag).await?;

	Ok(())
}

pub async fn upsert_tag_tx(tx: &mut Transaction<'_, Postgres>, tag: &Tag) -> Result<()> {
	upsert_tag_exec(&mut **tx, tag).await?;

	Ok(())
}

pub async fn list_tags(db: &Db) -> Result<Vec<Tag>> {
	let tags = sqlx::query_as::<_, Tag>(
		"SELECT tag_id, slug, display_name, created_at FROM tags ORDER BY slug",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(tags)
}

pub async fn find_tag_by_slug(db: &Db, slug: &str) -> Result<Option<Tag>> {
	let tag = sqlx::query_as::<_, Tag>(
		"SELECT tag_id, slug, display_name, created_at FROM tags WHERE slug = $1",
	)
	.bind(slug)
	.fetch_optional(&db.pool)
	.await?;

	Ok(tag)
}

async fn upsert_tag_exec<'e, E>(executor: E, tag: &Tag) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"\
INSERT INTO tags (tag_id, slug, display_name, created_at)
VALUES ($1, $2, $3, $4)
ON CONFLICT (tag_id) DO UPDATE
SET
	slug = EXCLUDED.slug,
	display_name = EXCLUDED.display_name",
	)
	.bind(tag.tag_id)
	.bind(tag.slug.as_str())
	.bind(tag.display_name.as_str())
	.bind(tag.created_at)
	.execute(executor)
	.await?;

	Ok(())
}
