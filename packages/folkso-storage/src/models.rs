use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct ContentItem {
	pub content_id: Uuid,
	pub source: String,
	pub title: String,
	pub body: String,
	pub status: String,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct Tag {
	pub tag_id: Uuid,
	pub slug: String,
	pub display_name: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct TagStat {
	pub tag_id: Uuid,
	pub content_source: String,
	pub distinct_content: i64,
	pub computed_at: OffsetDateTime,
}
