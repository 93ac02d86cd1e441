use std::collections::HashMap;

use time::OffsetDateTime;
use uuid::Uuid;

use folkso_domain::{ContentSource, normalize_slug};
use folkso_storage::{models::TagStat, tag_stats, tags};

use crate::{ContentService, ServiceError, ServiceResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TagView {
	pub tag_id: Uuid,
	pub slug: String,
	pub display_name: String,
	/// Snapshot counts; zero means no stats row, not necessarily no content.
	pub items_count: i64,
	pub auto_count: i64,
	#[serde(with = "crate::time_serde::option")]
	pub stats_computed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TagListResponse {
	pub tags: Vec<TagView>,
}

impl ContentService {
	pub async fn list_tags(&self) -> ServiceResult<TagListResponse> {
		let tags = tags::list_tags(&self.db).await?;
		let stats = tag_stats::load_all_stats(&self.db).await?;
		let mut by_tag: HashMap<Uuid, Vec<TagStat>> = HashMap::new();

		for stat in stats {
			by_tag.entry(stat.tag_id).or_default().push(stat);
		}

		let views = tags
			.into_iter()
			.map(|tag| {
				let (items_count, auto_count, stats_computed_at) =
					fold_counts(by_tag.get(&tag.tag_id).map(Vec::as_slice).unwrap_or(&[]));

				TagView {
					tag_id: tag.tag_id,
					slug: tag.slug,
					display_name: tag.display_name,
					items_count,
					auto_count,
					stats_computed_at,
				}
			})
			.collect();

		Ok(TagListResponse { tags: views })
	}

	pub async fn get_tag(&self, slug: &str) -> ServiceResult<TagView> {
		// Sloppy input collapses to the canonical slug form before lookup,
		// so "My Tag!" and "my-tag" resolve to the same row.
		let Some(slug) = normalize_slug(slug) else {
			return Err(ServiceError::UnknownTag { slug: slug.trim().to_string() });
		};
		let Some(tag) = tags::find_tag_by_slug(&self.db, &slug).await? else {
			return Err(ServiceError::UnknownTag { slug });
		};
		let stats = tag_stats::load_stats_for_tag(&self.db, tag.tag_id).await?;
		let (items_count, auto_count, stats_computed_at) = fold_counts(&stats);

		Ok(TagView {
			tag_id: tag.tag_id,
			slug: tag.slug,
			display_name: tag.display_name,
			items_count,
			auto_count,
			stats_computed_at,
		})
	}
}

fn fold_counts(stats: &[TagStat]) -> (i64, i64, Option<OffsetDateTime>) {
	let mut items_count = 0;
	let mut auto_count = 0;
	let mut computed_at: Option<OffsetDateTime> = None;

	for stat in stats {
		match stat.content_source.parse::<ContentSource>() {
			Ok(ContentSource::Items) => items_count = stat.distinct_content,
			Ok(ContentSource::Auto) => auto_count = stat.distinct_content,
			Err(_) => continue,
		}

		computed_at = Some(computed_at.map_or(stat.computed_at, |at| at.max(stat.computed_at)));
	}

	(items_count, auto_count, computed_at)
}
