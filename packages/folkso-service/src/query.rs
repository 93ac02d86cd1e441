use std::str::FromStr;

use uuid::Uuid;

use folkso_domain::{ContentSource, TagMatch};
use folkso_planner::{StrategyChoice, apply_tag_filter};
use folkso_storage::models::ContentItem;

use crate::{ContentService, ServiceError, ServiceResult};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ContentQueryRequest {
	/// Partitions to search; omitted or empty means all of them.
	#[serde(default)]
	pub sources: Option<Vec<String>>,
	#[serde(default)]
	pub tag_ids: Vec<Uuid>,
	/// "any" or "all"; anything else is read as "any".
	#[serde(default)]
	pub tag_match: Option<String>,
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub limit: Option<u32>,
	#[serde(default)]
	pub offset: Option<u32>,
	/// When set, the response carries the planner's decision.
	#[serde(default)]
	pub explain: Option<bool>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ContentView {
	pub content_id: Uuid,
	pub source: String,
	pub title: String,
	pub body: String,
	pub status: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: time::OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: time::OffsetDateTime,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ContentQueryResponse {
	pub items: Vec<ContentView>,
	pub limit: u32,
	pub offset: u32,
	/// Present only when explain was requested and the planner ran (all-match
	/// with at least one tag).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub plan: Option<StrategyChoice>,
}

impl ContentService {
	pub async fn query_content(
		&self,
		req: ContentQueryRequest,
	) -> ServiceResult<ContentQueryResponse> {
		let sources = resolve_sources(req.sources.as_deref())?;

		if req.tag_ids.len() > self.cfg.query.max_tags_per_filter {
			return Err(ServiceError::InvalidRequest {
				message: format!(
					"A filter may carry at most {} tags.",
					self.cfg.query.max_tags_per_filter
				),
			});
		}

		let status = req.status.as_deref().unwrap_or("active").trim().to_string();

		if status.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "status must not be empty when provided.".to_string(),
			});
		}

		let tag_match = req.tag_match.as_deref().map(TagMatch::normalize).unwrap_or_default();
		let limit =
			req.limit.unwrap_or(self.cfg.query.default_limit).clamp(1, self.cfg.query.max_limit);
		let offset = req.offset.unwrap_or(0);
		let predicate = apply_tag_filter(&self.planner, &req.tag_ids, &sources, tag_match);
		let source_names =
			sources.iter().map(|source| source.as_str().to_string()).collect::<Vec<_>>();
		let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new(
			"SELECT item.content_id, item.source, item.title, item.body, item.status, item.created_at, item.updated_at \
             FROM content_items item WHERE item.source = ANY(",
		);

		qb.push_bind(source_names);
		qb.push(") AND item.status = ");
		qb.push_bind(status);
		predicate.attach(&mut qb, "item");
		qb.push(" ORDER BY item.created_at DESC, item.content_id, item.source LIMIT ");
		qb.push_bind(i64::from(limit));
		qb.push(" OFFSET ");
		qb.push_bind(i64::from(offset));

		let rows: Vec<ContentItem> = qb.build_query_as().fetch_all(&self.db.pool).await?;
		let items = rows
			.into_iter()
			.map(|row| ContentView {
				content_id: row.content_id,
				source: row.source,
				title: row.title,
				body: row.body,
				status: row.status,
				created_at: row.created_at,
				updated_at: row.updated_at,
			})
			.collect();
		let plan =
			if req.explain.unwrap_or(false) { predicate.choice().cloned() } else { None };

		Ok(ContentQueryResponse { items, limit, offset, plan })
	}
}

fn resolve_sources(raw: Option<&[String]>) -> ServiceResult<Vec<ContentSource>> {
	let Some(raw) = raw else {
		return Ok(ContentSource::ALL.to_vec());
	};

	if raw.is_empty() {
		return Ok(ContentSource::ALL.to_vec());
	}

	let mut sources = Vec::with_capacity(raw.len());

	for value in raw {
		let source = ContentSource::from_str(value)
			.map_err(|err| ServiceError::InvalidRequest { message: err.to_string() })?;

		if !sources.contains(&source) {
			sources.push(source);
		}
	}

	Ok(sources)
}
