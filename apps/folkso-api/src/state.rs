use std::sync::Arc;

use folkso_service::ContentService;
use folkso_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ContentService>,
}
impl AppState {
	pub async fn new(config: folkso_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = ContentService::new(config, db);
		let entries = service.stats.reload(&service.db).await?;

		if service.stats.is_empty() {
			tracing::warn!(
				"Tag statistics are empty; planning falls back to default counts until the first refresh."
			);
		}

		tracing::info!(entries, "Loaded the tag statistics cache.");

		Ok(Self { service: Arc::new(service) })
	}
}
