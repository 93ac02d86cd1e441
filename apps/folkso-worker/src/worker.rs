use std::time::{Duration, Instant};

use color_eyre::Result;
use tokio::time as tokio_time;

use folkso_storage::{db::Db, tag_stats};

pub struct WorkerState {
	pub db: Db,
	pub refresh_interval: Duration,
}

/// Recomputes `tag_stats` on a fixed cadence. Failures are logged and the
/// cadence holds; the next pass rebuilds from the live `content_tags` rows,
/// so a missed pass self-heals.
pub async fn run_worker(state: WorkerState) -> Result<()> {
	loop {
		if let Err(err) = refresh_once(&state.db).await {
			tracing::error!(error = %err, "Tag statistics refresh failed.");
		}

		tokio_time::sleep(state.refresh_interval).await;
	}
}

async fn refresh_once(db: &Db) -> Result<()> {
	let started = Instant::now();
	let pairs = tag_stats::recompute_tag_stats(db).await?;
	let elapsed_ms = started.elapsed().as_millis() as u64;

	tracing::info!(pairs, elapsed_ms, "Recomputed tag statistics.");

	Ok(())
}
