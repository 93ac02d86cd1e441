pub mod routes;
pub mod state;

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::Parser;
use color_eyre::eyre;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
	version = folkso_cli::VERSION,
	rename_all = "kebab",
	styles = folkso_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = folkso_config::load(&args.config)?;
	init_tracing(&config)?;
	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let admin_addr: SocketAddr = config.service.admin_bind.parse()?;
	if !admin_addr.ip().is_loopback() {
		return Err(eyre::eyre!("admin_bind must be a loopback address."));
	}
	let reload_every = Duration::from_secs(config.stats.cache_reload_secs);
	let state = AppState::new(config).await?;
	spawn_cache_reload(state.clone(), reload_every);
	let app = routes::router(state.clone());
	let admin_app = routes::admin_router(state);

	let http_listener = TcpListener::bind(http_addr).await?;
	tracing::info!(%http_addr, "HTTP server listening.");
	let http_server = axum::serve(http_listener, app);

	let admin_listener = TcpListener::bind(admin_addr).await?;
	tracing::info!(%admin_addr, "Admin server listening.");
	let admin_server = axum::serve(admin_listener, admin_app);

	tokio::try_join!(http_server, admin_server)?;
	Ok(())
}

/// Keeps the planner's cardinality cache in step with `tag_stats` while the
/// worker recomputes it out of band. Reload failures are logged and retried
/// on the next tick; the cache keeps serving its previous snapshot.
fn spawn_cache_reload(state: AppState, every: Duration) {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(every);

		// The state constructor loads the cache once; skip the immediate tick.
		ticker.tick().await;

		loop {
			ticker.tick().await;

			match state.service.stats.reload(&state.service.db).await {
				Ok(entries) => tracing::debug!(entries, "Reloaded the tag statistics cache."),
				Err(err) => {
					tracing::error!(error = %err, "Failed to reload the tag statistics cache.");
				},
			}
		}
	});
}

fn init_tracing(config: &folkso_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
	Ok(())
}
