pub mod worker;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
	version = folkso_cli::VERSION,
	rename_all = "kebab",
	styles = folkso_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = folkso_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = folkso_storage::db::Db::connect(&config.storage.postgres).await?;
	db.ensure_schema().await?;

	let state = worker::WorkerState {
		db,
		refresh_interval: std::time::Duration::from_secs(config.stats.refresh_interval_secs),
	};

	worker::run_worker(state).await
}
