use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = folkso_worker::Args::parse();
	folkso_worker::run(args).await
}
