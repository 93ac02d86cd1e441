use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = folkso_seed::Args::parse();
	folkso_seed::run(args).await
}
