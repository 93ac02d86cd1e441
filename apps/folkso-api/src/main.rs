use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = folkso_api::Args::parse();
	folkso_api::run(args).await
}
