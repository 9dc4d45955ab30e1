use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bibavail::init::init_tracing();
    let cli = bibavail::Cli::parse();
    bibavail::run(cli).await
}
