#![forbid(unsafe_code)]

mod app;
mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse_args();
    app::run(cli).await
}
