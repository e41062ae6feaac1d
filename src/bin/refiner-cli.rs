#[path = "refiner-cli/app/mod.rs"]
mod app;
#[path = "refiner-cli/args.rs"]
mod args;
#[path = "refiner-cli/clipboard.rs"]
mod clipboard;
#[path = "refiner-cli/config/mod.rs"]
mod config;
#[path = "refiner-cli/logging.rs"]
mod logging;
#[path = "refiner-cli/page_file.rs"]
mod page_file;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
