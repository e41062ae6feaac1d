mod commands;
mod render;

use std::sync::Arc;

use clap::Parser;

use prompt_refiner::bridge::PageBridge;
use prompt_refiner::client::RefinerClient;
use prompt_refiner::session::Orchestrator;
use prompt_refiner::store::{FileHandoffSlot, JsonSettingsStore};

use crate::args::CliArgs;
use crate::clipboard::SystemClipboard;
use crate::config::{load_config, save_config, LoadedConfig};
use crate::logging::init_logging;

pub async fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let loaded = load_config(args.config.clone())?;
    let _logger = init_logging(&loaded.config.logging, &loaded.paths)?;

    if !loaded.config_exists {
        save_config(&loaded.config, &loaded.paths)?;
        log::info!(
            "wrote default config to {}",
            loaded.paths.config_file.display()
        );
    }

    let context = AppContext::new(&args, &loaded);
    commands::handle_command(args.command, &context).await
}

/// Long-lived collaborators shared by every command.
pub struct AppContext {
    service: Arc<RefinerClient>,
    store: Arc<JsonSettingsStore>,
    handoff: FileHandoffSlot,
    history_limit: usize,
}

impl AppContext {
    fn new(args: &CliArgs, loaded: &LoadedConfig) -> Self {
        let service = &loaded.config.service;
        let base_url = args
            .base_url
            .clone()
            .unwrap_or_else(|| service.base_url.clone());
        log::debug!(
            "service {base_url}, settings in {}",
            loaded.paths.data_dir.display()
        );
        Self {
            service: Arc::new(RefinerClient::new(base_url, service.timeout_seconds)),
            store: Arc::new(JsonSettingsStore::in_dir(&loaded.paths.data_dir)),
            handoff: FileHandoffSlot::in_dir(&loaded.paths.data_dir),
            history_limit: loaded.config.history.limit,
        }
    }

    fn orchestrator(&self, page: Arc<dyn PageBridge>) -> Orchestrator {
        Orchestrator::new(self.service.clone(), self.store.clone())
            .with_page(page)
            .with_clipboard(Arc::new(SystemClipboard))
            .with_history_limit(self.history_limit)
    }
}
