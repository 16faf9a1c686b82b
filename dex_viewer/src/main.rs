use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use dex_core::{
    load_viewer_config, load_viewer_config_from_env, render_once_http, HttpCatalog,
    NavigationState, Viewer, ViewerConfig,
};
use tokio::runtime::Handle;
use tracing::info;

mod app;
mod ui;

use app::ViewerApp;
use ui::UiState;

#[derive(Clone)]
struct ChannelWriter {
    sender: Sender<String>,
}

impl std::io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = String::from_utf8(buf.to_vec()) {
            let _ = self.sender.send(text);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Creature catalog viewer", long_about = None)]
struct Cli {
    /// Catalog base URL; records are fetched from `{url}/{id}`.
    #[arg(long)]
    catalog_url: Option<String>,
    /// Base URL of the animated sprite assets.
    #[arg(long)]
    sprite_url: Option<String>,
    /// Number of entries reachable by navigation.
    #[arg(long)]
    total: Option<u32>,
    /// JSON config file. Takes precedence over DEX_VIEWER_CONFIG_PATH.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Entry shown on startup.
    #[arg(long, default_value_t = 1)]
    start: u32,
    /// Seed for random jumps.
    #[arg(long)]
    seed: Option<u64>,
    /// Render the start entry once, print it as JSON and exit.
    #[arg(long)]
    headless: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<Arc<ViewerConfig>> {
        let (loaded, metadata) = match self.config.clone() {
            Some(path) => load_viewer_config(Some(path)),
            None => load_viewer_config_from_env(),
        };
        let mut config = (*loaded).clone();
        if let Some(url) = &self.catalog_url {
            config.catalog_base_url = url.clone();
        }
        if let Some(url) = &self.sprite_url {
            config.sprite_base_url = url.clone();
        }
        if let Some(total) = self.total {
            config.total_count = total;
        }
        config.validate()?;
        info!(
            target: "dex::config",
            source = ?metadata.path(),
            catalog = %config.catalog_base_url,
            total = config.total_count,
            "viewer_config.resolved"
        );
        Ok(Arc::new(config))
    }

    fn navigation(&self, total: u32) -> NavigationState {
        let navigation = match self.seed {
            Some(seed) => NavigationState::with_seed(total, seed),
            None => NavigationState::new(total),
        };
        navigation.starting_at(self.start)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if cli.headless {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .with_writer(std::io::stderr)
            .init();
        return run_headless(&cli).await;
    }

    let (log_tx, log_rx) = mpsc::channel::<String>();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(move || ChannelWriter {
            sender: log_tx.clone(),
        })
        .init();

    let config = cli.resolve_config()?;
    let catalog = HttpCatalog::from_config(&config)?;
    let runtime = Handle::current();
    let viewer = Viewer::new(catalog, UiState::default(), Arc::clone(&config), runtime.clone())
        .with_navigation(cli.navigation(config.total_count));

    info!("Browsing {} from {}", config.total_count, config.catalog_base_url);

    tokio::task::spawn_blocking(move || -> Result<()> {
        let app = ViewerApp::new(viewer, runtime, log_rx)?;
        app.run()
    })
    .await??;

    info!("Viewer closed");
    Ok(())
}

async fn run_headless(cli: &Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    let navigation = cli.navigation(config.total_count);
    let snapshot = render_once_http(config, navigation).await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
