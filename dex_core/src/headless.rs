//! One-shot render without a terminal, used by `--headless` and scripts.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::info;

use crate::catalog::{Catalog, HttpCatalog};
use crate::config::ViewerConfig;
use crate::navigation::NavigationState;
use crate::presentation::MemorySurface;
use crate::viewer::Viewer;

/// Fetch and render the entry `navigation` points at, returning what a
/// display would show once the retrieval has settled.
pub async fn render_once<C: Catalog>(
    catalog: C,
    config: Arc<ViewerConfig>,
    navigation: NavigationState,
) -> MemorySurface {
    let mut viewer = Viewer::new(catalog, MemorySurface::default(), config, Handle::current())
        .with_navigation(navigation);
    viewer.start();
    viewer.settle().await;

    let snapshot = viewer.surface().lock().clone();
    info!(
        target: "dex::viewer",
        id = viewer.current_id(),
        name = %snapshot.name,
        "viewer.headless_rendered"
    );
    snapshot
}

/// [`render_once`] against the configured HTTP catalog.
pub async fn render_once_http(
    config: Arc<ViewerConfig>,
    navigation: NavigationState,
) -> Result<MemorySurface, reqwest::Error> {
    let catalog = HttpCatalog::from_config(&config)?;
    Ok(render_once(catalog, config, navigation).await)
}
