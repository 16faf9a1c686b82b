use std::sync::Arc;

use dex_core::{HttpCatalog, MemorySurface, NavigationState, Viewer, ViewerConfig};
use integration_tests::StubCatalog;
use tokio::net::TcpListener;
use tokio::runtime::Handle;

pub type TestViewer = Viewer<HttpCatalog, MemorySurface>;

pub fn config_for(stub: &StubCatalog, total: u32) -> Arc<ViewerConfig> {
    Arc::new(ViewerConfig {
        catalog_base_url: stub.base_url(),
        sprite_base_url: stub.sprite_url(),
        total_count: total,
        ..ViewerConfig::default()
    })
}

pub fn viewer_for(stub: &StubCatalog, total: u32) -> TestViewer {
    let config = config_for(stub, total);
    let catalog = HttpCatalog::from_config(&config).expect("http client builds");
    Viewer::new(catalog, MemorySurface::default(), config, Handle::current())
        .with_navigation(NavigationState::with_seed(total, 5))
}

/// URL of a local port with nothing listening on it.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/api/v2/pokemon")
}
