//! Navigation plus the fetch-and-render cycle.
//!
//! Navigation methods update [`NavigationState`] synchronously and spawn one
//! retrieval task per move. Each task is tagged with the dispatch sequence
//! number; only the response carrying the latest tag is written to the
//! surface, so a slow reply for an earlier move can never overwrite a newer
//! one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::ViewerConfig;
use crate::navigation::NavigationState;
use crate::presentation::PresentationSurface;
use crate::render::render_record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    /// A retrieval for `id` is outstanding.
    Loading { id: u32 },
    Settled,
}

pub struct Viewer<C: Catalog, S: PresentationSurface> {
    navigation: NavigationState,
    catalog: Arc<C>,
    surface: Arc<Mutex<S>>,
    config: Arc<ViewerConfig>,
    runtime: Handle,
    latest: Arc<AtomicU64>,
    settled: Arc<AtomicU64>,
    requested: u32,
    in_flight: Vec<JoinHandle<()>>,
}

impl<C: Catalog, S: PresentationSurface> Viewer<C, S> {
    pub fn new(catalog: C, surface: S, config: Arc<ViewerConfig>, runtime: Handle) -> Self {
        let navigation = NavigationState::new(config.total_count);
        Self {
            requested: navigation.current(),
            navigation,
            catalog: Arc::new(catalog),
            surface: Arc::new(Mutex::new(surface)),
            config,
            runtime,
            latest: Arc::new(AtomicU64::new(0)),
            settled: Arc::new(AtomicU64::new(0)),
            in_flight: Vec::new(),
        }
    }

    pub fn with_navigation(mut self, navigation: NavigationState) -> Self {
        self.requested = navigation.current();
        self.navigation = navigation;
        self
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn current_id(&self) -> u32 {
        self.navigation.current()
    }

    pub fn catalog(&self) -> Arc<C> {
        Arc::clone(&self.catalog)
    }

    pub fn surface(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.surface)
    }

    pub fn phase(&self) -> ViewPhase {
        if self.latest.load(Ordering::SeqCst) == self.settled.load(Ordering::SeqCst) {
            ViewPhase::Settled
        } else {
            ViewPhase::Loading { id: self.requested }
        }
    }

    /// Initial load of whatever the navigation state currently points at.
    pub fn start(&mut self) {
        self.dispatch(self.navigation.current());
    }

    /// Returns `false` (and fetches nothing) at the first entry.
    pub fn step_backward(&mut self) -> bool {
        match self.navigation.step_backward() {
            Some(id) => {
                self.dispatch(id);
                true
            }
            None => false,
        }
    }

    /// Returns `false` (and fetches nothing) at the last entry.
    pub fn step_forward(&mut self) -> bool {
        match self.navigation.step_forward() {
            Some(id) => {
                self.dispatch(id);
                true
            }
            None => false,
        }
    }

    pub fn jump_random(&mut self) -> u32 {
        let id = self.navigation.jump_random();
        self.dispatch(id);
        id
    }

    /// Fetch `id` without moving the navigation state. Used for explicit
    /// reloads and for ids the host obtained elsewhere.
    pub fn show(&mut self, id: u32) {
        self.dispatch(id);
    }

    /// Wait for every retrieval dispatched so far to finish.
    pub async fn settle(&mut self) {
        for handle in std::mem::take(&mut self.in_flight) {
            if let Err(err) = handle.await {
                warn!(target: "dex::viewer", error = %err, "viewer.task_aborted");
            }
        }
    }

    fn dispatch(&mut self, id: u32) {
        self.in_flight.retain(|handle| !handle.is_finished());

        let tag = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.requested = id;
        debug!(target: "dex::viewer", id, tag, "viewer.dispatch");

        let catalog = Arc::clone(&self.catalog);
        let surface = Arc::clone(&self.surface);
        let config = Arc::clone(&self.config);
        let latest = Arc::clone(&self.latest);
        let settled = Arc::clone(&self.settled);

        let handle = self.runtime.spawn(async move {
            let _settle = SettleOnDrop { id, tag, settled };
            let outcome = catalog.fetch(id).await;

            // Hold the surface lock while checking the tag so a newer
            // response cannot be applied between the check and the write.
            let mut surface = surface.lock();
            if latest.load(Ordering::SeqCst) != tag {
                debug!(target: "dex::viewer", id, tag, "viewer.response_stale");
                return;
            }

            match outcome {
                Ok(record) => {
                    let fields = render_record(&record, &config);
                    fields.apply_to(&mut *surface);
                    info!(
                        target: "dex::viewer",
                        id,
                        name = %fields.name,
                        "viewer.render_applied"
                    );
                }
                Err(err) => {
                    warn!(
                        target: "dex::catalog",
                        id = err.id(),
                        error = %err,
                        "catalog.fetch_failed"
                    );
                    surface.show_name(&config.error_text);
                }
            }
        });

        self.in_flight.push(handle);
    }
}

/// Marks a dispatch as finished however its task ends, including by panic,
/// so a failed render cannot leave the viewer in `Loading`.
struct SettleOnDrop {
    id: u32,
    tag: u64,
    settled: Arc<AtomicU64>,
}

impl Drop for SettleOnDrop {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!(target: "dex::viewer", id = self.id, tag = self.tag, "viewer.render_panicked");
        }
        // Tags settle out of order when an older task outlives a newer one.
        self.settled.fetch_max(self.tag, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RetrievalFailure;
    use crate::presentation::MemorySurface;
    use async_trait::async_trait;
    use dex_proto::{AbilitySlot, CreatureRecord, NamedResource, SpriteSet, TypeSlot};
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// In-memory catalog with optional per-id gates that hold a response back
    /// until released.
    #[derive(Default)]
    struct ScriptedCatalog {
        records: HashMap<u32, CreatureRecord>,
        gates: HashMap<u32, Arc<Notify>>,
        panics: HashSet<u32>,
        requests: AtomicUsize,
    }

    impl ScriptedCatalog {
        fn with_range(max: u32) -> Self {
            let records = (1..=max).map(|id| (id, creature(id))).collect();
            Self {
                records,
                ..Default::default()
            }
        }

        fn gate(&mut self, id: u32) -> Arc<Notify> {
            let notify = Arc::new(Notify::new());
            self.gates.insert(id, Arc::clone(&notify));
            notify
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Catalog for ScriptedCatalog {
        async fn fetch(&self, id: u32) -> Result<CreatureRecord, RetrievalFailure> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = self.gates.get(&id) {
                gate.notified().await;
            }
            if self.panics.contains(&id) {
                panic!("scripted catalog blew up on {id}");
            }
            self.records
                .get(&id)
                .cloned()
                .ok_or(RetrievalFailure::Status { id, status: 404 })
        }
    }

    fn creature(id: u32) -> CreatureRecord {
        CreatureRecord {
            id,
            name: format!("creature-{id}"),
            height: id * 3,
            weight: id * 11,
            types: vec![TypeSlot {
                slot: 1,
                kind: NamedResource::new(if id % 2 == 0 { "water" } else { "fire" }),
            }],
            abilities: vec![AbilitySlot {
                slot: 1,
                is_hidden: false,
                ability: NamedResource::new("keen-eye"),
            }],
            sprites: SpriteSet::default(),
        }
    }

    fn viewer(catalog: ScriptedCatalog, total: u32) -> Viewer<ScriptedCatalog, MemorySurface> {
        let config = Arc::new(ViewerConfig {
            total_count: total,
            ..ViewerConfig::default()
        });
        Viewer::new(catalog, MemorySurface::default(), config, Handle::current())
            .with_navigation(NavigationState::with_seed(total, 11))
    }

    #[tokio::test]
    async fn start_renders_first_entry() {
        let mut viewer = viewer(ScriptedCatalog::with_range(5), 5);
        viewer.start();
        viewer.settle().await;

        let surface = viewer.surface();
        let surface = surface.lock();
        assert_eq!(surface.identifier, "#001");
        assert_eq!(surface.name, "creature-1");
        assert_eq!(surface.primary_trait, "keen eye");
        assert_eq!(surface.transitions, 1);
        assert_eq!(viewer.phase(), ViewPhase::Settled);
    }

    #[tokio::test]
    async fn boundary_moves_do_not_fetch() {
        let mut viewer = viewer(ScriptedCatalog::with_range(3), 3);
        assert!(!viewer.step_backward());
        viewer.settle().await;
        assert_eq!(viewer.catalog().requests(), 0);
        assert_eq!(viewer.current_id(), 1);

        assert!(viewer.step_forward());
        assert!(viewer.step_forward());
        assert!(!viewer.step_forward());
        viewer.settle().await;
        assert_eq!(viewer.current_id(), 3);
        assert_eq!(viewer.catalog().requests(), 2);
        assert_eq!(viewer.surface().lock().identifier, "#003");
    }

    #[tokio::test]
    async fn random_jump_always_fetches() {
        let mut viewer = viewer(ScriptedCatalog::with_range(151), 151);
        for _ in 0..25 {
            let id = viewer.jump_random();
            assert!((1..=151).contains(&id));
        }
        viewer.settle().await;
        assert_eq!(viewer.catalog().requests(), 25);
        let expected = format!("#{:03}", viewer.current_id());
        assert_eq!(viewer.surface().lock().identifier, expected);
    }

    #[tokio::test]
    async fn failure_only_touches_name() {
        let mut viewer = viewer(ScriptedCatalog::with_range(1), 1000);
        viewer.start();
        viewer.settle().await;
        let before = viewer.surface().lock().clone();

        viewer.show(999);
        viewer.settle().await;

        let after = viewer.surface().lock().clone();
        assert_eq!(after.name, "Error loading");
        assert_eq!(after.identifier, before.identifier);
        assert_eq!(after.height, before.height);
        assert_eq!(after.weight, before.weight);
        assert_eq!(after.category, before.category);
        assert_eq!(after.image, before.image);
        assert_eq!(after.primary_trait, before.primary_trait);
        assert_eq!(after.transitions, before.transitions);
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let mut catalog = ScriptedCatalog::with_range(5);
        let slow = catalog.gate(2);
        let mut viewer = viewer(catalog, 5);

        assert!(viewer.step_forward());
        assert!(viewer.step_forward());
        assert_eq!(viewer.phase(), ViewPhase::Loading { id: 3 });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(viewer.surface().lock().identifier, "#003");
        assert_eq!(viewer.phase(), ViewPhase::Settled);

        slow.notify_one();
        viewer.settle().await;

        let surface = viewer.surface();
        let surface = surface.lock();
        assert_eq!(surface.identifier, "#003");
        assert_eq!(surface.name, "creature-3");
        assert_eq!(surface.transitions, 1);
    }

    #[tokio::test]
    async fn loading_phase_tracks_latest_request() {
        let mut catalog = ScriptedCatalog::with_range(5);
        let gate = catalog.gate(1);
        let mut viewer = viewer(catalog, 5);

        viewer.start();
        assert_eq!(viewer.phase(), ViewPhase::Loading { id: 1 });
        gate.notify_one();
        viewer.settle().await;
        assert_eq!(viewer.phase(), ViewPhase::Settled);
    }

    #[tokio::test]
    async fn panicking_retrieval_still_settles() {
        let mut catalog = ScriptedCatalog::with_range(5);
        catalog.panics.insert(2);
        let mut viewer = viewer(catalog, 5);

        viewer.start();
        viewer.settle().await;
        assert!(viewer.step_forward());
        viewer.settle().await;

        assert_eq!(viewer.phase(), ViewPhase::Settled);
        let surface = viewer.surface();
        let surface = surface.lock();
        assert_eq!(surface.identifier, "#001");
        assert_eq!(surface.transitions, 1);
    }

    #[tokio::test]
    async fn finished_panicked_task_does_not_block_later_moves() {
        let mut catalog = ScriptedCatalog::with_range(5);
        catalog.panics.insert(2);
        let mut viewer = viewer(catalog, 5);

        assert!(viewer.step_forward());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(viewer.phase(), ViewPhase::Settled);

        assert!(viewer.step_forward());
        viewer.settle().await;
        assert_eq!(viewer.phase(), ViewPhase::Settled);
        assert_eq!(viewer.surface().lock().name, "creature-3");
    }
}
